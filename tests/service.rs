//! End-to-end behaviour of the assembled router, driven in-process.

use docfmt::{app, Metrics, MetricsSnapshot, Request, Response, Router};
use http::Method;
use serde_json::Value;

fn service() -> (Router, Metrics) {
    let metrics = Metrics::new();
    (app(metrics.clone()), metrics)
}

async fn post(app: &Router, target: &str, body: &str) -> Response {
    let req = Request::new(Method::POST, target.parse().unwrap(), body.to_owned());
    app.call(req).await
}

async fn get(app: &Router, target: &str) -> Response {
    app.call(Request::new(Method::GET, target.parse().unwrap(), "")).await
}

fn text(res: &Response) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

async fn metrics_json(app: &Router) -> Value {
    let res = get(app, "/metrics").await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header("content-type"), Some("application/json"));
    serde_json::from_slice(res.body()).unwrap()
}

#[tokio::test]
async fn json_is_pretty_printed_as_plain_text() {
    let (app, _) = service();
    let res = post(&app, "/format?type=json", r#"{"b":1,"a":2}"#).await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(text(&res), "{\n  \"a\": 2,\n  \"b\": 1\n}");
}

#[tokio::test]
async fn xml_is_reindented_with_trailing_newline() {
    let (app, _) = service();
    let res = post(&app, "/format?type=XML", "<a><b>1</b></a>").await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(text(&res), "<a>\n  <b>1</b>\n</a>\n");
}

#[tokio::test]
async fn html_is_structurally_corrected() {
    let (app, _) = service();
    let res = post(&app, "/format?type=html", "<p>unclosed").await;

    assert_eq!(res.status_code(), 200);
    assert_eq!(text(&res), "<html><head></head><body><p>unclosed</p></body></html>");
}

#[tokio::test]
async fn missing_type_is_a_bad_request() {
    let (app, metrics) = service();
    let res = post(&app, "/format", "{}").await;

    assert_eq!(res.status_code(), 400);
    assert!(text(&res).contains("Missing 'type' parameter"), "{}", text(&res));
    assert_eq!(metrics.snapshot().error_count, 1);
}

#[tokio::test]
async fn unsupported_type_is_a_bad_request() {
    let (app, metrics) = service();
    let res = post(&app, "/format?type=yaml", "a: 1").await;

    assert_eq!(res.status_code(), 400);
    assert!(text(&res).contains("Supported types are 'json', 'xml', and 'html'"));
    assert_eq!(metrics.snapshot().error_count, 1);
}

#[tokio::test]
async fn malformed_documents_fail_without_partial_output() {
    let (app, _) = service();
    for (kind, body) in [("json", r#"{"a": [1, 2"#), ("xml", "<a><b></a>")] {
        let res = post(&app, &format!("/format?type={kind}"), body).await;
        assert_eq!(res.status_code(), 500, "{kind}");
        assert!(text(&res).starts_with("Formatting failed: failed to parse "), "{}", text(&res));
    }
}

#[tokio::test]
async fn deeply_nested_xml_is_a_format_failure() {
    let (app, metrics) = service();
    let depth = 100_000;
    let input = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
    let res = post(&app, "/format?type=xml", &input).await;

    assert_eq!(res.status_code(), 500);
    assert!(text(&res).starts_with("Formatting failed: "), "{}", text(&res));
    assert_eq!(metrics.snapshot().error_count, 1);
}

#[tokio::test]
async fn metrics_start_at_zero() {
    let (app, _) = service();
    let json = metrics_json(&app).await;
    let expected = serde_json::to_value(MetricsSnapshot::default()).unwrap();
    assert_eq!(json, expected);
}

#[tokio::test]
async fn metrics_count_every_format_call_and_every_failure() {
    let (app, _) = service();
    let bodies = [
        ("/format?type=json", "[1,2,3]", 200),
        ("/format?type=xml", "<root><child attr=\"v\"/></root>", 200),
        ("/format?type=html", "<b>bold", 200),
        ("/format?type=json", "{not json}", 500),
        ("/format", "a body without a selector, the longest one", 400),
        ("/format?type=csv", "a,b", 400),
    ];
    for (target, body, status) in bodies {
        assert_eq!(post(&app, target, body).await.status_code(), status, "{target}");
    }

    let json = metrics_json(&app).await;
    assert_eq!(json["request_count"], 6);
    assert_eq!(json["error_count"], 3);
    assert_eq!(
        json["max_payload_size_bytes"],
        "a body without a selector, the longest one".len()
    );
    let total = json["total_duration_ms"].as_u64().unwrap();
    let average = json["average_duration_ms"].as_u64().unwrap();
    assert!(average <= total);
}

#[tokio::test]
async fn other_routes_do_not_touch_metrics() {
    let (app, metrics) = service();
    assert_eq!(get(&app, "/format?type=json").await.status_code(), 405);
    assert_eq!(get(&app, "/unknown").await.status_code(), 404);
    assert_eq!(post(&app, "/metrics", "").await.status_code(), 405);

    assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
}
