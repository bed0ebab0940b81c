//! One round trip over a real socket, through hyper on both ends.

use std::time::Duration;

use bytes::Bytes;
use docfmt::{app, serve_listener, Metrics, MetricsSnapshot};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout};

#[tokio::test]
async fn formats_over_http_and_shuts_down_cleanly() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let metrics = Metrics::new();

    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_listener(listener, app(metrics.clone()), async {
        let _ = stopped.await;
    }));

    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
    let client = tokio::spawn(conn);

    let req = http::Request::post("/format?type=json")
        .header("host", addr.to_string())
        .body(Full::new(Bytes::from_static(br#"{"z":true,"a":[1]}"#)))
        .unwrap();
    let res = sender.send_request(req).await.unwrap();

    assert_eq!(res.status(), http::StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/plain; charset=utf-8");
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"{\n  \"a\": [\n    1\n  ],\n  \"z\": true\n}");

    drop(sender);
    client.await.unwrap().unwrap();

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();

    let snap = metrics.snapshot();
    assert_eq!(snap.request_count, 1);
    assert_eq!(snap.error_count, 0);
    assert_eq!(snap.max_payload_size_bytes, 18);
}

async fn settled(metrics: &Metrics, done: impl Fn(&MetricsSnapshot) -> bool) -> MetricsSnapshot {
    timeout(Duration::from_secs(5), async {
        loop {
            let snap = metrics.snapshot();
            if done(&snap) {
                return snap;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("metrics never settled")
}

#[tokio::test]
async fn truncated_body_is_counted_as_an_empty_failed_request() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let metrics = Metrics::new();

    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_listener(listener, app(metrics.clone()), async {
        let _ = stopped.await;
    }));

    // Promises 100 bytes, sends 7, then closes the write half.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            b"POST /format?type=json HTTP/1.1\r\n\
              host: localhost\r\n\
              content-length: 100\r\n\
              \r\n\
              {\"a\":1}",
        )
        .await
        .unwrap();
    stream.shutdown().await.unwrap();

    let mut reply = Vec::new();
    let _ = timeout(Duration::from_secs(5), stream.read_to_end(&mut reply)).await;
    if !reply.is_empty() {
        assert!(reply.starts_with(b"HTTP/1.1 400"), "{}", String::from_utf8_lossy(&reply));
    }

    let snap = settled(&metrics, |s| s.request_count == 1 && s.error_count == 1).await;
    assert_eq!(snap.max_payload_size_bytes, 0);

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
