//! # docfmt
//!
//! A small HTTP service that pretty-prints documents and keeps usage
//! counters.
//!
//! - `POST /format?type=json|xml|html` — the body, re-serialized in canonical
//!   form, as `text/plain`
//! - `GET /metrics` — request count, error count, total and average latency,
//!   largest payload, as JSON
//!
//! What the reverse proxy in front already owns (TLS, body-size limits, rate
//! limiting, slow clients) docfmt ignores.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docfmt::{app, Metrics, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let metrics = Metrics::new();
//!     Server::bind(([0, 0, 0, 0], 8030).into())
//!         .serve(app(metrics))
//!         .await
//!         .unwrap();
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod format;
pub mod metrics;
pub mod middleware;
pub mod routes;

pub use config::Config;
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use method::Method;
pub use metrics::{Metrics, MetricsSnapshot};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::{serve_listener, Server};
pub use status::Status;

use middleware::{RecordMetrics, RequestLog};

/// The service's router: request logging on everything, metrics timing on
/// `/format`, and both endpoints sharing `metrics`.
pub fn app(metrics: Metrics) -> Router {
    Router::new()
        .layer(RequestLog)
        .on_layered(
            Method::Post,
            "/format",
            RecordMetrics::new(metrics.clone()),
            routes::format_document(metrics.clone()),
        )
        .on(Method::Get, "/metrics", routes::report_metrics(metrics))
}
