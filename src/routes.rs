//! The service's endpoints.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `POST` | `/format?type={json,xml,html}` | [`format_document`] |
//! | `GET` | `/metrics` | [`report_metrics`] |

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::Error as InfraError;
use crate::format::{self, DocumentKind, FormatError};
use crate::handler::Handler;
use crate::metrics::Metrics;
use crate::request::Request;
use crate::response::{ContentType, IntoResponse, Response};
use crate::status::Status;

/// Why a `/format` call was refused.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("Missing 'type' parameter. Specify 'json', 'xml', or 'html'.")]
    MissingType,

    #[error("Invalid 'type' parameter. Supported types are 'json', 'xml', and 'html'.")]
    UnsupportedType(String),

    #[error("Failed to read request body")]
    BodyRead(#[source] InfraError),

    #[error("Formatting failed: {0}")]
    Format(#[from] FormatError),
}

impl Rejection {
    pub fn status(&self) -> Status {
        match self {
            Self::MissingType | Self::UnsupportedType(_) | Self::BodyRead(_) => Status::BadRequest,
            Self::Format(_) => Status::InternalServerError,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        Response::builder().status(self.status()).text(self.to_string())
    }
}

/// `POST /format` — pretty-prints the body as the document type named by `?type=`.
///
/// Every refusal is counted once in `metrics` as an error.
pub fn format_document(metrics: Metrics) -> impl Handler {
    move |req: Request| {
        let metrics = metrics.clone();
        async move {
            match format_request(req).await {
                Ok((kind, formatted)) => {
                    info!(%kind, bytes = formatted.len(), "formatted document returned");
                    Response::builder().bytes(ContentType::Text, formatted)
                }
                Err(rejection) => {
                    metrics.record_error();
                    warn!(error = %rejection, "format request rejected");
                    rejection.into_response()
                }
            }
        }
    }
}

async fn format_request(mut req: Request) -> Result<(DocumentKind, Vec<u8>), Rejection> {
    let selector = req
        .query("type")
        .filter(|t| !t.is_empty())
        .ok_or(Rejection::MissingType)?;
    let kind: DocumentKind = selector
        .parse()
        .map_err(|_| Rejection::UnsupportedType(selector.to_ascii_lowercase()))?;

    let body = req.buffer().await.map_err(Rejection::BodyRead)?;
    debug!(%kind, bytes = body.len(), "received document");

    let formatted = format::format(body, kind)?;
    Ok((kind, formatted))
}

/// `GET /metrics` — the current [`MetricsSnapshot`](crate::MetricsSnapshot) as JSON.
pub fn report_metrics(metrics: Metrics) -> impl Handler {
    move |_req: Request| {
        let snapshot = metrics.snapshot();
        async move {
            match serde_json::to_vec(&snapshot) {
                Ok(body) => Response::json(body),
                Err(e) => {
                    warn!("metrics serialization failed: {e}");
                    Response::status(Status::InternalServerError)
                }
            }
        }
    }
}
