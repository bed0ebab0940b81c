use std::time::Instant;

use tracing::info;

use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// Logs every request on entry and on completion.
///
/// Never alters the response; failures still surface as the status code the
/// handler chose.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLog;

impl Middleware for RequestLog {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin(async move {
            let method = req.method().clone();
            let path = req.path().to_owned();
            let start = Instant::now();

            info!(%method, %path, "started");
            let response = next.run(req).await;
            info!(
                %method,
                %path,
                status = response.status_code(),
                elapsed = ?start.elapsed(),
                "completed"
            );

            response
        })
    }
}
