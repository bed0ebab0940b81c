use std::time::Instant;

use tracing::debug;

use crate::handler::BoxFuture;
use crate::metrics::Metrics;
use crate::middleware::{Middleware, Next};
use crate::request::Request;

/// Counts a call, its latency and its payload size.
///
/// The body is buffered here and stays in the request for the handler to
/// read. The call is counted before the handler runs and its duration added
/// after, so an error the handler records never outnumbers the requests. The
/// outcome is not inspected: handlers record their own failures.
#[derive(Clone)]
pub struct RecordMetrics {
    metrics: Metrics,
}

impl RecordMetrics {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }
}

impl Middleware for RecordMetrics {
    fn call(&self, mut req: Request, next: Next) -> BoxFuture {
        let metrics = self.metrics.clone();
        Box::pin(async move {
            let start = Instant::now();
            // A body that fails to arrive counts as empty; the handler answers for it.
            let payload_size = req.buffer().await.map_or(0, |body| body.len());
            metrics.record_arrival(payload_size);

            let response = next.run(req).await;

            let elapsed = start.elapsed();
            metrics.record_duration(elapsed);
            debug!(payload_size, ?elapsed, "request recorded");

            response
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::Method;

    use super::*;
    use crate::handler::Handler;
    use crate::{Response, Status};

    #[tokio::test]
    async fn records_once_regardless_of_outcome() {
        let metrics = Metrics::new();
        let layers: Arc<[Arc<dyn Middleware>]> = Arc::from([
            Arc::new(RecordMetrics::new(metrics.clone())) as Arc<dyn Middleware>,
        ]);
        let failing = (|_req: Request| async { Status::InternalServerError }).into_boxed_handler();

        let req = Request::new(Method::POST, "/format".parse().unwrap(), "12345");
        let res: Response = Next::new(layers, failing).run(req).await;

        assert_eq!(res.status_code(), 500);
        let snap = metrics.snapshot();
        assert_eq!(snap.request_count, 1);
        assert_eq!(snap.error_count, 0);
        assert_eq!(snap.max_payload_size_bytes, 5);
    }

    #[tokio::test]
    async fn request_is_counted_before_the_handler_records_an_error() {
        let metrics = Metrics::new();
        let layers: Arc<[Arc<dyn Middleware>]> = Arc::from([
            Arc::new(RecordMetrics::new(metrics.clone())) as Arc<dyn Middleware>,
        ]);
        let inside = metrics.clone();
        let rejecting = (move |_req: Request| {
            let inside = inside.clone();
            async move {
                inside.record_error();
                let seen = inside.snapshot();
                assert!(seen.error_count <= seen.request_count, "{seen:?}");
                Status::BadRequest
            }
        })
        .into_boxed_handler();

        let req = Request::new(Method::POST, "/format".parse().unwrap(), "");
        let res = Next::new(layers, rejecting).run(req).await;

        assert_eq!(res.status_code(), 400);
        let snap = metrics.snapshot();
        assert_eq!((snap.request_count, snap.error_count), (1, 1));
    }
}
