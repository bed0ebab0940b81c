//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns. A middleware receives the request plus a [`Next`]
//! handle for the rest of the chain; it may act before and after calling
//! [`Next::run`].
//!
//! Layers registered with [`Router::layer`](crate::Router::layer) wrap every
//! request, outermost first. A layer attached with
//! [`Router::on_layered`](crate::Router::on_layered) wraps a single route and
//! runs inside the global ones.
//!
//! Built-in middleware:
//! - [`RequestLog`] — logs method and path on entry, status and latency on exit
//! - [`RecordMetrics`] — feeds call count, latency and payload size into
//!   [`Metrics`](crate::Metrics)

mod log;
mod timing;

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;

pub use log::RequestLog;
pub use timing::RecordMetrics;

/// A request interceptor.
///
/// ```rust
/// use docfmt::middleware::{Middleware, Next};
/// use docfmt::{BoxFuture, Request};
///
/// struct Noop;
///
/// impl Middleware for Noop {
///     fn call(&self, req: Request, next: Next) -> BoxFuture {
///         next.run(req)
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// The remainder of a middleware chain, ending in the route handler.
pub struct Next {
    layers: Arc<[Arc<dyn Middleware>]>,
    index: usize,
    endpoint: BoxedHandler,
}

impl Next {
    pub(crate) fn new(layers: Arc<[Arc<dyn Middleware>]>, endpoint: BoxedHandler) -> Self {
        Self { layers, index: 0, endpoint }
    }

    /// Runs the next layer, or the handler once the layers are exhausted.
    pub fn run(mut self, req: Request) -> BoxFuture {
        match self.layers.get(self.index).cloned() {
            Some(layer) => {
                self.index += 1;
                layer.call(req, self)
            }
            None => self.endpoint.call(req),
        }
    }
}

/// A route handler wrapped in one route-scoped middleware.
pub(crate) struct Layered {
    middleware: Arc<dyn Middleware>,
    inner: BoxedHandler,
}

impl Layered {
    pub(crate) fn new(middleware: impl Middleware, inner: BoxedHandler) -> Self {
        Self { middleware: Arc::new(middleware), inner }
    }
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next::new(Arc::from([Arc::clone(&self.middleware)]), Arc::clone(&self.inner));
        next.run(req)
    }
}
