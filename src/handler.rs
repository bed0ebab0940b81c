//! Route handlers and how the router stores them.
//!
//! Each docfmt route is a closure built once at startup around a clone of the
//! shared [`Metrics`](crate::Metrics). `routes::format_document` captures it
//! to count failures and `routes::report_metrics` captures it to take
//! snapshots; both have the same outer shape:
//!
//! ```text
//! move |req: Request| {
//!     let metrics = metrics.clone();   // one clone per request, moved into the future
//!     async move { … }                 // resolves to Response or Status
//! }
//! ```
//!
//! The two closures are distinct types, so [`Handler::into_boxed_handler`]
//! erases them to [`BoxedHandler`] before they enter the route table. At
//! request time the router clones the `Arc` and makes one virtual call; the
//! handler's output goes through [`IntoResponse`] on the way back.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The future a stored handler or middleware layer returns.
///
/// Must be `Send + 'static`: the connection task that polls it can run on any
/// tokio worker.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Object-safe form of a handler, also implemented by route-scoped
/// middleware stacks.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Anything [`Router::on`](crate::Router::on) accepts as a route.
///
/// Sealed. Satisfied by `Fn(Request) -> Fut` where `Fut` resolves to an
/// [`IntoResponse`] type. State such as [`Metrics`](crate::Metrics) has to be
/// captured by clone: the closure is called concurrently and must be
/// `Send + Sync + 'static`.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
