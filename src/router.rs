//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Global middleware wraps
//! every request, including the ones that end in 404 or 405.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Layered, Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Arc<[Arc<dyn Middleware>]>,
    not_found: BoxedHandler,
    method_not_allowed: BoxedHandler,
}

enum Lookup {
    Found(BoxedHandler),
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            layers: Arc::from([]),
            not_found: (|_req: Request| async { Status::NotFound }).into_boxed_handler(),
            method_not_allowed: (|_req: Request| async { Status::MethodNotAllowed }).into_boxed_handler(),
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// ```rust,no_run
    /// # use docfmt::{Method, Request, Router, Status};
    /// # async fn report(_: Request) -> Status { Status::NotFound }
    /// Router::new().on(Method::Get, "/metrics", report);
    /// ```
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    /// Like [`on`](Router::on), with `middleware` wrapped around this route only.
    pub fn on_layered(
        self,
        method: Method,
        path: &str,
        middleware: impl Middleware,
        handler: impl Handler,
    ) -> Self {
        let layered = Layered::new(middleware, handler.into_boxed_handler());
        self.add(method, path, Arc::new(layered))
    }

    /// Wrap every request in `middleware`. The first layer added is the outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        let mut layers = self.layers.to_vec();
        layers.push(Arc::new(middleware));
        self.layers = layers.into();
        self
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Routes one request through the middleware chain to its handler.
    pub async fn call(&self, req: Request) -> Response {
        let endpoint = match self.lookup(&req) {
            Lookup::Found(handler) => handler,
            Lookup::MethodNotAllowed => Arc::clone(&self.method_not_allowed),
            Lookup::NotFound => Arc::clone(&self.not_found),
        };
        Next::new(Arc::clone(&self.layers), endpoint).run(req).await
    }

    fn lookup(&self, req: &Request) -> Lookup {
        let path = req.path();
        let found = req.method().as_str().parse::<Method>().ok()
            .and_then(|method| self.routes.get(&method))
            .and_then(|tree| tree.at(path).ok());

        if let Some(matched) = found {
            return Lookup::Found(Arc::clone(matched.value));
        }

        if self.routes.values().any(|tree| tree.at(path).is_ok()) {
            Lookup::MethodNotAllowed
        } else {
            Lookup::NotFound
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
