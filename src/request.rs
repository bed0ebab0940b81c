//! Incoming HTTP request type.
//!
//! The body arrives as a hyper stream and is read at most once. Whoever
//! calls [`Request::buffer`] first pays for the read; every later caller gets
//! the same materialized bytes (or the same failure).

use std::mem;

use bytes::Bytes;
use http::{Method, Uri};
use http_body_util::BodyExt;
use hyper::body::Incoming;

use crate::error::Error;

enum Body {
    Streaming(Incoming),
    Buffered(Bytes),
    Failed(String),
}

/// An incoming HTTP request.
pub struct Request {
    method: Method,
    uri: Uri,
    body: Body,
}

impl Request {
    /// Builds a request whose body is already in memory.
    ///
    /// ```rust
    /// use docfmt::Request;
    ///
    /// let req = Request::new(http::Method::POST, "/format?type=json".parse().unwrap(), "{}");
    /// assert_eq!(req.query("type").as_deref(), Some("json"));
    /// ```
    pub fn new(method: Method, uri: Uri, body: impl Into<Bytes>) -> Self {
        Self { method, uri, body: Body::Buffered(body.into()) }
    }

    pub(crate) fn from_hyper(req: hyper::Request<Incoming>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            body: Body::Streaming(body),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { self.uri.path() }

    /// Returns the first value of a URL-decoded query parameter.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Reads the whole body into memory, once.
    ///
    /// There is no size cap: the reverse proxy in front of the service owns
    /// body-size limits.
    pub async fn buffer(&mut self) -> Result<&Bytes, Error> {
        let pending = mem::replace(&mut self.body, Body::Failed("body read interrupted".to_owned()));
        self.body = match pending {
            Body::Streaming(incoming) => match incoming.collect().await {
                Ok(collected) => Body::Buffered(collected.to_bytes()),
                Err(e) => Body::Failed(e.to_string()),
            },
            done => done,
        };

        match &self.body {
            Body::Buffered(bytes) => Ok(bytes),
            Body::Failed(reason) => Err(Error::Body(reason.clone())),
            Body::Streaming(_) => Err(Error::Body("body not buffered".to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(target: &str) -> Request {
        Request::new(Method::POST, target.parse().unwrap(), "payload")
    }

    #[test]
    fn query_decodes_and_takes_first_value() {
        let req = post("/format?type=j%73on&type=xml&x=1");
        assert_eq!(req.query("type").as_deref(), Some("json"));
        assert_eq!(req.query("missing"), None);
        assert_eq!(post("/format").query("type"), None);
    }

    #[test]
    fn empty_query_value_is_present_but_empty() {
        assert_eq!(post("/format?type=").query("type").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn buffer_is_repeatable() {
        let mut req = post("/format");
        assert_eq!(req.buffer().await.unwrap().as_ref(), b"payload");
        assert_eq!(req.buffer().await.unwrap().as_ref(), b"payload");
    }
}
