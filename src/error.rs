//! Unified error type.

use thiserror::Error;

/// The error type returned by docfmt's infrastructure operations.
///
/// Application-level failures (a missing `type` parameter, a document that
/// does not parse) are expressed as HTTP [`Response`](crate::Response)
/// values, not as `Error`s. This type surfaces transport failures: binding
/// to a port, accepting a connection, or reading a request body.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The request body stream failed before it was fully received.
    #[error("body: {0}")]
    Body(String),
}
