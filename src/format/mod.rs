//! Document formatters.
//!
//! Each formatter parses raw bytes into an in-memory tree and serializes the
//! tree back out in canonical form. They are pure: no I/O, no shared state.
//!
//! ```rust
//! use docfmt::format::{format, DocumentKind};
//!
//! let out = format(br#"{"b":1,"a":2}"#, DocumentKind::Json).unwrap();
//! assert_eq!(out, b"{\n  \"a\": 2,\n  \"b\": 1\n}");
//! ```

mod html;
mod json;
mod xml;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

/// The document types the service understands.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DocumentKind {
    Json,
    Xml,
    Html,
}

impl DocumentKind {
    fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml  => "XML",
            Self::Html => "HTML",
        }
    }
}

/// Parses a `type` selector, ignoring ASCII case.
impl FromStr for DocumentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml"  => Ok(Self::Xml),
            "html" => Ok(Self::Html),
            _      => Err(UnknownKind(s.to_owned())),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A `type` selector that names no supported format.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("unsupported document type `{0}`")]
pub struct UnknownKind(pub String);

/// Why a document could not be formatted.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The input is not a well-formed document of the selected kind.
    #[error("failed to parse {kind}: {detail}")]
    Parse { kind: DocumentKind, detail: String },

    /// The parsed tree could not be written back out.
    #[error("failed to format {kind}: {detail}")]
    Serialize { kind: DocumentKind, detail: String },
}

impl FormatError {
    pub(crate) fn parse(kind: DocumentKind, detail: impl fmt::Display) -> Self {
        Self::Parse { kind, detail: detail.to_string() }
    }

    pub(crate) fn serialize(kind: DocumentKind, detail: impl fmt::Display) -> Self {
        Self::Serialize { kind, detail: detail.to_string() }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Parse { kind, .. } | Self::Serialize { kind, .. } => *kind,
        }
    }
}

/// Formats `data` as a document of the given kind.
pub fn format(data: &[u8], kind: DocumentKind) -> Result<Vec<u8>, FormatError> {
    let result = match kind {
        DocumentKind::Json => json::format(data),
        DocumentKind::Xml  => xml::format(data),
        DocumentKind::Html => html::format(data),
    };
    if let Err(e) = &result {
        warn!(%kind, error = %e, "formatting failed");
    }
    result
}
