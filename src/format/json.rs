//! JSON: parse into a generic [`Value`], re-emit with two-space indentation.
//!
//! Object keys come out sorted; the generic map is ordered by key.

use serde_json::Value;

use super::{DocumentKind, FormatError};

pub(super) fn format(data: &[u8]) -> Result<Vec<u8>, FormatError> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| FormatError::parse(DocumentKind::Json, e))?;
    serde_json::to_vec_pretty(&value).map_err(|e| FormatError::serialize(DocumentKind::Json, e))
}
