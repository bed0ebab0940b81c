//! HTML: run the HTML5 tree builder, then serialize the resulting DOM.
//!
//! The tree builder never rejects markup; it inserts implied elements and
//! closes what was left open. The output is the DOM's serialization, not an
//! indented rendering of the input.

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{RcDom, SerializableHandle};

use super::{DocumentKind, FormatError};

pub(super) fn format(data: &[u8]) -> Result<Vec<u8>, FormatError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut &data[..])
        .map_err(|e| FormatError::parse(DocumentKind::Html, e))?;

    let document: SerializableHandle = dom.document.clone().into();
    let mut out = Vec::with_capacity(data.len() + 64);
    serialize(&mut out, &document, SerializeOpts::default())
        .map_err(|e| FormatError::serialize(DocumentKind::Html, e))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str) -> String {
        String::from_utf8(format(input.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn implied_tags_are_inserted() {
        assert_eq!(
            render("<p>unclosed"),
            "<html><head></head><body><p>unclosed</p></body></html>"
        );
    }

    #[test]
    fn doctype_and_head_content_are_kept() {
        let out = render("<!DOCTYPE html><title>T</title><div>a<span>b</div>");
        assert_eq!(
            out,
            "<!DOCTYPE html><html><head><title>T</title></head><body><div>a<span>b</span></div></body></html>"
        );
    }

    #[test]
    fn empty_input_still_yields_a_document() {
        assert_eq!(render(""), "<html><head></head><body></body></html>");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let out = format(b"<p>\xff</p>").unwrap();
        assert!(String::from_utf8(out).unwrap().contains("<p>\u{fffd}</p>"));
    }
}
