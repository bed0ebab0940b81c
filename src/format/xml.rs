//! XML: parse into a general element tree, re-emit with two-space indentation.
//!
//! Any well-formed document with exactly one root element is accepted.
//! Elements holding only character data are written on one line, empty
//! elements are self-closed, everything else gets one child per line.
//! Whitespace-only text is dropped and the remaining text is trimmed.
//!
//! Writing and dropping the tree recurse once per level, so nesting is
//! capped at [`MAX_DEPTH`]; deeper documents are rejected as unparsable.

use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::Reader;

use super::{DocumentKind, FormatError};

const INDENT: &str = "  ";

/// Deepest element nesting accepted.
pub(super) const MAX_DEPTH: usize = 1024;

#[derive(Debug, PartialEq)]
enum XmlNode {
    Declaration(String),
    DocType(String),
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    Instruction(String),
}

#[derive(Debug, PartialEq)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    fn is_inline(&self) -> bool {
        self.children.iter().all(|c| matches!(c, XmlNode::Text(_) | XmlNode::CData(_)))
    }
}

pub(super) fn format(data: &[u8]) -> Result<Vec<u8>, FormatError> {
    let nodes = parse(data).map_err(|detail| FormatError::parse(DocumentKind::Xml, detail))?;

    let mut out = String::with_capacity(data.len() + data.len() / 4);
    for node in &nodes {
        write_node(&mut out, node, 0);
        out.push('\n');
    }
    Ok(out.into_bytes())
}

fn parse(data: &[u8]) -> Result<Vec<XmlNode>, String> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut top: Vec<XmlNode> = Vec::new();
    let mut open: Vec<XmlElement> = Vec::new();
    let mut roots = 0usize;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| e.to_string())?;
        let node = match event {
            Event::Start(start) => {
                if open.len() == MAX_DEPTH {
                    return Err(format!("elements nested deeper than {MAX_DEPTH} levels"));
                }
                open.push(element(&start)?);
                None
            }
            Event::End(_) => match open.pop() {
                Some(done) => Some(XmlNode::Element(done)),
                None => return Err("closing tag without a matching opening tag".to_owned()),
            },
            Event::Empty(start) => Some(XmlNode::Element(element(&start)?)),
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(XmlNode::Text(text.to_owned()))
                }
            }
            Event::CData(cdata) => Some(XmlNode::CData(lossy(&cdata.into_inner()))),
            Event::Comment(comment) => Some(XmlNode::Comment(lossy(&comment.into_inner()))),
            Event::PI(pi) => Some(XmlNode::Instruction(lossy(&pi))),
            Event::Decl(decl) => {
                let mut rendered = format!("version=\"{}\"", lossy(&decl.version().map_err(|e| e.to_string())?));
                if let Some(encoding) = decl.encoding() {
                    let encoding = encoding.map_err(|e| e.to_string())?;
                    rendered.push_str(&format!(" encoding=\"{}\"", lossy(&encoding)));
                }
                if let Some(standalone) = decl.standalone() {
                    let standalone = standalone.map_err(|e| e.to_string())?;
                    rendered.push_str(&format!(" standalone=\"{}\"", lossy(&standalone)));
                }
                Some(XmlNode::Declaration(rendered))
            }
            Event::DocType(doctype) => Some(XmlNode::DocType(lossy(&doctype.into_inner()).trim().to_owned())),
            Event::Eof => break,
        };
        buf.clear();

        let Some(node) = node else { continue };
        match open.last_mut() {
            Some(parent) => match node {
                XmlNode::Declaration(_) | XmlNode::DocType(_) => {
                    return Err(format!("prolog markup inside element <{}>", parent.name));
                }
                child => parent.children.push(child),
            },
            None => {
                match &node {
                    XmlNode::Element(_) => roots += 1,
                    XmlNode::Text(_) | XmlNode::CData(_) => {
                        return Err("character data outside the root element".to_owned());
                    }
                    _ => {}
                }
                if roots > 1 {
                    return Err("more than one root element".to_owned());
                }
                top.push(node);
            }
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(format!("unexpected end of document: <{}> is not closed", unclosed.name));
    }
    if roots == 0 {
        return Err("no root element".to_owned());
    }
    Ok(top)
}

fn element(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        attributes.push((lossy(attr.key.as_ref()), value.into_owned()));
    }
    Ok(XmlElement {
        name: lossy(start.name().as_ref()),
        attributes,
        children: Vec::new(),
    })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn write_node(out: &mut String, node: &XmlNode, depth: usize) {
    if !matches!(node, XmlNode::Element(_)) {
        indent(out, depth);
    }
    match node {
        XmlNode::Declaration(decl) => {
            out.push_str("<?xml ");
            out.push_str(decl);
            out.push_str("?>");
        }
        XmlNode::DocType(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype);
            out.push('>');
        }
        XmlNode::Element(el) => write_element(out, el, depth),
        XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
        XmlNode::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        XmlNode::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        XmlNode::Instruction(pi) => {
            out.push_str("<?");
            out.push_str(pi);
            out.push_str("?>");
        }
    }
}

fn write_element(out: &mut String, el: &XmlElement, depth: usize) {
    indent(out, depth);
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        write_attribute_value(out, value);
        out.push('"');
    }

    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    if el.is_inline() {
        for child in &el.children {
            write_node(out, child, 0);
        }
    } else {
        for child in &el.children {
            out.push('\n');
            write_node(out, child, depth + 1);
        }
        out.push('\n');
        indent(out, depth);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

// Literal tabs and newlines would be normalized to spaces on re-parse.
fn write_attribute_value(out: &mut String, value: &str) {
    for ch in escape(value).chars() {
        match ch {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
