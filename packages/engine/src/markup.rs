//! # Markup Codec
//!
//! Writes a component forest to flattened markup and reads it back. This is
//! the "markup" representation of the recovery chain: lossier than the
//! structured JSON export (engine node ids and drag/drop flags survive only
//! via data attributes) but robust enough that a frame's identity and box
//! styling round-trip.
//!
//! The element name is derived from the component type; the component type
//! itself always travels in a `data-node-type` attribute so the reader never
//! has to guess. Attribute and style keys are written in sorted order to
//! keep output deterministic.

use crate::node::Node;
use std::collections::HashMap;
use std::fmt::Write as _;

#[derive(thiserror::Error, Debug)]
pub enum MarkupError {
    #[error("unexpected end of markup")]
    UnexpectedEof,

    #[error("malformed tag at offset {0}")]
    MalformedTag(usize),

    #[error("mismatched closing tag </{found}>, expected </{expected}>")]
    MismatchedClose { found: String, expected: String },
}

/// Serialize a forest to markup.
pub fn write_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn element_name(tag: &str) -> &'static str {
    match tag {
        "image" => "img",
        _ => "div",
    }
}

fn write_node(node: &Node, out: &mut String) {
    let name = element_name(&node.tag);
    let _ = write!(out, "<{} data-node-type=\"{}\"", name, escape_attr(&node.tag));
    if !node.id.is_empty() {
        let _ = write!(out, " id=\"{}\"", escape_attr(&node.id));
    }
    if !node.droppable {
        out.push_str(" data-droppable=\"false\"");
    }
    if !node.draggable {
        out.push_str(" data-draggable=\"false\"");
    }

    let mut attrs: Vec<(&String, &String)> = node.attributes.iter().collect();
    attrs.sort_by_key(|(k, _)| k.as_str());
    for (key, value) in attrs {
        let _ = write!(out, " {}=\"{}\"", key, escape_attr(value));
    }

    if !node.style.is_empty() {
        let mut props: Vec<(&String, &String)> = node.style.iter().collect();
        props.sort_by_key(|(k, _)| k.as_str());
        let css = props
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        let _ = write!(out, " style=\"{}\"", escape_attr(&css));
    }

    if name == "img" {
        out.push_str("/>");
        return;
    }

    out.push('>');
    if let Some(content) = &node.content {
        out.push_str(&escape_text(content));
    }
    for child in &node.children {
        write_node(child, out);
    }
    let _ = write!(out, "</{}>", name);
}

/// Parse markup produced by [`write_nodes`] (or a compatible surface) back
/// into a forest. Text runs between elements become the enclosing node's
/// `content`; text at the top level is dropped.
pub fn read_nodes(markup: &str) -> Result<Vec<Node>, MarkupError> {
    let mut parser = Parser {
        bytes: markup.as_bytes(),
        pos: 0,
    };
    let (nodes, _) = parser.parse_children(None)?;
    Ok(nodes)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Parse sibling elements until `</closing>` (or end of input when
    /// `closing` is `None`). Returns the elements and accumulated text.
    fn parse_children(
        &mut self,
        closing: Option<&str>,
    ) -> Result<(Vec<Node>, String), MarkupError> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        loop {
            match self.peek() {
                None => {
                    if let Some(expected) = closing {
                        return Err(MarkupError::MismatchedClose {
                            found: String::new(),
                            expected: expected.to_string(),
                        });
                    }
                    return Ok((nodes, text));
                }
                Some(b'<') => {
                    if self.starts_with("</") {
                        let found = self.read_closing_tag()?;
                        match closing {
                            Some(expected) if expected == found => return Ok((nodes, text)),
                            _ => {
                                return Err(MarkupError::MismatchedClose {
                                    found,
                                    expected: closing.unwrap_or("").to_string(),
                                })
                            }
                        }
                    }
                    nodes.push(self.parse_element()?);
                }
                Some(_) => {
                    let run = self.read_text();
                    text.push_str(&unescape(&run));
                }
            }
        }
    }

    fn parse_element(&mut self) -> Result<Node, MarkupError> {
        let start = self.pos;
        self.expect(b'<')?;
        let name = self.read_name();
        if name.is_empty() {
            return Err(MarkupError::MalformedTag(start));
        }

        let mut node = Node::new(match name.as_str() {
            "img" => "image",
            _ => "default",
        });

        // attributes
        loop {
            self.skip_whitespace();
            match self.peek().ok_or(MarkupError::UnexpectedEof)? {
                b'>' => {
                    self.pos += 1;
                    break;
                }
                b'/' => {
                    self.pos += 1;
                    self.expect(b'>')?;
                    return Ok(node);
                }
                _ => {
                    let key = self.read_name();
                    if key.is_empty() {
                        return Err(MarkupError::MalformedTag(self.pos));
                    }
                    let value = if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.read_quoted()?
                    } else {
                        String::new()
                    };
                    apply_attribute(&mut node, &key, unescape(&value));
                }
            }
        }

        // img never takes children
        if name == "img" {
            return Ok(node);
        }

        let (children, text) = self.parse_children(Some(&name))?;
        node.children = children;
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            node.content = Some(trimmed.to_string());
        }
        Ok(node)
    }

    fn read_closing_tag(&mut self) -> Result<String, MarkupError> {
        self.pos += 2; // "</"
        let name = self.read_name();
        self.skip_whitespace();
        self.expect(b'>')?;
        Ok(name)
    }

    fn read_text(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'<' {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    fn read_quoted(&mut self) -> Result<String, MarkupError> {
        let quote = self.peek().ok_or(MarkupError::UnexpectedEof)?;
        if quote != b'"' && quote != b'\'' {
            return Err(MarkupError::MalformedTag(self.pos));
        }
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                let value = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(MarkupError::UnexpectedEof)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.pos..].starts_with(prefix.as_bytes())
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), MarkupError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(MarkupError::MalformedTag(self.pos)),
            None => Err(MarkupError::UnexpectedEof),
        }
    }
}

fn apply_attribute(node: &mut Node, key: &str, value: String) {
    match key {
        "data-node-type" => node.tag = value,
        "id" => node.id = value,
        "data-droppable" => node.droppable = value != "false",
        "data-draggable" => node.draggable = value != "false",
        "style" => node.style = parse_inline_style(&value),
        _ => {
            node.attributes.insert(key.to_string(), value);
        }
    }
}

fn parse_inline_style(css: &str) -> HashMap<String, String> {
    let mut style = HashMap::new();
    for declaration in css.split(';') {
        if let Some((property, value)) = declaration.split_once(':') {
            let property = property.trim();
            let value = value.trim();
            if !property.is_empty() && !value.is_empty() {
                style.insert(property.to_string(), value.to_string());
            }
        }
    }
    style
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

fn unescape(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
