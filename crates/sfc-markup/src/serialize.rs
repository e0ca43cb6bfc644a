//! Markup serialization.

use crate::ast::*;

/// Serializes a document back into markup text.
///
/// Nodes that were not modified come out exactly as they were parsed, apart
/// from whitespace between attributes inside a start tag.
pub fn serialize(document: &Document) -> String {
    let mut out = String::new();
    for node in &document.nodes {
        write_node(&mut out, node);
    }
    out
}

/// Serializes a single node.
pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(el) => write_element(out, el),
        Node::Text(text) => out.push_str(&text.data),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.data);
            out.push_str("-->");
        }
        Node::Doctype(doctype) => {
            out.push_str("<!");
            out.push_str(&doctype.data);
            out.push('>');
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attributes {
        out.push(' ');
        write_attribute(out, attr);
    }

    if el.self_closing && el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    if is_void_element(&el.name) {
        return;
    }

    for child in &el.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn write_attribute(out: &mut String, attr: &Attribute) {
    out.push_str(&attr.name);

    let quote = match attr.quote {
        Quote::Bare if attr.value.is_empty() => return,
        Quote::Bare => '"',
        Quote::Unquoted if is_unquoted_safe(&attr.value) => {
            out.push('=');
            out.push_str(&attr.value);
            return;
        }
        Quote::Unquoted | Quote::Double => '"',
        Quote::Single => '\'',
    };

    // Switch quotes rather than escape when the value contains ours.
    let quote = if !attr.value.contains(quote) {
        quote
    } else if quote == '"' && !attr.value.contains('\'') {
        '\''
    } else if quote == '\'' && !attr.value.contains('"') {
        '"'
    } else {
        out.push_str("=\"");
        out.push_str(&attr.value.replace('"', "&quot;"));
        out.push('"');
        return;
    };

    out.push('=');
    out.push(quote);
    out.push_str(&attr.value);
    out.push(quote);
}

fn is_unquoted_safe(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`'))
}
