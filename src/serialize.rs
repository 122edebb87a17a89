//! Rendering the tree back to HTML text.
//!
//! The renderer is the inverse of the parser up to structural equivalence:
//! attributes come out in insertion order, text nodes are re-escaped,
//! RawText content is emitted verbatim, and void elements and `!`
//! declarations get no closing tag. `parse(render(tree))` yields a tree
//! equal to `tree` for anything the parser produces.

use crate::dom::{Document, Element, Node};

/// Render a document to HTML text.
pub fn render(document: &Document) -> String {
  let mut out = String::new();
  for node in &document.children {
    render_node(node, &mut out);
  }
  out
}

fn render_node(node: &Node, out: &mut String) {
  match node {
    Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
    Node::Comment(content) => {
      out.push_str("<!--");
      out.push_str(content);
      out.push_str("-->");
    }
    Node::Element(element) => render_element(element, out),
  }
}

fn render_element(element: &Element, out: &mut String) {
  out.push('<');
  out.push_str(&element.name);
  for attribute in element.attributes() {
    out.push(' ');
    out.push_str(&attribute.name);
    if !attribute.value.is_empty() {
      out.push_str("=\"");
      out.push_str(&html_escape::encode_double_quoted_attribute(
        &attribute.value,
      ));
      out.push('"');
    }
  }
  out.push('>');

  // Declarations (`<!doctype …>`) and void elements have no closing tag.
  if element.name.starts_with('!') || element.is_void() {
    return;
  }

  if element.is_raw_text() {
    // Script/style bodies are emitted verbatim; escaping would corrupt
    // the embedded code.
    for child in &element.children {
      match child {
        Node::Text(text) => out.push_str(text),
        other => render_node(other, out),
      }
    }
  } else {
    for child in &element.children {
      render_node(child, out);
    }
  }

  out.push_str("</");
  out.push_str(&element.name);
  out.push('>');
}
