//! The inlining pass: splice local resources into the tree.
//!
//! For every element in pre-order, each link-bearing attribute from the
//! reference table is resolved; local resources are loaded and embedded
//! according to their media kind:
//!
//! - `<link rel="stylesheet">` pointing at CSS becomes an inline `<style>`
//!   element carrying the stylesheet text;
//! - `<script src>` pointing at JavaScript gets its `src` removed and the
//!   script text set as its body;
//! - everything else has the attribute rewritten to a
//!   `data:<mime>;base64,<payload>` URL, leaving the element in place.
//!
//! Inlining is best-effort per node: a missing or unreadable file leaves
//! the node unmodified and records an [`InlineDiagnostic`]. The walk is an
//! explicit index loop that re-reads the current slot after a replacement,
//! so a spliced subtree is itself visited; injected text content is never
//! re-scanned for further references.

use crate::dom::{Document, Element, Node};
use crate::error::Result;
use crate::resource::{
  references_for, resolve_reference, FsLoader, MediaKind, ReferenceKind, Resolution,
  ResourceLoader,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Output of the full bundling pipeline.
pub struct Bundled {
  /// The re-rendered document with local references inlined.
  pub html: String,
  /// Per-resource failures, in traversal order. Empty on a clean run.
  pub diagnostics: Vec<InlineDiagnostic>,
}

/// Record of a reference that could not be inlined. The referencing node
/// is left exactly as it was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineDiagnostic {
  /// Tag name of the referencing element.
  pub tag: String,
  /// The link-bearing attribute.
  pub attribute: String,
  /// The attribute value as written in the document.
  pub reference: String,
  /// The filesystem path the reference resolved to.
  pub path: PathBuf,
  /// Why the resource could not be inlined.
  pub reason: String,
}

impl fmt::Display for InlineDiagnostic {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "cannot inline <{} {}=\"{}\">: {}: {}",
      self.tag,
      self.attribute,
      self.reference,
      self.path.display(),
      self.reason
    )
  }
}

/// Parse, inline against `base` using the filesystem loader, and re-render.
pub fn bundle(html: &str, base: &Path) -> Result<Bundled> {
  let mut document = crate::html::parse(html)?;
  let diagnostics = inline_document(&mut document, base, &FsLoader);
  Ok(Bundled {
    html: crate::serialize::render(&document),
    diagnostics,
  })
}

/// Inline every resolvable local reference in the document, mutating it in
/// place. Returns the diagnostics for references that failed; the walk
/// itself never fails. Output is deterministic for a given document and
/// filesystem state.
pub fn inline_document(
  document: &mut Document,
  base: &Path,
  loader: &dyn ResourceLoader,
) -> Vec<InlineDiagnostic> {
  let mut diagnostics = Vec::new();
  inline_nodes(&mut document.children, base, loader, &mut diagnostics);
  diagnostics
}

/// How a loaded resource gets spliced into the element under the cursor.
enum Action {
  ReplaceWithStyle(String),
  SetScriptBody(String),
  RewriteAttribute(&'static str, String),
}

fn inline_nodes(
  nodes: &mut Vec<Node>,
  base: &Path,
  loader: &dyn ResourceLoader,
  diagnostics: &mut Vec<InlineDiagnostic>,
) {
  let mut index = 0;
  while index < nodes.len() {
    if let Node::Element(element) = &nodes[index] {
      let actions = plan_element(element, base, loader, diagnostics);
      if !actions.is_empty() {
        apply_actions(&mut nodes[index], actions);
      }
      // Re-read the slot after mutation; the node there (possibly a
      // replacement) is the one whose children get visited.
      if let Node::Element(element) = &mut nodes[index] {
        inline_nodes(&mut element.children, base, loader, diagnostics);
      }
    }
    index += 1;
  }
}

fn plan_element(
  element: &Element,
  base: &Path,
  loader: &dyn ResourceLoader,
  diagnostics: &mut Vec<InlineDiagnostic>,
) -> Vec<Action> {
  let mut actions = Vec::new();
  for (attribute, kind) in references_for(&element.name) {
    let Some(value) = element.attribute(attribute) else {
      continue;
    };
    let path = match resolve_reference(value, base) {
      Resolution::NotApplicable | Resolution::Remote => continue,
      Resolution::Missing(path) => {
        diagnostics.push(diagnostic(element, attribute, value, path, "no such file"));
        continue;
      }
      Resolution::Local(path) => path,
    };
    let bytes = match loader.load(&path) {
      Ok(bytes) => bytes,
      Err(error) => {
        diagnostics.push(diagnostic(
          element,
          attribute,
          value,
          path,
          &error.to_string(),
        ));
        continue;
      }
    };
    let media = MediaKind::for_path(&path);
    log::debug!(
      "inlining {} ({} bytes, {}) into <{}>",
      path.display(),
      bytes.len(),
      media.mime,
      element.name
    );
    let action = match kind {
      ReferenceKind::Stylesheet if media.is_css() && has_stylesheet_rel(element) => {
        match String::from_utf8(bytes) {
          Ok(css) => Action::ReplaceWithStyle(css),
          // Not valid UTF-8 after all: fall back to the binary policy.
          Err(error) => Action::RewriteAttribute(attribute, data_url(media, error.as_bytes())),
        }
      }
      ReferenceKind::Script if media.is_javascript() => match String::from_utf8(bytes) {
        Ok(js) => Action::SetScriptBody(js),
        Err(error) => Action::RewriteAttribute(attribute, data_url(media, error.as_bytes())),
      },
      _ => Action::RewriteAttribute(attribute, data_url(media, &bytes)),
    };
    actions.push(action);
  }
  actions
}

fn apply_actions(slot: &mut Node, actions: Vec<Action>) {
  for action in actions {
    let Node::Element(element) = slot else {
      return;
    };
    match action {
      Action::ReplaceWithStyle(css) => {
        let mut style = Element::new("style");
        for attribute in element.attributes() {
          if attribute.name != "rel" && attribute.name != "href" {
            style.set_attribute(&attribute.name, &attribute.value);
          }
        }
        style.children.push(Node::Text(css));
        // In-place slot assignment: sibling order and the caller's index
        // both stay valid.
        *slot = Node::Element(style);
      }
      Action::SetScriptBody(js) => {
        element.remove_attribute("src");
        element.children = vec![Node::Text(js)];
      }
      Action::RewriteAttribute(attribute, value) => {
        element.set_attribute(attribute, &value);
      }
    }
  }
}

fn has_stylesheet_rel(element: &Element) -> bool {
  element
    .attribute("rel")
    .map(|rel| {
      rel
        .split_whitespace()
        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
    .unwrap_or(false)
}

fn data_url(media: MediaKind, bytes: &[u8]) -> String {
  format!("data:{};base64,{}", media.mime, BASE64.encode(bytes))
}

fn diagnostic(
  element: &Element,
  attribute: &str,
  reference: &str,
  path: PathBuf,
  reason: &str,
) -> InlineDiagnostic {
  InlineDiagnostic {
    tag: element.name.clone(),
    attribute: attribute.to_string(),
    reference: reference.to_string(),
    path,
    reason: reason.to_string(),
  }
}
