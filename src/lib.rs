//! Single-file HTML bundling.
//!
//! htmlpack parses an HTML document into a tree, resolves every attribute
//! that references a local file, and splices the referenced content back
//! into the document: stylesheets become inline `<style>` elements, script
//! sources become inline script bodies, and media (images, fonts, audio,
//! video) becomes base64 `data:` URLs. Remote URLs and already-inlined
//! `data:` URIs are left untouched, and per-resource failures degrade to
//! diagnostics rather than aborting the run.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let html = r#"<link rel="stylesheet" href="style.css">"#;
//! let bundled = htmlpack::bundle(html, Path::new("assets")).unwrap();
//! assert!(bundled.diagnostics.is_empty());
//! ```
//!
//! The pipeline is a single synchronous pass (parse, inline, render)
//! with one owner of the document throughout. The only I/O is the
//! [`ResourceLoader`] reading resolved files, once per reference in
//! traversal order.

pub mod dom;
pub mod error;
pub mod html;
pub mod inline;
pub mod resource;
pub mod serialize;

pub use dom::{Document, Element, Node};
pub use error::{Error, ParseError, Result};
pub use html::parse;
pub use inline::{bundle, inline_document, Bundled, InlineDiagnostic};
pub use resource::{FsLoader, MediaKind, Resolution, ResourceLoader};
pub use serialize::render;
