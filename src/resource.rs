//! Resource resolution and classification.
//!
//! This module decides *what* a link-bearing attribute points at (local
//! file, remote URL, nothing usable) and *how* its bytes should be
//! embedded, via a fixed media-kind table keyed on file extension. Actual
//! byte loading goes through the [`ResourceLoader`] trait so the core stays
//! agnostic about where bytes come from (filesystem in production, fixtures
//! in tests).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// Supplies the bytes for a resolved local resource.
///
/// Failures are per-resource and non-fatal: the inliner records a
/// diagnostic and leaves the referencing node unmodified.
pub trait ResourceLoader {
  fn load(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`ResourceLoader`] implementation backed by the local filesystem.
pub struct FsLoader;

impl ResourceLoader for FsLoader {
  fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("not a regular file: {}", path.display()),
      ));
    }
    fs::read(path)
  }
}

/// Link semantics of a (tag, attribute) pair in the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
  /// `<link href>`: candidate for conversion to an inline `<style>`.
  Stylesheet,
  /// `<script src>`: candidate for an inline script body.
  Script,
  /// Everything else: attribute rewritten to a base64 data URL.
  Media,
}

use ReferenceKind::{Media, Script, Stylesheet};

/// The fixed (tag, attribute) → semantics mapping. Read-only, process-wide.
const REFERENCE_TABLE: &[(&str, &[(&str, ReferenceKind)])] = &[
  ("audio", &[("src", Media)]),
  ("embed", &[("src", Media)]),
  ("iframe", &[("src", Media)]),
  ("img", &[("src", Media)]),
  ("input", &[("src", Media)]),
  ("link", &[("href", Stylesheet)]),
  ("object", &[("data", Media)]),
  ("script", &[("src", Script)]),
  ("source", &[("src", Media)]),
  ("track", &[("src", Media)]),
  ("video", &[("src", Media), ("poster", Media)]),
];

/// Link-bearing attributes for a tag, in table order. Tags outside the
/// table get an empty slice (the not-applicable outcome).
pub fn references_for(tag: &str) -> &'static [(&'static str, ReferenceKind)] {
  REFERENCE_TABLE
    .iter()
    .find(|(name, _)| *name == tag)
    .map(|(_, attributes)| *attributes)
    .unwrap_or(&[])
}

/// Outcome of resolving a single attribute value against the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// Empty or fragment-only value; nothing to resolve.
  NotApplicable,
  /// Carries a URI scheme (`http`, `https`, `data`, …) or is
  /// protocol-relative. Skipped, never inlined; `data:` URIs in
  /// particular stay untouched so a bundled document passes through
  /// unchanged.
  Remote,
  /// A local file that exists.
  Local(PathBuf),
  /// A local reference whose resolved path does not exist. No loader call
  /// is attempted for these.
  Missing(PathBuf),
}

/// Resolve a reference value. A reference is local iff it has no URI
/// scheme or an explicit `file:` scheme. Relative paths resolve against
/// `base`; site-absolute paths (leading `/`) are re-rooted at `base`;
/// query strings and fragments are stripped first.
pub fn resolve_reference(value: &str, base: &Path) -> Resolution {
  let value = value.trim();
  if value.is_empty() {
    return Resolution::NotApplicable;
  }
  if value.starts_with("//") {
    return Resolution::Remote;
  }
  let path = match Url::parse(value) {
    Ok(url) if url.scheme() == "file" => match url.to_file_path() {
      Ok(path) => path,
      Err(()) => return Resolution::Remote,
    },
    Ok(_) => return Resolution::Remote,
    Err(_) => {
      let stripped = value
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('/');
      if stripped.is_empty() {
        return Resolution::NotApplicable;
      }
      base.join(stripped)
    }
  };
  if path.exists() {
    Resolution::Local(path)
  } else {
    Resolution::Missing(path)
  }
}

/// Media type inferred from a file extension.
///
/// `text` marks kinds that are safe to embed as UTF-8 text; everything
/// else follows the base64 data-URL policy. Unknown extensions fall back
/// to `application/octet-stream` with the binary policy: never treat
/// unknown bytes as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaKind {
  pub mime: &'static str,
  pub text: bool,
}

impl MediaKind {
  pub fn for_path(path: &Path) -> MediaKind {
    let extension = path
      .extension()
      .and_then(|extension| extension.to_str())
      .map(|extension| extension.to_ascii_lowercase())
      .unwrap_or_default();
    Self::for_extension(&extension)
  }

  pub fn for_extension(extension: &str) -> MediaKind {
    let (mime, text) = match extension {
      "css" => ("text/css", true),
      "js" | "mjs" => ("text/javascript", true),
      "html" | "htm" => ("text/html", true),
      "txt" => ("text/plain", true),
      "json" => ("application/json", true),
      "xml" => ("application/xml", true),
      "svg" => ("image/svg+xml", true),
      "png" => ("image/png", false),
      "jpg" | "jpeg" => ("image/jpeg", false),
      "gif" => ("image/gif", false),
      "webp" => ("image/webp", false),
      "avif" => ("image/avif", false),
      "bmp" => ("image/bmp", false),
      "ico" => ("image/x-icon", false),
      "woff" => ("font/woff", false),
      "woff2" => ("font/woff2", false),
      "ttf" => ("font/ttf", false),
      "otf" => ("font/otf", false),
      "eot" => ("application/vnd.ms-fontobject", false),
      "mp3" => ("audio/mpeg", false),
      "ogg" => ("audio/ogg", false),
      "wav" => ("audio/wav", false),
      "flac" => ("audio/flac", false),
      "mp4" => ("video/mp4", false),
      "webm" => ("video/webm", false),
      "ogv" => ("video/ogg", false),
      "pdf" => ("application/pdf", false),
      "wasm" => ("application/wasm", false),
      _ => ("application/octet-stream", false),
    };
    MediaKind { mime, text }
  }

  /// CSS that is safe to splice as text.
  pub fn is_css(&self) -> bool {
    self.text && self.mime == "text/css"
  }

  /// JavaScript that is safe to splice as text.
  pub fn is_javascript(&self) -> bool {
    self.text && self.mime == "text/javascript"
  }
}
