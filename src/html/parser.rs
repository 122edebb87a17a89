//! Permissive single-pass HTML parser.
//!
//! A left-to-right byte scan with an open-element stack. The parser follows
//! browser-style recovery: unknown tags are kept, unclosed tags are closed
//! implicitly when an ancestor's close tag (or end of input) arrives, stray
//! close tags are dropped, and a `<` that does not begin a tag construct is
//! literal text. Only two shapes of input are unrecoverable, an
//! unterminated comment and an unterminated quoted attribute value, both
//! surfaced as [`ParseError`].
//!
//! RawText elements (`<script>`, `<style>`) capture their content verbatim
//! until the matching literal close tag: no entity decoding and no
//! nested-tag interpretation, so inlined JS/CSS survives the scan intact.

use crate::dom::{is_raw_text_element, is_void_element, Document, Element, Node};
use crate::error::ParseError;

/// Parse an HTML document into a tree.
pub fn parse(input: &str) -> Result<Document, ParseError> {
  Parser::new(input).run()
}

struct Parser<'a> {
  source: &'a str,
  bytes: &'a [u8],
  pos: usize,
  line: usize,
  stack: Vec<Element>,
  root: Vec<Node>,
}

// Scanning helpers.
impl<'a> Parser<'a> {
  fn new(source: &'a str) -> Self {
    Parser {
      source,
      bytes: source.as_bytes(),
      pos: 0,
      line: 1,
      stack: Vec::new(),
      root: Vec::new(),
    }
  }

  fn current(&self) -> Option<u8> {
    self.bytes.get(self.pos).copied()
  }

  fn advance(&mut self) {
    if self.bytes.get(self.pos) == Some(&b'\n') {
      self.line += 1;
    }
    self.pos += 1;
  }

  fn advance_by(&mut self, count: usize) {
    for _ in 0..count {
      self.advance();
    }
  }

  fn advance_to(&mut self, target: usize) {
    while self.pos < target {
      self.advance();
    }
  }

  fn lookahead(&self, prefix: &[u8]) -> bool {
    self.bytes[self.pos..].starts_with(prefix)
  }

  fn lookahead_ignore_case(&self, offset: usize, word: &[u8]) -> bool {
    let start = self.pos + offset;
    match self.bytes.get(start..start + word.len()) {
      Some(window) => window.eq_ignore_ascii_case(word),
      None => false,
    }
  }

  fn find_from(&self, from: usize, needle: &[u8]) -> Option<usize> {
    self.bytes[from..]
      .windows(needle.len())
      .position(|window| window == needle)
      .map(|index| index + from)
  }

  fn skip_whitespace(&mut self) {
    while self.current().is_some_and(|byte| byte.is_ascii_whitespace()) {
      self.advance();
    }
  }

  /// True when the `<` at the current position begins a tag construct
  /// rather than literal text.
  fn at_tag_boundary(&self) -> bool {
    matches!(
      self.bytes.get(self.pos + 1),
      Some(next) if next.is_ascii_alphabetic() || matches!(next, b'/' | b'!' | b'?')
    )
  }

  /// Scan a tag or attribute-adjacent name: letters, digits, `-`, `_`, `:`.
  fn scan_name(&mut self) -> String {
    let start = self.pos;
    while self
      .current()
      .is_some_and(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':'))
    {
      self.advance();
    }
    self.source[start..self.pos].to_ascii_lowercase()
  }
}

// Grammar.
impl<'a> Parser<'a> {
  fn run(mut self) -> Result<Document, ParseError> {
    while self.pos < self.bytes.len() {
      if self.lookahead(b"<!--") {
        self.comment()?;
      } else if self.lookahead(b"</") {
        self.close_tag();
      } else if self.lookahead(b"<!") || self.lookahead(b"<?") {
        self.markup_declaration();
      } else if self.current() == Some(b'<') && self.at_tag_boundary() {
        self.open_tag()?;
      } else {
        self.text();
      }
    }
    // End of input: close whatever is still open, innermost first.
    while !self.stack.is_empty() {
      self.close_top();
    }
    Ok(Document {
      children: self.root,
    })
  }

  fn push_node(&mut self, node: Node) {
    match self.stack.last_mut() {
      Some(parent) => parent.children.push(node),
      None => self.root.push(node),
    }
  }

  fn close_top(&mut self) {
    if let Some(element) = self.stack.pop() {
      self.push_node(Node::Element(element));
    }
  }

  fn text(&mut self) {
    let start = self.pos;
    // Consume at least one byte so a literal `<` cannot stall the scan.
    self.advance();
    while let Some(byte) = self.current() {
      if byte == b'<' && self.at_tag_boundary() {
        break;
      }
      self.advance();
    }
    let raw = &self.source[start..self.pos];
    self.push_node(Node::Text(decode_entities(raw)));
  }

  fn comment(&mut self) -> Result<(), ParseError> {
    let line = self.line;
    self.advance_by(4); // <!--
    let Some(end) = self.find_from(self.pos, b"-->") else {
      return Err(ParseError::UnterminatedComment { line });
    };
    let content = self.source[self.pos..end].to_string();
    self.advance_to(end);
    self.advance_by(3); // -->
    self.push_node(Node::Comment(content));
    Ok(())
  }

  /// `<!…>` and `<?…>` constructs other than comments. A doctype keeps its
  /// declaration body; anything else degrades to a comment node, matching
  /// browser bogus-comment recovery.
  fn markup_declaration(&mut self) {
    if self.lookahead_ignore_case(2, b"doctype") {
      self.doctype();
      return;
    }
    self.advance(); // <
    if self.current() == Some(b'!') {
      self.advance();
    }
    let start = self.pos;
    while self.current().is_some_and(|byte| byte != b'>') {
      self.advance();
    }
    let content = self.source[start..self.pos].to_string();
    if self.current() == Some(b'>') {
      self.advance();
    }
    self.push_node(Node::Comment(content));
  }

  /// The doctype survives as an element named `!doctype` whose declaration
  /// body rides along as a single valueless attribute, preserved verbatim.
  fn doctype(&mut self) {
    self.advance_by(9); // <!doctype
    self.skip_whitespace();
    let start = self.pos;
    while self.current().is_some_and(|byte| byte != b'>') {
      self.advance();
    }
    let body = self.source[start..self.pos].trim_end().to_string();
    if self.current() == Some(b'>') {
      self.advance();
    }
    let mut element = Element::new("!doctype");
    if !body.is_empty() {
      element.set_attribute(&body, "");
    }
    self.push_node(Node::Element(element));
  }

  fn open_tag(&mut self) -> Result<(), ParseError> {
    self.advance(); // <
    let name = self.scan_name();
    let mut element = Element::new(&name);
    let self_closing = self.scan_attributes(&mut element)?;
    if is_void_element(&name) || self_closing {
      self.push_node(Node::Element(element));
    } else if is_raw_text_element(&name) {
      let content = self.raw_text(&name);
      if !content.is_empty() {
        element.children.push(Node::Text(content));
      }
      self.push_node(Node::Element(element));
    } else {
      self.stack.push(element);
    }
    Ok(())
  }

  /// Consume attributes through the closing `>`. Returns true for `/>`.
  fn scan_attributes(&mut self, element: &mut Element) -> Result<bool, ParseError> {
    loop {
      self.skip_whitespace();
      match self.current() {
        // End of input inside a tag: treat the tag as closed.
        None => return Ok(false),
        Some(b'>') => {
          self.advance();
          return Ok(false);
        }
        Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'>') => {
          self.advance_by(2);
          return Ok(true);
        }
        // Stray slash between attributes.
        Some(b'/') => self.advance(),
        Some(_) => self.scan_attribute(element)?,
      }
    }
  }

  fn scan_attribute(&mut self, element: &mut Element) -> Result<(), ParseError> {
    let start = self.pos;
    while self
      .current()
      .is_some_and(|byte| !byte.is_ascii_whitespace() && !matches!(byte, b'=' | b'>' | b'/'))
    {
      self.advance();
    }
    if self.pos == start {
      // Nothing that could be a name (for example `=` in name position):
      // drop the byte and resynchronize.
      self.advance();
      return Ok(());
    }
    let name = self.source[start..self.pos].to_ascii_lowercase();
    self.skip_whitespace();

    let value = if self.current() == Some(b'=') {
      self.advance();
      self.skip_whitespace();
      match self.current() {
        Some(quote @ (b'"' | b'\'')) => {
          let line = self.line;
          self.advance();
          let start = self.pos;
          let Some(end) = self.find_from(self.pos, &[quote]) else {
            return Err(ParseError::UnterminatedAttributeValue { name, line });
          };
          let raw = &self.source[start..end];
          self.advance_to(end);
          self.advance(); // closing quote
          decode_entities(raw)
        }
        _ => {
          let start = self.pos;
          while let Some(byte) = self.current() {
            if byte.is_ascii_whitespace() || byte == b'>' {
              break;
            }
            // A trailing `/>` ends the tag rather than the value.
            if byte == b'/' && self.bytes.get(self.pos + 1) == Some(&b'>') {
              break;
            }
            self.advance();
          }
          decode_entities(&self.source[start..self.pos])
        }
      }
    } else {
      String::new()
    };

    // Duplicate attribute names: first occurrence wins.
    if !element.has_attribute(&name) {
      element.set_attribute(&name, &value);
    }
    Ok(())
  }

  fn close_tag(&mut self) {
    self.advance_by(2); // </
    let name = self.scan_name();
    while self.current().is_some_and(|byte| byte != b'>') {
      self.advance();
    }
    if self.current() == Some(b'>') {
      self.advance();
    }
    if name.is_empty() {
      return;
    }
    if let Some(depth) = self.stack.iter().rposition(|element| element.name == name) {
      // Anything opened inside the matched element closes implicitly.
      while self.stack.len() > depth + 1 {
        self.close_top();
      }
      self.close_top();
    }
    // No matching open element: the stray close tag is dropped.
  }

  /// Capture verbatim content until `</name` followed by a tag-ending byte.
  /// End of input without a close tag takes the rest as content.
  fn raw_text(&mut self, name: &str) -> String {
    let mut end = self.bytes.len();
    let mut found_close = false;
    let mut search = self.pos;
    while let Some(index) = self.find_from(search, b"</") {
      let after = index + 2 + name.len();
      let name_matches = self
        .bytes
        .get(index + 2..after)
        .is_some_and(|window| window.eq_ignore_ascii_case(name.as_bytes()));
      let boundary = match self.bytes.get(after) {
        None => true,
        Some(byte) => byte.is_ascii_whitespace() || matches!(byte, b'>' | b'/'),
      };
      if name_matches && boundary {
        end = index;
        found_close = true;
        break;
      }
      search = index + 2;
    }
    let content = self.source[self.pos..end].to_string();
    self.advance_to(end);
    if found_close {
      self.advance_by(2 + name.len());
      while self.current().is_some_and(|byte| byte != b'>') {
        self.advance();
      }
      if self.current() == Some(b'>') {
        self.advance();
      }
    }
    content
  }
}

fn decode_entities(raw: &str) -> String {
  html_escape::decode_html_entities(raw).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn element(document: &Document, index: usize) -> &Element {
    document.children[index]
      .as_element()
      .expect("expected an element")
  }

  #[test]
  fn nested_elements_with_text() {
    let document = parse("<div><p>hello</p></div>").unwrap();
    assert_eq!(document.children.len(), 1);
    let div = element(&document, 0);
    assert_eq!(div.name, "div");
    let Node::Element(p) = &div.children[0] else {
      panic!("expected <p>");
    };
    assert_eq!(p.name, "p");
    assert_eq!(p.children, vec![Node::Text("hello".to_string())]);
  }

  #[test]
  fn tag_and_attribute_names_lowercase() {
    let document = parse(r#"<IMG SRC="a.png" Alt="x">"#).unwrap();
    let img = element(&document, 0);
    assert_eq!(img.name, "img");
    assert_eq!(img.attribute("src"), Some("a.png"));
    assert_eq!(img.attribute("alt"), Some("x"));
  }

  #[test]
  fn attribute_syntaxes() {
    let document = parse(r#"<input disabled type=text name='n' value="a b">"#).unwrap();
    let input = element(&document, 0);
    assert_eq!(input.attribute("disabled"), Some(""));
    assert_eq!(input.attribute("type"), Some("text"));
    assert_eq!(input.attribute("name"), Some("n"));
    assert_eq!(input.attribute("value"), Some("a b"));
  }

  #[test]
  fn duplicate_attributes_first_wins() {
    let document = parse(r#"<a href="one" href="two">x</a>"#).unwrap();
    assert_eq!(element(&document, 0).attribute("href"), Some("one"));
  }

  #[test]
  fn entities_decode_in_text_and_attributes() {
    let document = parse(r#"<p title="a &amp; b">1 &lt; 2 &#64; &#x40;</p>"#).unwrap();
    let p = element(&document, 0);
    assert_eq!(p.attribute("title"), Some("a & b"));
    assert_eq!(p.text_content(), "1 < 2 @ @");
  }

  #[test]
  fn comment_node() {
    let document = parse("<!-- a <b> inside -->").unwrap();
    assert_eq!(
      document.children,
      vec![Node::Comment(" a <b> inside ".to_string())]
    );
  }

  #[test]
  fn unterminated_comment_is_fatal() {
    assert_eq!(
      parse("line one\n<!-- never closed"),
      Err(ParseError::UnterminatedComment { line: 2 })
    );
  }

  #[test]
  fn unterminated_quoted_attribute_is_fatal() {
    assert_eq!(
      parse(r#"<a href="nope>"#),
      Err(ParseError::UnterminatedAttributeValue {
        name: "href".to_string(),
        line: 1,
      })
    );
  }

  #[test]
  fn doctype_round_trips_through_the_element_model() {
    let document = parse("<!DOCTYPE html><html></html>").unwrap();
    let doctype = element(&document, 0);
    assert_eq!(doctype.name, "!doctype");
    assert_eq!(doctype.attribute("html"), Some(""));
    assert!(doctype.children.is_empty());
    assert_eq!(element(&document, 1).name, "html");
  }

  #[test]
  fn processing_instruction_degrades_to_comment() {
    let document = parse(r#"<?xml version="1.0"?><p>x</p>"#).unwrap();
    assert_eq!(
      document.children[0],
      Node::Comment(r#"?xml version="1.0"?"#.to_string())
    );
    assert_eq!(element(&document, 1).name, "p");
  }

  #[test]
  fn void_elements_take_no_children() {
    let document = parse("<p>a<br>b<img src=x.png>c</p>").unwrap();
    let p = element(&document, 0);
    assert_eq!(p.children.len(), 5);
    for node in &p.children {
      if let Node::Element(child) = node {
        assert!(child.children.is_empty(), "<{}> must stay empty", child.name);
      }
    }
  }

  #[test]
  fn self_closing_syntax_pops_immediately() {
    let document = parse("<widget a=1/><p>after</p>").unwrap();
    let widget = element(&document, 0);
    assert_eq!(widget.name, "widget");
    assert!(widget.children.is_empty());
    assert_eq!(element(&document, 1).name, "p");
  }

  #[test]
  fn unclosed_tags_close_at_the_matching_ancestor() {
    let document = parse("<outer><inner>text</outer>").unwrap();
    assert_eq!(document.children.len(), 1);
    let outer = element(&document, 0);
    assert_eq!(outer.name, "outer");
    let Node::Element(inner) = &outer.children[0] else {
      panic!("expected <inner>");
    };
    assert_eq!(inner.name, "inner");
    assert_eq!(inner.text_content(), "text");
  }

  #[test]
  fn stray_close_tag_is_dropped() {
    let document = parse("<div>a</span>b</div>").unwrap();
    let div = element(&document, 0);
    assert_eq!(div.text_content(), "ab");
  }

  #[test]
  fn end_of_input_closes_open_elements() {
    let document = parse("<html><body><p>dangling").unwrap();
    let html = element(&document, 0);
    assert_eq!(html.name, "html");
    let Node::Element(body) = &html.children[0] else {
      panic!("expected <body>");
    };
    let Node::Element(p) = &body.children[0] else {
      panic!("expected <p>");
    };
    assert_eq!(p.text_content(), "dangling");
  }

  #[test]
  fn lone_angle_bracket_is_literal_text() {
    let document = parse("<p>1 < 2 and 2 > 1</p>").unwrap();
    assert_eq!(element(&document, 0).text_content(), "1 < 2 and 2 > 1");
  }

  #[test]
  fn script_content_is_verbatim() {
    let source = r#"<script>if (a < b && c) { d("</div>"); }</script>"#;
    let document = parse(source).unwrap();
    let script = element(&document, 0);
    assert_eq!(
      script.children,
      vec![Node::Text(r#"if (a < b && c) { d("</div>"); }"#.to_string())]
    );
  }

  #[test]
  fn script_close_tag_matching_is_case_insensitive_and_boundary_aware() {
    let document = parse("<script>var s = '</scriptx';</SCRIPT ><p>x</p>").unwrap();
    let script = element(&document, 0);
    assert_eq!(
      script.children,
      vec![Node::Text("var s = '</scriptx';".to_string())]
    );
    assert_eq!(element(&document, 1).name, "p");
  }

  #[test]
  fn style_content_keeps_entities_raw() {
    let document = parse("<style>a::before{content:\"&gt;\"}</style>").unwrap();
    let style = element(&document, 0);
    assert_eq!(
      style.children,
      vec![Node::Text("a::before{content:\"&gt;\"}".to_string())]
    );
  }

  #[test]
  fn unterminated_raw_text_closes_at_end_of_input() {
    let document = parse("<style>body{color:red}").unwrap();
    let style = element(&document, 0);
    assert_eq!(style.text_content(), "body{color:red}");
  }

  #[test]
  fn whitespace_text_nodes_are_preserved() {
    let document = parse("<div>\n  <p>x</p>\n</div>").unwrap();
    let div = element(&document, 0);
    assert_eq!(div.children.len(), 3);
    assert_eq!(div.children[0], Node::Text("\n  ".to_string()));
    assert_eq!(div.children[2], Node::Text("\n".to_string()));
  }
}
