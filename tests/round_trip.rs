//! Parse → render → parse must reproduce the same tree.

use htmlpack::{parse, render};
use pretty_assertions::assert_eq;

fn assert_round_trips(source: &str) {
  let tree = parse(source).unwrap();
  let rendered = render(&tree);
  let reparsed = parse(&rendered).unwrap();
  assert_eq!(reparsed, tree, "render output was: {rendered}");
}

#[test]
fn plain_document() {
  assert_round_trips(concat!(
    "<!DOCTYPE html>\n<html>\n<head><title>t</title>",
    "<meta charset=\"utf-8\"></head>\n",
    "<body><h1 class=\"big\" hidden>Header</h1>",
    "<p>one &amp; two &lt;three&gt;</p></body>\n</html>",
  ));
}

#[test]
fn comments_and_entities() {
  assert_round_trips("<!-- before --><p title=\"a &quot;b&quot;\">x &amp; y</p><!-- after -->");
}

#[test]
fn raw_text_elements() {
  assert_round_trips(concat!(
    "<style>a > b { content: \"</p>\" }</style>",
    "<script>for (let i = 0; i < 3; i++) { s += \"&amp;\"; }</script>",
  ));
}

#[test]
fn void_elements_and_bare_attributes() {
  assert_round_trips(r#"<form><input disabled name=q><br><img src="a.png" alt=""><hr></form>"#);
}

#[test]
fn recovered_markup_stays_stable() {
  // Leniency output must itself round-trip: implicit closes, stray close
  // tags and literal angle brackets all normalize on the first parse.
  for source in [
    "<div><p>unclosed",
    "<div>a</span>b</div>",
    "<p>1 < 2 and 2 > 1</p>",
    "<ul><li>one<li>two</ul>",
  ] {
    let tree = parse(source).unwrap();
    let rendered = render(&tree);
    let reparsed = parse(&rendered).unwrap();
    assert_eq!(reparsed, tree, "source was: {source}");
  }
}

#[test]
fn unknown_and_custom_elements() {
  assert_round_trips("<x-widget data-x=\"1\"><slot-like>inner</slot-like></x-widget>");
}
