//! Normalization applied to article bodies before summarization.

use regex::Regex;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid html tag pattern"));
static WIRE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(Reuters\)|\(AP\)|\(AFP\)").expect("valid wire tag pattern"));
static TRAILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Read more|Source):.*$").expect("valid trailer pattern"));

/// Strip markup, wire-service tags, and `Read more:` / `Source:` trailers; collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, "");
    let collapsed = collapse_whitespace(&without_tags);
    let without_wire = WIRE_TAG.replace_all(&collapsed, "");
    let without_trailer = TRAILER.replace(&without_wire, "");
    collapse_whitespace(&without_trailer)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
