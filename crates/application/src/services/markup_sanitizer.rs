//! Markup sanitizer for imported feed text
//!
//! Feed text is untrusted. Before it is stored, HTML/XML tags are removed,
//! the bodies of `<script>` and `<style>` elements are dropped, script URL
//! schemes are neutralised and control characters other than newline and
//! tab are stripped.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

use crate::ports::TextSanitizer;

/// URL schemes that can execute code when rendered as a link
static SCRIPT_SCHEMES: LazyLock<AhoCorasick> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Infallible with valid static patterns
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(["javascript:", "vbscript:", "data:"])
        .expect("Failed to build scheme matcher")
});

/// Elements whose content is removed together with the tags
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Default [`TextSanitizer`] implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupSanitizer;

impl MarkupSanitizer {
    /// Create a new sanitizer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TextSanitizer for MarkupSanitizer {
    fn sanitize_text(&self, raw: &str) -> String {
        let without_tags = strip_tags(raw);
        let neutralised = strip_script_schemes(&without_tags);

        neutralised
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
            .collect::<String>()
            .trim()
            .to_string()
    }
}

/// Remove tags, and the content of raw-text elements
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        // A bare `<` ("a < b", "<3") is text
        if !starts_tag(after) {
            out.push('<');
            rest = after;
            continue;
        }

        let Some(close) = after.find('>') else {
            // Unterminated tag, drop the remainder
            return out;
        };
        let tag = &after[..close];
        rest = &after[close + 1..];

        if let Some(element) = raw_text_element(tag) {
            rest = skip_past_closing(rest, element);
        }
    }

    out.push_str(rest);
    out
}

/// Whether the text after a `<` opens a tag, end tag, comment or declaration
fn starts_tag(after: &str) -> bool {
    after
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!'))
}

/// Remove script schemes that begin a word
///
/// A scheme preceded by a letter or digit is part of a longer word
/// ("Metadata:") and is kept.
fn strip_script_schemes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut kept_until = 0;

    for found in SCRIPT_SCHEMES.find_iter(text) {
        let starts_word = text[..found.start()]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        if starts_word {
            out.push_str(&text[kept_until..found.start()]);
            kept_until = found.end();
        }
    }

    out.push_str(&text[kept_until..]);
    out
}

fn raw_text_element(tag: &str) -> Option<&'static str> {
    let name = tag
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default();
    RAW_TEXT_ELEMENTS
        .into_iter()
        .find(|element| name.eq_ignore_ascii_case(element))
        .filter(|_| !tag.trim_end().ends_with('/'))
}

/// Text following the `</element>` that closes a raw-text element
fn skip_past_closing<'a>(rest: &'a str, element: &str) -> &'a str {
    let closing = format!("</{element}");
    let lower = rest.to_ascii_lowercase();

    lower.find(&closing).map_or("", |start| {
        let tail = &rest[start..];
        tail.find('>').map_or("", |end| &tail[end + 1..])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(raw: &str) -> String {
        MarkupSanitizer::new().sanitize_text(raw)
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(sanitize("Team standup"), "Team standup");
    }

    #[test]
    fn strips_tags() {
        assert_eq!(sanitize("<b>Bold</b> and <i>italic</i>"), "Bold and italic");
        assert_eq!(sanitize("<a href=\"https://x\">link</a>"), "link");
    }

    #[test]
    fn drops_script_and_style_bodies() {
        assert_eq!(sanitize("Hi<script>alert('x')</script> there"), "Hi there");
        assert_eq!(sanitize("<STYLE type=\"text/css\">p{}</STYLE>Text"), "Text");
        assert_eq!(sanitize("a<script>never closed"), "a");
    }

    #[test]
    fn neutralises_script_schemes() {
        assert_eq!(sanitize("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize("see vbscript:x"), "see x");
        assert_eq!(sanitize("data:text/html,hi"), "text/html,hi");
    }

    #[test]
    fn strips_control_characters_but_keeps_layout() {
        assert_eq!(sanitize("a\u{0}b\u{7}c"), "abc");
        assert_eq!(sanitize("line1\nline2\tx"), "line1\nline2\tx");
    }

    #[test]
    fn trims_result() {
        assert_eq!(sanitize("  <p> Room 4 </p>  "), "Room 4");
    }

    #[test]
    fn unterminated_tag_is_dropped() {
        assert_eq!(sanitize("Agenda <b"), "Agenda");
    }

    #[test]
    fn lone_greater_than_is_kept() {
        assert_eq!(sanitize("5 > 3"), "5 > 3");
    }

    #[test]
    fn bare_less_than_is_text() {
        assert_eq!(sanitize("Lunch <3 with team"), "Lunch <3 with team");
        assert_eq!(sanitize("a < b"), "a < b");
        assert_eq!(
            sanitize("Budget < 5M, target > 10M"),
            "Budget < 5M, target > 10M"
        );
        assert_eq!(sanitize("x <= y <b>bold</b>"), "x <= y bold");
    }

    #[test]
    fn comments_are_stripped() {
        assert_eq!(sanitize("Room<!-- internal --> 4"), "Room 4");
    }

    #[test]
    fn schemes_inside_words_are_kept() {
        assert_eq!(sanitize("Metadata: review"), "Metadata: review");
        assert_eq!(sanitize("Bigdata:Q3"), "Bigdata:Q3");
    }

    #[test]
    fn schemes_after_punctuation_are_removed() {
        assert_eq!(sanitize("(javascript:alert(1))"), "(alert(1))");
        assert_eq!(sanitize("link=data:text/html"), "link=text/html");
    }
}
