//! Content lines inside a `VEVENT` block

use domain::FeedInstant;

use super::datetime::parse_ics_datetime;
use crate::ports::TextSanitizer;

/// A recognized event property, with its value already cleaned
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FeedProperty {
    Summary(String),
    DtStart(Option<FeedInstant>),
    DtEnd(Option<FeedInstant>),
    Description(String),
    Location(String),
    Uid(String),
    /// Any other key, or a line without a colon
    Unrecognized,
}

impl FeedProperty {
    /// Classify a `KEY[;PARAM=...]:VALUE` line
    ///
    /// Parameters are discarded; only the bare key is inspected.
    pub(crate) fn from_line(line: &str, sanitizer: &dyn TextSanitizer) -> Self {
        let Some((head, value)) = line.split_once(':') else {
            return Self::Unrecognized;
        };
        let key = head.split_once(';').map_or(head, |(key, _)| key).trim();

        let text = |value: &str| sanitizer.sanitize_text(&unescape_text(value));

        if key.eq_ignore_ascii_case("SUMMARY") {
            Self::Summary(text(value))
        } else if key.eq_ignore_ascii_case("DTSTART") {
            Self::DtStart(parse_ics_datetime(value))
        } else if key.eq_ignore_ascii_case("DTEND") {
            Self::DtEnd(parse_ics_datetime(value))
        } else if key.eq_ignore_ascii_case("DESCRIPTION") {
            Self::Description(text(value))
        } else if key.eq_ignore_ascii_case("LOCATION") {
            Self::Location(text(value))
        } else if key.eq_ignore_ascii_case("UID") {
            Self::Uid(value.to_string())
        } else {
            Self::Unrecognized
        }
    }
}

/// Undo RFC 5545 TEXT escaping (`\\`, `\;`, `\,`, `\n`, `\N`)
///
/// Unknown escapes keep the backslash.
pub(crate) fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ ('\\' | ';' | ',')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }

    out
}
