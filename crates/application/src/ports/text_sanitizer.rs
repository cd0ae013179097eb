//! Text sanitizer port

#[cfg(test)]
use mockall::automock;

/// Strips unsafe markup from untrusted text before it is stored or rendered
#[cfg_attr(test, automock)]
pub trait TextSanitizer: Send + Sync {
    /// Return a safe version of `raw`
    fn sanitize_text(&self, raw: &str) -> String;
}
