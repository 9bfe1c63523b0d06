//! Input sanitization for `ContentItem` fields: strips HTML-ish tags and
//! control characters before anything is persisted or re-read.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length for any free-text `ContentItem` field.
pub const MAX_FIELD_LENGTH: usize = 10_000;

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[A-Za-z!][^>]*>").unwrap());

/// Strips HTML-ish tags and control characters (preserving `\n`/`\t`), then
/// caps length. Applied on both write and read for defense-in-depth.
pub fn sanitize_field(input: &str) -> String {
    let without_tags = TAG_PATTERN.replace_all(input, "");
    without_tags
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_FIELD_LENGTH)
        .collect()
}

/// Forbidden top-level keys a caller must never be able to set directly;
/// these are always server-computed.
pub const FORBIDDEN_FIELDS: &[&str] = &["_id", "owner", "updated_at", "stored_at"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_tags() {
        assert_eq!(sanitize_field("<b>bold</b> text"), "bold text");
        assert_eq!(sanitize_field("<script src=\"x\">evil()</script>"), "evil()");
    }

    #[test]
    fn keeps_newlines_and_tabs_strips_control_chars() {
        let input = "line1\nline2\ttabbed\x07bell";
        assert_eq!(sanitize_field(input), "line1\nline2\ttabbedbell");
    }

    #[test]
    fn caps_length() {
        let input = "a".repeat(MAX_FIELD_LENGTH + 500);
        assert_eq!(sanitize_field(&input).len(), MAX_FIELD_LENGTH);
    }
}
