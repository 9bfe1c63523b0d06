//! Input validation and sanitization shared by the clip/content handlers.

pub use recap_models::is_valid_clip_id;

/// Maximum free-text field length accepted from a caller before storage.
pub const MAX_PROMPT_LENGTH: usize = 5000;

/// Maximum title length accepted from a caller.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Strips control characters (preserving `\n`/`\t`) and caps length.
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_PROMPT_LENGTH)
        .collect()
}

/// Trims and caps a title for storage.
pub fn sanitize_title(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.len() > MAX_TITLE_LENGTH {
        trimmed.chars().take(MAX_TITLE_LENGTH).collect()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_id_validation_matches_the_model() {
        assert!(is_valid_clip_id("abcDEF_12"));
        assert!(!is_valid_clip_id("has a space"));
        assert!(!is_valid_clip_id(""));
    }

    #[test]
    fn sanitize_string_strips_control_chars_keeps_newlines() {
        assert_eq!(sanitize_string("line1\nline2\x07bell"), "line1\nline2bell");
    }

    #[test]
    fn sanitize_title_trims_and_caps() {
        assert_eq!(sanitize_title("  hello  "), "hello");
        let long = "a".repeat(MAX_TITLE_LENGTH + 10);
        assert_eq!(sanitize_title(&long).len(), MAX_TITLE_LENGTH);
    }
}
