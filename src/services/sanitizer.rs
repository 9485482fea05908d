use std::sync::OnceLock;

use regex::Regex;

const MAX_DESTINATION_LEN: usize = 50;
const MAX_COMMENT_LEN: usize = 1000;

/// Strips everything outside letters, spaces and hyphens from a destination
/// name and caps its length. An empty result means the input was unusable.
pub fn sanitize_destination(raw: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"[^a-zA-Z\s-]").expect("hardcoded pattern"));

    let cleaned = pattern.replace_all(raw.trim(), "");
    cleaned
        .chars()
        .take(MAX_DESTINATION_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Trims free-text comments, drops control characters and caps the length.
pub fn sanitize_comments(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .take(MAX_COMMENT_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_strips_special_characters() {
        assert_eq!(sanitize_destination("  Paris!  "), "Paris");
        assert_eq!(sanitize_destination("New York 123"), "New York");
        assert_eq!(sanitize_destination("<script>tokyo</script>"), "scripttokyoscript");
        assert_eq!(sanitize_destination("Aix-en-Provence"), "Aix-en-Provence");
    }

    #[test]
    fn test_destination_caps_length() {
        let long = "a".repeat(200);
        assert_eq!(sanitize_destination(&long).len(), MAX_DESTINATION_LEN);
    }

    #[test]
    fn test_destination_empty_when_nothing_survives() {
        assert_eq!(sanitize_destination("12345!@#"), "");
        assert_eq!(sanitize_destination("   "), "");
    }

    #[test]
    fn test_comments_drop_control_chars_and_cap() {
        assert_eq!(sanitize_comments("  great\ttrip\u{0000}  "), "greattrip");
        assert_eq!(sanitize_comments("line one\nline two"), "line one\nline two");

        let long = "x".repeat(2000);
        assert_eq!(sanitize_comments(&long).len(), MAX_COMMENT_LEN);
    }
}
