// Utility functions
use chrono::{DateTime, Utc};

/// Parses an RFC 3339 string into `DateTime<Utc>`, if possible.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Trims and lower-cases text for substring matching.
/// Scripts without case (Hebrew, Arabic) pass through unchanged.
pub fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True if any of the (already folded) keywords occurs in `haystack`.
pub fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Cuts text to at most `max` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_lowercases_latin_and_keeps_hebrew() {
        assert_eq!(fold("  Tel Aviv "), "tel aviv");
        assert_eq!(fold(" תל אביב"), "תל אביב");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("חיפה", 10), "חיפה");
        assert_eq!(truncate_chars("דרושים בחיפה", 6), "דרושים…");
    }

    #[test]
    fn parses_rfc3339() {
        assert!(parse_datetime("2024-05-01T10:00:00Z").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }
}
