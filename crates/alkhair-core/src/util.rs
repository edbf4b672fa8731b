//! Small helpers shared by the remote client, config and models.

/// Longest server error body kept in a `RemoteError`.
const ERROR_EXCERPT_CHARS: usize = 180;

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

/// First few characters of a response body, for error messages.
pub fn error_excerpt(body: &str) -> String {
    body.trim().chars().take(ERROR_EXCERPT_CHARS).collect()
}

/// Milliseconds since the Unix epoch. Every `updated_at` uses this unit.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_drops_whitespace_tokens() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" \n ".to_string())), None);
        assert_eq!(non_blank(Some(" jwt ".to_string())), Some("jwt".to_string()));
    }

    #[test]
    fn only_http_schemes_are_urls() {
        assert!(is_http_url("https://school.supabase.co"));
        assert!(is_http_url("http://127.0.0.1:54321"));
        assert!(!is_http_url("postgres://school"));
    }

    #[test]
    fn error_excerpt_is_bounded() {
        let body = format!("  {}", "e".repeat(400));
        assert_eq!(error_excerpt(&body).chars().count(), ERROR_EXCERPT_CHARS);
    }

    #[test]
    fn clock_is_in_milliseconds() {
        assert!(unix_millis_now() > 1_600_000_000_000);
    }
}
