//! URL helpers for attribute values read from the DOM.

use url::Url;

/// Resolve a possibly relative `href`/`src` against the page URL.
///
/// Returns the raw value unchanged when there is no base, when it is
/// already absolute, or when joining fails.
#[must_use]
pub fn resolve_url(base: Option<&Url>, raw: &str) -> String {
    if raw.is_empty() || Url::parse(raw).is_ok() {
        return raw.to_string();
    }
    match base.map(|b| b.join(raw)) {
        Some(Ok(joined)) => joined.to_string(),
        _ => raw.to_string(),
    }
}

/// Check that a string is an absolute http(s) URL.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_href_is_joined() {
        let base = Url::parse("https://www.youtube.com/@chan/videos").ok();
        assert_eq!(
            resolve_url(base.as_ref(), "/watch?v=abc"),
            "https://www.youtube.com/watch?v=abc"
        );
    }

    #[test]
    fn absolute_href_is_kept() {
        let base = Url::parse("https://www.youtube.com/").ok();
        assert_eq!(
            resolve_url(base.as_ref(), "https://i.ytimg.com/vi/abc/hq.jpg"),
            "https://i.ytimg.com/vi/abc/hq.jpg"
        );
        assert_eq!(resolve_url(None, "/watch?v=abc"), "/watch?v=abc");
    }

    #[test]
    fn url_validation() {
        assert!(is_valid_url("https://www.youtube.com/@chan"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("not a url"));
    }
}
