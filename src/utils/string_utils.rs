//! Small string helpers shared by workflows and session adapters

/// Extract a channel handle from a channel URL.
///
/// Returns the text after the first `@`, trimmed, or `None` when the URL
/// carries no handle (legacy `/channel/UC...` URLs).
///
/// # Examples
/// ```
/// # use kodegen_tools_tubescrape::utils::string_utils::extract_channel_handle;
/// assert_eq!(
///     extract_channel_handle("https://www.youtube.com/@rustlang"),
///     Some("rustlang")
/// );
/// assert_eq!(extract_channel_handle("https://www.youtube.com/channel/UC123"), None);
/// ```
#[must_use]
pub fn extract_channel_handle(url: &str) -> Option<&str> {
    let at = url.find('@')?;
    let handle = url[at + 1..].trim();
    // Trailing tab segments ("/videos", "/shorts") are not part of the handle
    let handle = handle.split(['/', '?', '#']).next().unwrap_or(handle);
    if handle.is_empty() { None } else { Some(handle) }
}

/// Collapse runs of whitespace (including non-breaking spaces) into single spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(|c: char| c.is_whitespace() || c == '\u{a0}') {
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_taken_after_at_sign() {
        assert_eq!(
            extract_channel_handle("https://www.youtube.com/@SomeChannel "),
            Some("SomeChannel")
        );
    }

    #[test]
    fn handle_stops_at_tab_segment() {
        assert_eq!(
            extract_channel_handle("https://www.youtube.com/@SomeChannel/videos"),
            Some("SomeChannel")
        );
    }

    #[test]
    fn missing_or_empty_handle_is_none() {
        assert_eq!(extract_channel_handle("https://www.youtube.com/"), None);
        assert_eq!(extract_channel_handle("https://www.youtube.com/@"), None);
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(collapse_whitespace("  1\u{a0}234   views \n"), "1 234 views");
    }
}
