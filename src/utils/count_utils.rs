//! Parsing of abbreviated counters ("1,2 тыс.", "12K", "3 млн")
//!
//! Like and view counters are rendered in a compact, locale-dependent form,
//! often only inside an `aria-label`. These helpers turn them into plain
//! integers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Number with optional thousands separators and decimal part, followed by
/// an optional magnitude suffix.
static COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{1,3}(?:[,. \u{a0}\u{202f}]\d{3})+(?:[.,]\d+)?|\d+(?:[.,]\d+)?)\s*(тыс|млн|млрд|k|m|b)?\b",
    )
        .expect("Invalid compact count regex")
});

/// Parse the first counter found in `label`.
///
/// Returns `None` when the label contains no digits.
///
/// # Examples
/// ```
/// # use kodegen_tools_tubescrape::utils::count_utils::parse_compact_count;
/// assert_eq!(parse_compact_count("Нравится: вам и ещё 1,2 тыс. пользователям"), Some(1_200));
/// assert_eq!(parse_compact_count("12K"), Some(12_000));
/// assert_eq!(parse_compact_count("4 567"), Some(4_567));
/// assert_eq!(parse_compact_count("no likes yet"), None);
/// ```
#[must_use]
pub fn parse_compact_count(label: &str) -> Option<u64> {
    let caps = COUNT_RE.captures(label)?;
    let number: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect();

    let multiplier: u64 = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(s) if s == "тыс" || s == "k" => 1_000,
        Some(s) if s == "млн" || s == "m" => 1_000_000,
        Some(s) if s == "млрд" || s == "b" => 1_000_000_000,
        _ => 1,
    };

    // Separators followed by exactly three digits group thousands. A trailing
    // group of any other width is the decimal part ("1,2 тыс.", "1,234.5").
    let mut groups: Vec<&str> = number.split([',', '.']).collect();
    let last_len = groups.last().map_or(0, |g| g.len());
    let is_decimal =
        groups.len() > 1 && (last_len != 3 || (multiplier > 1 && groups.len() == 2));
    let frac_part = if is_decimal {
        groups.pop().unwrap_or_default()
    } else {
        ""
    };
    let int_part = groups.concat();

    let whole: u64 = int_part.parse().ok()?;
    let mut value = whole.checked_mul(multiplier)?;

    if !frac_part.is_empty() && multiplier > 1 {
        let digits = frac_part.len().min(9) as u32;
        let frac: u64 = frac_part[..digits as usize].parse().ok()?;
        value = value.checked_add(frac * multiplier / 10u64.pow(digits))?;
    }

    Some(value)
}
