use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// Pad directive immediately followed by the numeric placeholder,
    /// e.g. `{PAD:5}{n}`. The colon is optional and matching is
    /// case-insensitive.
    static ref PAD_DIRECTIVE: Regex = Regex::new(r"(?i)\{PAD:?(\d+)\}\{n\}").unwrap();
}

const PLACEHOLDER: &str = "{n}";

/// Render an allocated value into a display pattern.
///
/// Rules:
/// - `{PAD:N}{n}` is replaced by the decimal value left-padded with `'0'`
///   to width `N`. Padding only lengthens; a value already wider than `N`
///   is rendered in full, never truncated.
/// - Any remaining bare `{n}` is replaced by the decimal value, at every
///   occurrence.
/// - A pattern with neither token is returned unchanged. Malformed
///   configuration must not block a record creation once a number has
///   been allocated, so there is no error path here.
///
/// The value is always rendered as plain decimal digits, independent of
/// locale.
///
/// # Examples
///
/// ```
/// use autonumber::format::render;
///
/// assert_eq!(render("INV-{n}", 7), "INV-7");
/// assert_eq!(render("ORD-{PAD:5}{n}", 42), "ORD-00042");
/// assert_eq!(render("ORD-{PAD:3}{n}", 12345), "ORD-12345");
/// assert_eq!(render("STATIC", 9), "STATIC");
/// ```
pub fn render(pattern: &str, value: i64) -> String {
    let digits = value.to_string();

    let rendered = PAD_DIRECTIVE.replace_all(pattern, |caps: &Captures| {
        // \d+ always parses; overflow degrades to no padding.
        let width: usize = caps[1].parse().unwrap_or(0);
        pad_left(&digits, width)
    });

    if rendered.contains(PLACEHOLDER) {
        return rendered.replace(PLACEHOLDER, &digits);
    }
    rendered.into_owned()
}

fn pad_left(digits: &str, width: usize) -> String {
    if digits.len() >= width {
        return digits.to_string();
    }
    let mut padded = String::with_capacity(width);
    for _ in 0..width - digits.len() {
        padded.push('0');
    }
    padded.push_str(digits);
    padded
}
