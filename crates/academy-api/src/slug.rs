//! URL slug derivation for course titles.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of anything that is not a lowercase ASCII letter or digit.
#[allow(clippy::expect_used)]
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug separator pattern is valid"));

/// Fallback stem when a title has no slug-able characters.
const FALLBACK_STEM: &str = "course";

/// Converts free text into a URL-safe slug.
///
/// ```
/// use academy_api::slug::slugify;
///
/// assert_eq!(slugify("  Intro to X!  "), "intro-to-x");
/// assert_eq!(slugify("C++ & Rust"), "c-rust");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Builds a course slug from its English title and a unix-millisecond stamp.
///
/// The stamp narrows collisions between courses with equal titles; it does
/// not rule them out, so the store still checks uniqueness.
pub fn course_slug(title_en: &str, millis: i64) -> String {
    let stem = slugify(title_en);
    if stem.is_empty() {
        format!("{FALLBACK_STEM}-{millis}")
    } else {
        format!("{stem}-{millis}")
    }
}
