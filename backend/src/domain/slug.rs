//! URL slugs for catalogue entries.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and single hyphens. Callers may supply one explicitly or
//! have it derived from the display name.

/// Longest slug accepted.
pub const SLUG_MAX: usize = 64;

/// Return `true` when `value` is a valid slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    is_trimmed_non_empty(value) && value.len() <= SLUG_MAX && has_allowed_slug_chars(value)
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Derive a slug from a display name.
///
/// Alphanumeric ASCII runs are lower-cased and joined by single hyphens;
/// everything else is treated as a separator. The result is truncated to
/// [`SLUG_MAX`] without leaving a trailing hyphen, and may be empty when the
/// name contains no ASCII alphanumerics.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug.truncate(SLUG_MAX);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
