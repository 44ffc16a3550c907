//! Name normalization and string ordering
//!
//! Program names and aliases are indexed by a normalized key: lowercase,
//! accents removed, only alphanumeric characters kept. The same key decides
//! whether two differing strings are merely "similar".

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Outcome of comparing two strings
///
/// `Similar` means the strings differ but share the same normalized key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonResult {
    Smaller,
    Bigger,
    Equal,
    Similar,
}

/// Remove accents by decomposing and dropping combining marks
pub fn remove_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Lowercase, accent-free, alphanumeric-only index key
///
/// ```
/// use rbtag_common::text::normalize_name;
///
/// assert_eq!(normalize_name("Morning Show"), "morningshow");
/// assert_eq!(normalize_name("L'Été_Indien!"), "leteindien");
/// ```
pub fn normalize_name(name: &str) -> String {
    remove_accents(&name.to_lowercase())
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Compare two strings: exact equality first, then normalized equality,
/// then plain lexicographic order.
pub fn compare_str(a: &str, b: &str) -> ComparisonResult {
    if a == b {
        return ComparisonResult::Equal;
    }
    if normalize_name(a) == normalize_name(b) {
        return ComparisonResult::Similar;
    }
    match a.cmp(b) {
        Ordering::Greater => ComparisonResult::Bigger,
        _ => ComparisonResult::Smaller,
    }
}
