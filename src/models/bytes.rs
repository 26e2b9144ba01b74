//! Byte-slice helpers.

/// Returns true if `needle` occurs anywhere in `haystack`.
///
/// An empty needle occurs in every haystack.
#[must_use]
pub fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}
