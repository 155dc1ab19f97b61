//! Comma-joined text fields.
//!
//! Candidates carry list-valued attributes (ingredients, documents, target
//! countries) as a single comma-joined string so they can be edited as one
//! text box. Records carry them as ordered lists.

/// Split a comma-joined field into trimmed, non-empty tokens, order preserved.
///
/// Tokens that themselves contained a comma cannot be recovered.
pub fn split_on_comma(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tokens back into the comma-joined editing form.
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
