//! Index name normalization

/// Longest safe name the index store accepts
const MAX_SAFE_NAME_LEN: usize = 128;

/// Normalize a name to the characters index stores accept.
///
/// Keeps ASCII letters, digits, `_` and `-`, then drops leading characters
/// until the name starts with a letter, and truncates to 128 characters.
pub fn to_safe_name(name: &str) -> String {
    if name.trim().is_empty() {
        return String::new();
    }

    let stripped: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    stripped
        .trim_start_matches(|c: char| !c.is_ascii_alphabetic())
        .chars()
        .take(MAX_SAFE_NAME_LEN)
        .collect()
}

/// A valid index name is non-blank and already in safe-name form.
pub fn is_valid_index_name(name: &str) -> bool {
    !name.trim().is_empty() && to_safe_name(name) == name
}
