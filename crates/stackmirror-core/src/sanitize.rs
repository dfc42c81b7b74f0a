//! Record name derivation.

/// Derive a store-legal record name from an arbitrary identifier.
///
/// Drops every character outside `[A-Za-z0-9 ]` and lowercases the rest.
/// Total and idempotent. No length limit is applied.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Whether `s` is already in sanitized form (`^[a-z0-9 ]*$`).
pub fn is_sanitized(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ')
}
