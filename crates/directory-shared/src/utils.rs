//! Utility functions

/// Canonical form of a menu location key: trimmed and lowercased, so
/// `" Header"` and `"header"` address the same cache entry and menu row.
pub fn normalize_location(location: &str) -> String {
    location.trim().to_lowercase()
}
