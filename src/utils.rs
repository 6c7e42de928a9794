//! Shared helpers used by both the API layer and the distance resolver.

/// Returns true when a string is absent or contains only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Format a street address and its city into a single routable place
/// string, e.g. `"12 Rue Ibn Sina, Casablanca"`.
pub fn format_place(address: &str, city: &str) -> String {
    format!("{}, {}", address.trim(), city.trim())
}
