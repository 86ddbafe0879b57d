//! Canonical form for group labels coming from independently sourced endpoints.
//!
//! Only comparisons go through the canonical form; display keeps the raw label.

/// Collapses whitespace runs to one space, trims and upper-cases.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Absent labels normalize to the empty string.
pub fn normalize_opt(label: Option<&str>) -> String {
    label.map(normalize_label).unwrap_or_default()
}

pub fn labels_match(a: &str, b: &str) -> bool {
    normalize_label(a) == normalize_label(b)
}
