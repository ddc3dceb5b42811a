// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value normalization and clustering keys (`spec.md` §4.6 step 2).

/// Lowercase and collapse internal whitespace, mirroring the normalization
/// snippets use for hashing (`specfactory_evidence::content and friends).
#[must_use]
pub fn normalize_value(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Extract the leading numeric token from a value string, stripping
/// thousands separators (`spec.md` §4.6: "strip commas/units").
///
/// Returns `None` if no leading digits are present.
#[must_use]
pub fn extract_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let trimmed = cleaned.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    let bytes = trimmed.as_bytes();
    let mut idx = 0;
    if bytes.first() == Some(&b'-') {
        idx += 1;
    }
    for (i, c) in trimmed[idx..].char_indices() {
        if c.is_ascii_digit() {
            seen_digit = true;
            end = idx + i + c.len_utf8();
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = idx + i + c.len_utf8();
        } else {
            break;
        }
    }
    if !seen_digit {
        return None;
    }
    trimmed[..end].parse::<f64>().ok()
}

/// Cluster key grouping candidates whose values are equivalent for
/// consensus purposes.
///
/// When `numeric_tolerance_pct` is set and both values parse as numbers,
/// values within the given relative tolerance bucket together (`spec.md`
/// §4.6 step 2: "for numerics... compare within a field-specific
/// tolerance"). Otherwise the normalized text itself is the key.
#[must_use]
pub fn cluster_key(raw: &str, numeric_tolerance_pct: Option<f64>) -> String {
    let normalized = normalize_value(raw);
    if let Some(tol) = numeric_tolerance_pct {
        if let Some(n) = extract_numeric(&normalized) {
            let bucket_size = (n.abs() * tol).max(1e-9);
            let bucket = (n / bucket_size).round() as i64;
            return format!("numeric:{bucket}");
        }
    }
    normalized
}
