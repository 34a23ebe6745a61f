//! Name normalization and identifier generation.

use uuid::Uuid;

/// Result of normalizing a user-supplied name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    /// Normalized value used for storage and comparison
    pub value: String,

    /// True when characters had to be replaced (beyond trimming and
    /// lowercasing), so the caller can tell the user
    pub changed: bool,
}

/// Trim, lowercase, and replace anything outside `[a-z0-9_-]` with `-`.
pub fn normalize_name(raw: &str) -> NormalizedName {
    let lowered = raw.trim().to_lowercase();
    let value: String = lowered
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            _ => '-',
        })
        .collect();

    NormalizedName {
        changed: value != lowered,
        value,
    }
}

/// Whether a stored name is already in normalized form
pub fn is_normalized(name: &str) -> bool {
    normalize_name(name).value == name
}

/// Whether a user-supplied string is empty once trimmed
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Generate a unique identifier such as `prof_3f2a...`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
