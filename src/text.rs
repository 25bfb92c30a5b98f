use unicode_normalization::UnicodeNormalization;

/// Normalizes a name string for indexing and lookup.
///
/// Applies Unicode NFC composition, trims, and collapses internal whitespace
/// runs to single spaces. Case is preserved; case-insensitive comparison is
/// the fuzzy scorer's concern.
pub fn normalize_text(s: &str) -> String {
    let composed: String = s.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}
