use placematch::text::normalize_text;

#[test]
fn test_normalize_collapses_whitespace() {
    assert_eq!(normalize_text("  Nova   Roma \t"), "Nova Roma");
    assert_eq!(normalize_text("Roma"), "Roma");
    assert_eq!(normalize_text("   "), "");
    assert_eq!(normalize_text(""), "");
}

#[test]
fn test_normalize_composes_unicode() {
    // "e" followed by a combining acute accent composes to a single scalar.
    let decomposed = "Ame\u{0301}lia";
    let composed = "Am\u{e9}lia";
    assert_eq!(normalize_text(decomposed), composed);
}

#[test]
fn test_normalize_preserves_case() {
    assert_eq!(normalize_text("ANKYRA"), "ANKYRA");
}
