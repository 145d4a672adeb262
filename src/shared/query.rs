/// Trimmed keyword, or `None` when nothing is left
pub fn keyword(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|k| !k.is_empty())
}

/// `%keyword%` pattern for ILIKE with LIKE wildcards escaped
pub fn contains_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_trims_and_drops_blank() {
        assert_eq!(keyword(Some("  pantai ")), Some("pantai"));
        assert_eq!(keyword(Some("   ")), None);
        assert_eq!(keyword(None), None);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("kopi"), "%kopi%");
        assert_eq!(contains_pattern("100%_asli"), r"%100\%\_asli%");
    }
}
