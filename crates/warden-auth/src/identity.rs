//! Identity normalization.

/// Canonical form of a login name: surrounding whitespace removed and
/// lowercased, so `" Alice "` and `"alice"` name the same account.
///
/// Markup escaping is not done here; the stored identity is the raw
/// normalized string and escaping belongs to whatever renders it.
pub fn normalize_identity(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_identity("  Alice\t\n"), "alice");
        assert_eq!(normalize_identity("BOB"), "bob");
    }

    #[test]
    fn keeps_inner_characters() {
        assert_eq!(normalize_identity("<b>Eve</b>"), "<b>eve</b>");
        assert_eq!(normalize_identity("jean luc"), "jean luc");
    }

    #[test]
    fn lowercases_non_ascii() {
        assert_eq!(normalize_identity("ÉLODIE"), "élodie");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert!(normalize_identity("   ").is_empty());
    }
}
