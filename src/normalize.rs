use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static RE_NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9:.]+").unwrap_or_else(|e| panic!("invalid regex: {e}"))
});

/// Lowercase, strip diacritics, collapse everything except `a-z0-9:.` into
/// single spaces. Colons and dots survive so times ("9:30") and decimals
/// ("5.5km") keep their shape.
pub fn normalize_text(input: &str) -> String {
    let lower = input.trim().to_lowercase();

    let no_diacritics: String = lower.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    RE_NON_ALNUM
        .replace_all(&no_diacritics, " ")
        .split_whitespace()
        .map(|t| t.trim_matches(|c| c == '.' || c == ':'))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when `phrase` appears in `normalized` on word boundaries.
pub fn has_phrase(normalized: &str, phrase: &str) -> bool {
    let hay = format!(" {normalized} ");
    let needle = format!(" {} ", phrase.trim());
    hay.contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_punctuation() {
        assert_eq!(normalize_text("  Café,  Well-Lit!  "), "cafe well lit");
        assert_eq!(normalize_text("Run 5.5km at 9:30PM"), "run 5.5km at 9:30pm");
    }

    #[test]
    fn phrase_matching_respects_word_boundaries() {
        let n = normalize_text("a safe and well lit loop");
        assert!(has_phrase(&n, "safe"));
        assert!(has_phrase(&n, "well lit"));
        assert!(!has_phrase(&n, "lit loops"));
        assert!(!has_phrase(&normalize_text("unsafe"), "safe"));
    }
}
