//! Slug derivation for URL-safe identifiers.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Turn a name or title into a slug.
///
/// Accented letters are decomposed (NFKD) and whatever is still non-ASCII
/// is dropped, so `é` becomes `e` and `狮` disappears. The rest is
/// lower-cased, anything other than letters, digits, `_`, `-` and whitespace
/// is removed, and runs of whitespace/hyphens become a single hyphen.
/// Leading and trailing `-`/`_` are stripped.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_ascii_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, "");
    let hyphenated = SEPARATORS.replace_all(&cleaned, "-");
    hyphenated.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(slugify("Lion"), "lion");
        assert_eq!(slugify("My favorite animals"), "my-favorite-animals");
    }

    #[test]
    fn test_punctuation_is_removed() {
        assert_eq!(
            slugify("Why do you like Lion by jdoe?"),
            "why-do-you-like-lion-by-jdoe"
        );
        assert_eq!(slugify("Save the  -- fastest   Cheetah!"), "save-the-fastest-cheetah");
    }

    #[test]
    fn test_edges_are_trimmed() {
        assert_eq!(slugify("  _Hello World_  "), "hello-world");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_underscores_survive_inside() {
        assert_eq!(slugify("snake_case name"), "snake_case-name");
    }

    #[test]
    fn test_accents_are_transliterated() {
        assert_eq!(slugify("Pokémon"), "pokemon");
        assert_eq!(slugify("Café Crème"), "cafe-creme");
        assert_eq!(slugify("ﬁre Salamander"), "fire-salamander");
    }

    #[test]
    fn test_non_latin_dropped() {
        assert_eq!(slugify("狮子"), "");
    }
}
