//! Whole-token abbreviation expansion.

use crate::tables::MatchTables;

/// Replaces every whitespace-separated token that is a known abbreviation
/// with its expansion. Tokens are re-joined with single spaces.
///
/// Matching is case-insensitive and never applies inside a longer token, so
/// "Mt Druitt" becomes "Mount Druitt" while "Mtdruitt" is left alone.
#[must_use]
pub fn expand_abbreviations(text: &str, tables: &MatchTables) -> String {
    text.split_whitespace()
        .map(|token| tables.expansion(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_tokens() {
        let tables = MatchTables::default();
        assert_eq!(expand_abbreviations("Mt Druitt", &tables), "Mount Druitt");
        assert_eq!(expand_abbreviations("st kilda", &tables), "Saint kilda");
        assert_eq!(
            expand_abbreviations("Sth Hobart Hts", &tables),
            "South Hobart Heights"
        );
    }

    #[test]
    fn never_matches_inside_tokens() {
        let tables = MatchTables::default();
        assert_eq!(expand_abbreviations("Mtdruitt", &tables), "Mtdruitt");
        assert_eq!(expand_abbreviations("Westmead", &tables), "Westmead");
    }

    #[test]
    fn collapses_whitespace() {
        let tables = MatchTables::default();
        assert_eq!(expand_abbreviations("  W   Ryde ", &tables), "West Ryde");
        assert_eq!(expand_abbreviations("", &tables), "");
    }
}
