//! Double Metaphone encoding of locality names.
//!
//! Names are abbreviation-expanded and reduced to ASCII letters before
//! encoding, so "Mt Druitt" and "Mount Druitt" share codes.

use rphonetic::DoubleMetaphone;

use crate::abbreviations::expand_abbreviations;
use crate::tables::MatchTables;

/// Primary and secondary Double Metaphone codes. Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PhoneticCodes {
    /// Primary pronunciation code. Empty only for input with no letters.
    pub primary: String,
    /// Alternate pronunciation code, empty when it equals the primary.
    pub secondary: String,
}

impl PhoneticCodes {
    /// Whether a candidate with `other` codes sounds like a query with these
    /// codes.
    ///
    /// The query's primary code must be non-empty and equal the candidate's
    /// primary or secondary code, or the query's non-empty secondary code
    /// must equal the candidate's primary code.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        !self.primary.is_empty()
            && (self.primary == other.primary
                || self.primary == other.secondary
                || (!self.secondary.is_empty() && self.secondary == other.primary))
    }
}

/// Reusable Double Metaphone encoder.
pub struct PhoneticEncoder<'a> {
    encoder: DoubleMetaphone,
    tables: &'a MatchTables,
}

impl<'a> PhoneticEncoder<'a> {
    /// Creates an encoder that expands abbreviations from `tables`.
    #[must_use]
    pub fn new(tables: &'a MatchTables) -> Self {
        Self {
            encoder: DoubleMetaphone::default(),
            tables,
        }
    }

    /// Encodes `text`. Input without ASCII letters yields empty codes.
    #[must_use]
    pub fn encode(&self, text: &str) -> PhoneticCodes {
        let expanded = expand_abbreviations(text, self.tables);
        let cleaned: String = expanded
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        if cleaned.is_empty() {
            return PhoneticCodes::default();
        }

        let result = self.encoder.double_metaphone(&cleaned);
        let primary = result.primary().to_string();
        let alternate = result.alternate().to_string();

        let secondary = if alternate == primary {
            String::new()
        } else {
            alternate
        };

        PhoneticCodes { primary, secondary }
    }
}

/// Encodes `text` with a one-off encoder.
#[must_use]
pub fn encode(text: &str, tables: &MatchTables) -> PhoneticCodes {
    PhoneticEncoder::new(tables).encode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(text: &str) -> PhoneticCodes {
        encode(text, &MatchTables::default())
    }

    #[test]
    fn empty_input_has_empty_codes() {
        assert_eq!(codes(""), PhoneticCodes::default());
        assert_eq!(codes("  "), PhoneticCodes::default());
        assert_eq!(codes("1234 -"), PhoneticCodes::default());
    }

    #[test]
    fn deterministic() {
        assert_eq!(codes("Wollongong"), codes("Wollongong"));
    }

    #[test]
    fn misspelling_sounds_alike() {
        let query = codes("Sydny");
        let candidate = codes("Sydney");
        assert!(!query.primary.is_empty());
        assert!(query.matches(&candidate));
    }

    #[test]
    fn expands_abbreviations_before_encoding() {
        assert_eq!(codes("Mt Druitt"), codes("Mount Druitt"));
    }

    #[test]
    fn ignores_punctuation_and_case() {
        assert_eq!(codes("o'connor"), codes("OCONNOR"));
    }

    #[test]
    fn secondary_differs_from_primary() {
        for name in ["Sydney", "Wollongong", "Xavier", "Schofields", "Geelong"] {
            let c = codes(name);
            assert_ne!(c.primary, c.secondary, "{name}");
        }
    }

    #[test]
    fn match_rule() {
        let q = PhoneticCodes {
            primary: "STN".to_string(),
            secondary: "XTN".to_string(),
        };
        let by_primary = PhoneticCodes {
            primary: "STN".to_string(),
            secondary: String::new(),
        };
        let by_candidate_secondary = PhoneticCodes {
            primary: "ABC".to_string(),
            secondary: "STN".to_string(),
        };
        let by_query_secondary = PhoneticCodes {
            primary: "XTN".to_string(),
            secondary: String::new(),
        };
        let none = PhoneticCodes {
            primary: "KLN".to_string(),
            secondary: "XTN".to_string(),
        };

        assert!(q.matches(&by_primary));
        assert!(q.matches(&by_candidate_secondary));
        assert!(q.matches(&by_query_secondary));
        assert!(!q.matches(&none));
        assert!(!PhoneticCodes::default().matches(&PhoneticCodes::default()));
    }
}
