//! Compound-word variants of a query.
//!
//! Australian locality names are often written both joined and split
//! ("Newcastle" / "New Castle", "Mountview" / "Mount View"). A query is
//! expanded into its alternate spellings so either form can match.

use crate::tables::{MatchTables, SplitPolicy, SplitPrefix};

/// Single-word queries at or below this many characters are never split.
const MIN_SPLIT_LEN: usize = 6;

/// Returns the query followed by its joined and split spellings.
///
/// The first element is always the unmodified input and no value appears
/// twice.
///
/// * Multi-word input gains the form with all whitespace removed.
/// * Two-word input also gains the plain concatenation of both words.
/// * Single-word input longer than six characters gains a space after
///   [`SplitPrefix::split_len`] characters for each matching prefix from
///   [`MatchTables::split_prefixes`], limited by
///   [`MatchTables::split_policy`].
#[must_use]
pub fn compound_variants(text: &str, tables: &MatchTables) -> Vec<String> {
    let mut variants = vec![text.to_string()];

    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() > 1 {
        push_unique(
            &mut variants,
            text.chars().filter(|c| !c.is_whitespace()).collect(),
        );

        if let [first, second] = words.as_slice() {
            push_unique(&mut variants, format!("{first}{second}"));
        }
    }

    if !text.chars().any(char::is_whitespace) && text.chars().count() > MIN_SPLIT_LEN {
        let lower = text.to_lowercase();

        for SplitPrefix { prefix, split_len } in &tables.split_prefixes {
            if prefix.is_empty() || !lower.starts_with(&prefix.to_lowercase()) {
                continue;
            }

            if let Some(split) = split_after(text, *split_len) {
                push_unique(&mut variants, split);
                if tables.split_policy == SplitPolicy::FirstMatch {
                    break;
                }
            }
        }
    }

    log::trace!("compound_variants: {text:?} -> {variants:?}");

    variants
}

/// Inserts a single space after the first `chars` characters.
fn split_after(text: &str, chars: usize) -> Option<String> {
    let (index, _) = text.char_indices().nth(chars)?;
    let (head, tail) = text.split_at(index);
    Some(format!("{head} {tail}"))
}

fn push_unique(variants: &mut Vec<String>, value: String) {
    if !variants.contains(&value) {
        variants.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants(text: &str) -> Vec<String> {
        compound_variants(text, &MatchTables::default())
    }

    #[test]
    fn joins_two_words() {
        assert_eq!(variants("New Castle"), vec!["New Castle", "NewCastle"]);
    }

    #[test]
    fn joins_many_words() {
        assert_eq!(
            variants("Port Macquarie West"),
            vec!["Port Macquarie West", "PortMacquarieWest"]
        );
    }

    #[test]
    fn splits_after_table_length() {
        assert_eq!(variants("Newcastle"), vec!["Newcastle", "Newc astle"]);
        assert_eq!(variants("mountview"), vec!["mountview", "mount view"]);
        assert_eq!(variants("Northwood"), vec!["Northwood", "North wood"]);
        assert_eq!(variants("EASTWOOD"), vec!["EASTWOOD", "EAST WOOD"]);
    }

    fn port_tables(split_policy: SplitPolicy) -> MatchTables {
        MatchTables {
            split_prefixes: vec![SplitPrefix::new("Port", 4), SplitPrefix::new("Portar", 6)],
            split_policy,
            ..MatchTables::default()
        }
    }

    #[test]
    fn first_match_stops_at_first_prefix() {
        assert_eq!(
            compound_variants("Portarlington", &port_tables(SplitPolicy::FirstMatch)),
            vec!["Portarlington", "Port arlington"]
        );
    }

    #[test]
    fn all_policy_emits_every_split() {
        let tables = port_tables(SplitPolicy::All);
        assert_eq!(
            compound_variants("Portarlington", &tables),
            vec!["Portarlington", "Port arlington", "Portar lington"]
        );
    }

    #[test]
    fn short_words_are_not_split() {
        assert_eq!(variants("Newtow"), vec!["Newtow"]);
        assert_eq!(variants("Sydney"), vec!["Sydney"]);
    }

    #[test]
    fn unmatched_long_word_has_single_variant() {
        assert_eq!(variants("Parramatta"), vec!["Parramatta"]);
    }

    #[test]
    fn empty_input_is_returned() {
        assert_eq!(variants(""), vec![""]);
    }
}
