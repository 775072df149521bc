//! Order-insensitive string similarity.

/// Lowercases, trims, and sorts whitespace-delimited tokens.
fn token_sorted(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let mut tokens: Vec<&str> = lower.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity in `[0, 1]` between two names, ignoring case, surrounding
/// whitespace, and word order.
///
/// Identical normalized strings score `1.0`. The score is the normalized
/// Damerau-Levenshtein similarity of the token-sorted forms, so it is
/// symmetric.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_damerau_levenshtein(&token_sorted(a), &token_sorted(b))
}
