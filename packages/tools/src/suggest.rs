//! Fuzzy, spelling, phonetic, and autocomplete suggestions.

use std::collections::BTreeSet;

use postcodes_database::Gazetteer;
use postcodes_gazetteer_models::{MatchCandidate, MatchKind, NameRecord, State};
use postcodes_matching::{
    MatchOptions, MatchStrategy, compound_variants, ranker::COMPOUND_VARIANT_CONFIDENCE, rank,
};
use postcodes_tools_models::{
    AutocompleteParams, AutocompleteResult, CheckSpellingParams, Completion, CompletionKind,
    FuzzyMatchParams, FuzzyMatchResult, ServiceConfig, SpellingResult, SuburbSuggestion,
    VoiceSearchParams, VoiceSearchResult,
};

use crate::policy::suggest;
use crate::{ToolError, parse_state, required};

const DEFAULT_COMPLETIONS: usize = 10;
const MIN_PARTIAL_CHARS: usize = 2;
const MAX_CORRECTIONS: usize = 5;

/// Factor applied to the phonetic threshold when retrying with variants.
const VARIANT_PHONETIC_FACTOR: f64 = 0.9;

fn postcodes_and_states(records: &[NameRecord]) -> (Vec<String>, Vec<State>) {
    let postcodes: BTreeSet<&str> = records.iter().map(|r| r.postcode.as_str()).collect();
    let states: BTreeSet<State> = records.iter().map(|r| r.state).collect();
    (
        postcodes.into_iter().map(ToString::to_string).collect(),
        states.into_iter().collect(),
    )
}

/// Attaches postcodes and states to each candidate, dropping any the
/// directory no longer knows.
fn describe(
    db: &dyn Gazetteer,
    candidates: Vec<MatchCandidate>,
    state: Option<State>,
) -> Result<Vec<SuburbSuggestion>, ToolError> {
    let mut suggestions = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let records = db.lookup_exact(&candidate.matched_name, state)?;
        if records.is_empty() {
            continue;
        }
        let (postcodes, states) = postcodes_and_states(&records);
        suggestions.push(SuburbSuggestion {
            suburb: candidate.matched_name,
            confidence: candidate.confidence,
            match_kind: candidate.match_kind,
            postcodes,
            states,
        });
    }
    Ok(suggestions)
}

/// Suggests localities for a possibly misspelled name.
///
/// An exact match short-circuits. Otherwise ranks every name (in the state,
/// if given) through the [`crate::SuggestionPolicy`] fallback.
///
/// # Errors
///
/// * [`ToolError::InvalidState`] if the state filter is not recognized
/// * [`ToolError::NotFound`] if nothing is similar enough
pub fn fuzzy_match_suburb(
    db: &dyn Gazetteer,
    config: &ServiceConfig,
    params: &FuzzyMatchParams,
) -> Result<FuzzyMatchResult, ToolError> {
    let query = required(&params.misspelled, "misspelled")?;
    let state = parse_state(params.state.as_deref())?;
    let threshold = params.threshold.unwrap_or(config.fuzzy_threshold);

    let exact = db.lookup_exact(query, state)?;
    if !exact.is_empty() {
        let (postcodes, states) = postcodes_and_states(&exact);
        return Ok(FuzzyMatchResult {
            query: query.to_string(),
            exact_match: true,
            confidence: 1.0,
            suggestions: vec![SuburbSuggestion {
                suburb: exact[0].name.clone(),
                confidence: 1.0,
                match_kind: MatchKind::Exact,
                postcodes,
                states,
            }],
            exact_results: exact,
            suggestion: None,
        });
    }

    let names = db.all_names(state)?;
    let suggestions = describe(db, suggest(query, &names, config, threshold), state)?;

    let Some(best) = suggestions.first() else {
        return Err(ToolError::not_found(
            format!("No similar suburbs found for '{query}'"),
            "Please check the spelling or try a different search",
        ));
    };

    Ok(FuzzyMatchResult {
        query: query.to_string(),
        exact_match: false,
        confidence: best.confidence,
        suggestion: Some(format!("Did you mean '{}'?", best.suburb)),
        exact_results: Vec::new(),
        suggestions,
    })
}

/// Completes a partial name: prefix matches first, then names containing
/// the fragment.
///
/// # Errors
///
/// * [`ToolError::InvalidInput`] if fewer than two characters are given
/// * [`ToolError::InvalidState`] if the state filter is not recognized
pub fn autocomplete(
    db: &dyn Gazetteer,
    config: &ServiceConfig,
    params: &AutocompleteParams,
) -> Result<AutocompleteResult, ToolError> {
    let partial = params.partial.trim();
    if partial.chars().count() < MIN_PARTIAL_CHARS {
        return Err(ToolError::InvalidInput(format!(
            "Please enter at least {MIN_PARTIAL_CHARS} characters"
        )));
    }
    let state = parse_state(params.state.as_deref())?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_COMPLETIONS)
        .clamp(1, config.max_results.max(1));

    let prefixed = db.search_prefix(partial, state, limit)?;
    let containing = db.search_substring(partial, state, limit * 2)?;

    let mut seen = BTreeSet::new();
    let mut suggestions = Vec::new();

    let ordered = prefixed
        .into_iter()
        .map(|name| (name, CompletionKind::Prefix))
        .chain(
            containing
                .into_iter()
                .map(|name| (name, CompletionKind::Substring)),
        );

    for (name, match_kind) in ordered {
        if suggestions.len() >= limit {
            break;
        }
        if !seen.insert(name.clone()) {
            continue;
        }
        let records = db.lookup_exact(&name, state)?;
        let (postcodes, states) = postcodes_and_states(&records);
        suggestions.push(Completion {
            suburb: name,
            match_kind,
            states,
            postcodes,
        });
    }

    Ok(AutocompleteResult {
        query: partial.to_string(),
        count: suggestions.len(),
        suggestions,
    })
}

/// Reports whether a name is spelled like a known locality, suggesting up
/// to five corrections otherwise.
///
/// # Errors
///
/// * [`ToolError::NotFound`] if no correction is similar enough
pub fn check_spelling(
    db: &dyn Gazetteer,
    config: &ServiceConfig,
    params: &CheckSpellingParams,
) -> Result<SpellingResult, ToolError> {
    let query = required(&params.suburb, "suburb")?;

    if !db.lookup_exact(query, None)?.is_empty() {
        return Ok(SpellingResult {
            query: query.to_string(),
            spelling_correct: true,
            confidence: 1.0,
            suggested_spelling: None,
            corrections: Vec::new(),
        });
    }

    let options = MatchOptions {
        strategy: MatchStrategy::FuzzyOnly,
        fuzzy_threshold: config.spelling_threshold,
        phonetic_threshold: config.phonetic_threshold,
        max_results: MAX_CORRECTIONS,
    };
    let names = db.all_names(None)?;
    let corrections = describe(db, rank(query, &names, &options, &config.tables), None)?;

    let Some(best) = corrections.first() else {
        return Err(ToolError::not_found(
            format!("No similar suburbs found for '{query}'"),
            "Please check the spelling",
        ));
    };

    Ok(SpellingResult {
        query: query.to_string(),
        spelling_correct: false,
        confidence: best.confidence,
        suggested_spelling: Some(best.suburb.clone()),
        corrections,
    })
}

/// Finds localities that sound like a spoken name.
///
/// Tries an exact match, then each compound-word variant as an exact
/// match, then phonetic ranking of the input, then phonetic ranking of each
/// variant at a slightly lower threshold.
///
/// # Errors
///
/// * [`ToolError::NotFound`] if nothing sounds similar
pub fn voice_search(
    db: &dyn Gazetteer,
    config: &ServiceConfig,
    params: &VoiceSearchParams,
) -> Result<VoiceSearchResult, ToolError> {
    let spoken = required(&params.spoken_name, "spokenName")?;

    let exact = db.lookup_exact(spoken, None)?;
    if !exact.is_empty() {
        return Ok(VoiceSearchResult {
            spoken_input: spoken.to_string(),
            exact_match: true,
            confidence: 1.0,
            match_kind: MatchKind::Exact,
            matched_variant: None,
            results: exact,
            phonetic_matches: Vec::new(),
        });
    }

    let variants = compound_variants(spoken, &config.tables);
    for variant in variants.iter().skip(1) {
        let results = db.lookup_exact(variant, None)?;
        if !results.is_empty() {
            log::debug!("voice_search: {spoken:?} matched variant {variant:?}");
            return Ok(VoiceSearchResult {
                spoken_input: spoken.to_string(),
                exact_match: true,
                confidence: COMPOUND_VARIANT_CONFIDENCE,
                match_kind: MatchKind::CompoundVariant,
                matched_variant: Some(variant.clone()),
                results,
                phonetic_matches: Vec::new(),
            });
        }
    }

    let names = db.all_names(None)?;
    let options = config
        .match_options()
        .with_strategy(MatchStrategy::PhoneticOnly);

    let mut candidates = rank(spoken, &names, &options, &config.tables);
    if candidates.is_empty() {
        let relaxed = options.with_phonetic_threshold(config.phonetic_threshold * VARIANT_PHONETIC_FACTOR);
        candidates = variants
            .iter()
            .skip(1)
            .map(|variant| rank(variant, &names, &relaxed, &config.tables))
            .find(|found| !found.is_empty())
            .unwrap_or_default();
    }

    let phonetic_matches = describe(db, candidates, None)?;
    let Some(best) = phonetic_matches.first() else {
        return Err(ToolError::not_found(
            format!("No phonetic matches found for '{spoken}'"),
            "Please try spelling the suburb name differently",
        ));
    };

    Ok(VoiceSearchResult {
        spoken_input: spoken.to_string(),
        exact_match: false,
        confidence: best.confidence,
        match_kind: best.match_kind,
        matched_variant: None,
        results: Vec::new(),
        phonetic_matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    fn config() -> ServiceConfig {
        ServiceConfig::default()
    }

    fn fuzzy(misspelled: &str) -> Result<FuzzyMatchResult, ToolError> {
        fuzzy_match_suburb(
            &fixture::gazetteer(),
            &config(),
            &FuzzyMatchParams {
                misspelled: misspelled.to_string(),
                state: None,
                threshold: None,
            },
        )
    }

    #[test]
    fn fuzzy_exact_short_circuits() {
        let result = fuzzy("melbourne").unwrap();
        assert!(result.exact_match);
        assert_eq!(result.exact_results.len(), 2);
        assert_eq!(result.suggestions[0].postcodes, vec!["3000", "3004"]);
    }

    #[test]
    fn fuzzy_suggests_close_names() {
        let result = fuzzy("Sydny").unwrap();
        assert!(!result.exact_match);
        let best = &result.suggestions[0];
        assert_eq!(best.suburb, "Sydney");
        assert_eq!(best.postcodes, vec!["2000"]);
        assert_eq!(best.states, vec![State::Nsw]);
        assert_eq!(result.suggestion.as_deref(), Some("Did you mean 'Sydney'?"));
        assert!(result.confidence < 1.0);
    }

    #[test]
    fn fuzzy_not_found() {
        assert!(matches!(fuzzy("Qwxyzzz"), Err(ToolError::NotFound { .. })));
    }

    fn complete(partial: &str) -> Result<AutocompleteResult, ToolError> {
        autocomplete(
            &fixture::gazetteer(),
            &config(),
            &AutocompleteParams {
                partial: partial.to_string(),
                state: None,
                limit: None,
            },
        )
    }

    #[test]
    fn autocomplete_prefers_prefixes() {
        let result = complete("new").unwrap();
        let names: Vec<&str> = result.suggestions.iter().map(|s| s.suburb.as_str()).collect();
        assert_eq!(names, vec!["Newcastle", "Newtown"]);
        assert!(
            result
                .suggestions
                .iter()
                .all(|s| s.match_kind == CompletionKind::Prefix)
        );
        assert_eq!(result.suggestions[1].states, vec![State::Nsw, State::Vic]);
    }

    #[test]
    fn autocomplete_falls_back_to_substrings() {
        let result = complete("ney").unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.suggestions[0].suburb, "Sydney");
        assert_eq!(result.suggestions[0].match_kind, CompletionKind::Substring);
    }

    #[test]
    fn autocomplete_needs_two_characters() {
        assert!(matches!(complete(" s "), Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn autocomplete_respects_limit() {
        let result = autocomplete(
            &fixture::gazetteer(),
            &config(),
            &AutocompleteParams {
                partial: "ne".to_string(),
                state: None,
                limit: Some(1),
            },
        )
        .unwrap();
        assert_eq!(result.count, 1);
    }

    fn spell(suburb: &str) -> Result<SpellingResult, ToolError> {
        check_spelling(
            &fixture::gazetteer(),
            &config(),
            &CheckSpellingParams {
                suburb: suburb.to_string(),
            },
        )
    }

    #[test]
    fn correct_spelling() {
        let result = spell("Parramatta").unwrap();
        assert!(result.spelling_correct);
        assert!(result.corrections.is_empty());
    }

    #[test]
    fn spelling_corrections() {
        let result = spell("Melbourn").unwrap();
        assert!(!result.spelling_correct);
        assert_eq!(result.suggested_spelling.as_deref(), Some("Melbourne"));
        assert_eq!(result.corrections[0].match_kind, MatchKind::Fuzzy);
        assert_eq!(result.corrections[0].postcodes, vec!["3000", "3004"]);
    }

    fn voice(spoken: &str) -> Result<VoiceSearchResult, ToolError> {
        voice_search(
            &fixture::gazetteer(),
            &config(),
            &VoiceSearchParams {
                spoken_name: spoken.to_string(),
            },
        )
    }

    #[test]
    fn voice_exact() {
        let result = voice("hobart").unwrap();
        assert!(result.exact_match);
        assert_eq!(result.match_kind, MatchKind::Exact);
    }

    #[test]
    fn voice_compound_variant() {
        let result = voice("New Castle").unwrap();
        assert!(result.exact_match);
        assert_eq!(result.match_kind, MatchKind::CompoundVariant);
        assert!((result.confidence - 0.95).abs() < f64::EPSILON);
        assert_eq!(result.results[0].name, "Newcastle");
    }

    #[test]
    fn voice_phonetic() {
        let result = voice("Sydnee").unwrap();
        assert!(!result.exact_match);
        assert_eq!(result.match_kind, MatchKind::Phonetic);
        assert_eq!(result.phonetic_matches[0].suburb, "Sydney");
    }
}
