//! Exact postcode and locality lookups.

use std::collections::{BTreeMap, BTreeSet};

use postcodes_database::Gazetteer;
use postcodes_gazetteer_models::{NameRecord, State};
use postcodes_tools_models::{
    PostcodeSearchResult, SearchPostcodeParams, SearchSuburbParams, ServiceConfig,
    SmartSearchParams, SmartSearchResult, SuburbSearchResult, ValidateCombinationParams,
    ValidationResult,
};

use crate::{ToolError, is_postcode, parse_state, required};

/// Localities listed in a hint.
const HINT_LIMIT: usize = 3;

fn checked_postcode(raw: &str) -> Result<&str, ToolError> {
    let postcode = raw.trim();
    if is_postcode(postcode) {
        Ok(postcode)
    } else {
        Err(ToolError::InvalidPostcode(postcode.to_string()))
    }
}

/// Finds every locality with a postcode.
///
/// # Errors
///
/// * [`ToolError::InvalidPostcode`] if the postcode is not four digits
/// * [`ToolError::NotFound`] if no locality has it
pub fn search_postcode(
    db: &dyn Gazetteer,
    _config: &ServiceConfig,
    params: &SearchPostcodeParams,
) -> Result<PostcodeSearchResult, ToolError> {
    let postcode = checked_postcode(&params.postcode)?;
    let suburbs = db.lookup_postcode(postcode)?;

    if suburbs.is_empty() {
        return Err(ToolError::not_found(
            format!("No suburbs found for postcode {postcode}"),
            "Please check the postcode is correct",
        ));
    }

    let mut suburbs_by_state: BTreeMap<State, Vec<NameRecord>> = BTreeMap::new();
    for record in &suburbs {
        suburbs_by_state
            .entry(record.state)
            .or_default()
            .push(record.clone());
    }

    Ok(PostcodeSearchResult {
        postcode: postcode.to_string(),
        count: suburbs.len(),
        suburbs,
        suburbs_by_state,
    })
}

pub(crate) fn suburb_lookup(
    db: &dyn Gazetteer,
    suburb: &str,
    state: Option<State>,
) -> Result<SuburbSearchResult, ToolError> {
    let results = db.lookup_exact(suburb, state)?;

    if results.is_empty() {
        return Err(ToolError::not_found(
            format!("No exact match found for suburb '{suburb}'"),
            "Try fuzzy_match_suburb for suggestions",
        ));
    }

    let states_found: Vec<State> = results
        .iter()
        .map(|r| r.state)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let postcodes: Vec<String> = results
        .iter()
        .map(|r| r.postcode.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let multiple_states = states_found.len() > 1 && state.is_none();
    let suggestion = multiple_states.then(|| {
        format!("Suburb '{suburb}' exists in multiple states. Consider specifying the state.")
    });

    Ok(SuburbSearchResult {
        suburb: suburb.to_string(),
        count: results.len(),
        results,
        postcode: (postcodes.len() == 1).then(|| postcodes[0].clone()),
        postcodes,
        multiple_states,
        states_found,
        suggestion,
    })
}

/// Finds the postcodes of a locality, matched exactly ignoring case.
///
/// # Errors
///
/// * [`ToolError::InvalidState`] if the state filter is not recognized
/// * [`ToolError::NotFound`] if no locality has the name
pub fn search_suburb(
    db: &dyn Gazetteer,
    _config: &ServiceConfig,
    params: &SearchSuburbParams,
) -> Result<SuburbSearchResult, ToolError> {
    let suburb = required(&params.suburb, "suburb")?;
    let state = parse_state(params.state.as_deref())?;
    suburb_lookup(db, suburb, state)
}

/// Checks whether a locality and postcode belong together.
///
/// An invalid pair is not an error: the result says so and carries hints.
///
/// # Errors
///
/// * [`ToolError::InvalidPostcode`] if the postcode is not four digits
/// * [`ToolError::InvalidState`] if the state filter is not recognized
pub fn validate_combination(
    db: &dyn Gazetteer,
    _config: &ServiceConfig,
    params: &ValidateCombinationParams,
) -> Result<ValidationResult, ToolError> {
    let suburb = required(&params.suburb, "suburb")?;
    let postcode = checked_postcode(&params.postcode)?;
    let state = parse_state(params.state.as_deref())?;

    if db.validate_combination(suburb, postcode, state)? {
        let details = db
            .lookup_exact(suburb, state)?
            .into_iter()
            .find(|r| r.postcode == postcode);
        return Ok(ValidationResult {
            valid: true,
            confidence: 1.0,
            details,
            suggestions: Vec::new(),
        });
    }

    let mut suggestions = Vec::new();

    let by_postcode = db.lookup_postcode(postcode)?;
    if !by_postcode.is_empty() {
        let names: Vec<&str> = by_postcode
            .iter()
            .take(HINT_LIMIT)
            .map(|r| r.name.as_str())
            .collect();
        suggestions.push(format!(
            "Postcode {postcode} is valid for: {}",
            names.join(", ")
        ));
    }

    let by_name = db.lookup_exact(suburb, state)?;
    if !by_name.is_empty() {
        let postcodes: Vec<&str> = by_name
            .iter()
            .take(HINT_LIMIT)
            .map(|r| r.postcode.as_str())
            .collect();
        suggestions.push(format!(
            "Suburb '{suburb}' has postcode(s): {}",
            postcodes.join(", ")
        ));
    }

    if suggestions.is_empty() {
        suggestions.push("Please check both suburb and postcode".to_string());
    }

    Ok(ValidationResult {
        valid: false,
        confidence: 0.0,
        details: None,
        suggestions,
    })
}

/// Searches by postcode when the query is four digits, otherwise by
/// locality, accepting `"locality, state"` with a state code or name.
///
/// An unrecognized state after the comma is ignored.
///
/// # Errors
///
/// * [`ToolError::NotFound`] if nothing matches
pub fn smart_search(
    db: &dyn Gazetteer,
    config: &ServiceConfig,
    params: &SmartSearchParams,
) -> Result<SmartSearchResult, ToolError> {
    let query = required(&params.query, "query")?;

    if is_postcode(query) {
        let params = SearchPostcodeParams {
            postcode: query.to_string(),
        };
        return search_postcode(db, config, &params).map(SmartSearchResult::Postcode);
    }

    let mut parts = query.splitn(2, ',');
    let suburb = parts.next().unwrap_or_default().trim();
    let state = parts.next().and_then(State::parse);

    match suburb_lookup(db, suburb, state) {
        Ok(result) => Ok(SmartSearchResult::Suburb(result)),
        Err(ToolError::NotFound { message, .. }) => Err(ToolError::not_found(
            message,
            "No exact match found. Try fuzzy_match_suburb for suggestions.",
        )),
        Err(e) => Err(e),
    }
}
