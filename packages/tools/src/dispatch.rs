//! Tool dispatch over JSON.

use postcodes_database::Gazetteer;
use postcodes_tools_models::{ServiceConfig, ToolName};
use serde::{Serialize, de::DeserializeOwned};

use crate::{ToolError, analytics, location, lookup, suggest};

fn params<P: DeserializeOwned>(input: &serde_json::Value) -> Result<P, ToolError> {
    // A tool called with no arguments gets an empty object.
    let input = if input.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        input.clone()
    };
    Ok(serde_json::from_value(input)?)
}

fn call<P, R>(
    input: &serde_json::Value,
    tool: impl FnOnce(&P) -> Result<R, ToolError>,
) -> Result<serde_json::Value, ToolError>
where
    P: DeserializeOwned,
    R: Serialize,
{
    let params = params(input)?;
    let result = tool(&params)?;
    Ok(serde_json::to_value(result)?)
}

/// Runs the tool called `name` with JSON parameters and returns its JSON
/// result.
///
/// # Errors
///
/// * [`ToolError::UnknownTool`] if no tool has this name
/// * [`ToolError::Json`] if the parameters do not fit the tool
/// * Any error the tool itself returns
pub fn execute_tool(
    db: &dyn Gazetteer,
    config: &ServiceConfig,
    name: &str,
    input: &serde_json::Value,
) -> Result<serde_json::Value, ToolError> {
    let tool: ToolName = name
        .parse()
        .map_err(|_| ToolError::UnknownTool(name.to_string()))?;

    log::debug!("execute_tool: {tool} {input}");

    match tool {
        ToolName::SearchPostcode => call(input, |p| lookup::search_postcode(db, config, p)),
        ToolName::SearchSuburb => call(input, |p| lookup::search_suburb(db, config, p)),
        ToolName::ValidateCombination => {
            call(input, |p| lookup::validate_combination(db, config, p))
        }
        ToolName::SmartSearch => call(input, |p| lookup::smart_search(db, config, p)),
        ToolName::FuzzyMatchSuburb => {
            call(input, |p| suggest::fuzzy_match_suburb(db, config, p))
        }
        ToolName::Autocomplete => call(input, |p| suggest::autocomplete(db, config, p)),
        ToolName::CheckSpelling => call(input, |p| suggest::check_spelling(db, config, p)),
        ToolName::VoiceSearch => call(input, |p| suggest::voice_search(db, config, p)),
        ToolName::SuburbsInLga => call(input, |p| location::suburbs_in_lga(db, config, p)),
        ToolName::GetSuburbLga => call(input, |p| location::get_suburb_lga(db, config, p)),
        ToolName::SuburbsWithinRadius => {
            call(input, |p| location::suburbs_within_radius(db, config, p))
        }
        ToolName::FindNeighbors => call(input, |p| location::find_neighbors(db, config, p)),
        ToolName::StateStats => call(input, |p| analytics::state_stats(db, config, p)),
        ToolName::ListLgas => call(input, |p| analytics::list_lgas(db, config, p)),
        ToolName::SearchRegion => call(input, |p| analytics::search_region(db, config, p)),
        ToolName::CheckHealth => Ok(serde_json::to_value(analytics::check_health(
            db, config,
        ))?),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fixture;

    fn run(name: &str, input: &serde_json::Value) -> Result<serde_json::Value, ToolError> {
        execute_tool(&fixture::gazetteer(), &ServiceConfig::default(), name, input)
    }

    #[test]
    fn dispatches_by_name() {
        let result = run("search_postcode", &json!({"postcode": "2000"})).unwrap();
        assert_eq!(result["count"], 3);
        assert_eq!(result["suburbsByState"]["NSW"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn camel_case_parameters() {
        let result = run(
            "suburbs_within_radius",
            &json!({"postcodeOrSuburb": "2000", "radiusKm": 2.0}),
        )
        .unwrap();
        assert_eq!(result["suburbCount"], 3);
        assert_eq!(result["center"]["suburb"], "Haymarket");
    }

    #[test]
    fn null_input_means_no_parameters() {
        let result = run("state_stats", &serde_json::Value::Null).unwrap();
        assert_eq!(result["scope"], "national");
        assert_eq!(result["national"]["totalRecords"], 11);
    }

    #[test]
    fn health_ignores_input() {
        let result = run("check_health", &json!({"anything": true})).unwrap();
        assert_eq!(result["health"], "healthy");
    }

    #[test]
    fn unknown_tool() {
        let result = run("delete_everything", &json!({}));
        assert!(matches!(result, Err(ToolError::UnknownTool(name)) if name == "delete_everything"));
    }

    #[test]
    fn missing_required_parameter() {
        let result = run("search_postcode", &json!({}));
        assert!(matches!(result, Err(ToolError::Json(_))));
    }

    #[test]
    fn tool_errors_pass_through() {
        let result = run("search_postcode", &json!({"postcode": "abcd"}));
        assert!(matches!(result, Err(ToolError::InvalidPostcode(_))));
    }
}
