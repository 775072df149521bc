//! JSON Schema descriptions of each tool's parameters.

use serde_json::json;

/// Returns one `{name, description, parameters}` object per tool, in
/// [`crate::ToolName::all`] order.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn tool_definitions() -> Vec<serde_json::Value> {
    let state = json!({ "type": "string", "description": "State code (e.g., 'NSW', 'VIC') or full name" });

    vec![
        json!({
            "name": "search_postcode",
            "description": "Find all suburbs for a given postcode.",
            "parameters": {
                "type": "object",
                "properties": {
                    "postcode": { "type": "string", "description": "Four-digit Australian postcode (e.g., '2000')" }
                },
                "required": ["postcode"]
            }
        }),
        json!({
            "name": "search_suburb",
            "description": "Find postcodes for a suburb name. Exact match, ignoring case.",
            "parameters": {
                "type": "object",
                "properties": {
                    "suburb": { "type": "string", "description": "Suburb or locality name" },
                    "state": state
                },
                "required": ["suburb"]
            }
        }),
        json!({
            "name": "validate_combination",
            "description": "Check whether a suburb and postcode belong together.",
            "parameters": {
                "type": "object",
                "properties": {
                    "suburb": { "type": "string", "description": "Suburb or locality name" },
                    "postcode": { "type": "string", "description": "Four-digit postcode" },
                    "state": state
                },
                "required": ["suburb", "postcode"]
            }
        }),
        json!({
            "name": "smart_search",
            "description": "Search by postcode or suburb name. Accepts '2000', 'Sydney', or 'Sydney, NSW'.",
            "parameters": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Postcode, suburb, or 'suburb, state'" }
                },
                "required": ["query"]
            }
        }),
        json!({
            "name": "fuzzy_match_suburb",
            "description": "Find similar suburbs for a possibly misspelled name.",
            "parameters": {
                "type": "object",
                "properties": {
                    "misspelled": { "type": "string", "description": "Suburb name as typed" },
                    "state": state,
                    "threshold": { "type": "number", "description": "Similarity threshold between 0 and 1 (default 0.8)" }
                },
                "required": ["misspelled"]
            }
        }),
        json!({
            "name": "autocomplete",
            "description": "Suggest suburb names for a partial input of at least two characters.",
            "parameters": {
                "type": "object",
                "properties": {
                    "partial": { "type": "string", "description": "Start of, or fragment of, a suburb name" },
                    "state": state,
                    "limit": { "type": "integer", "description": "Maximum suggestions (default 10)" }
                },
                "required": ["partial"]
            }
        }),
        json!({
            "name": "check_spelling",
            "description": "Check a suburb's spelling and suggest corrections.",
            "parameters": {
                "type": "object",
                "properties": {
                    "suburb": { "type": "string", "description": "Suburb name to check" }
                },
                "required": ["suburb"]
            }
        }),
        json!({
            "name": "voice_search",
            "description": "Find suburbs that sound like a spoken name, for voice input.",
            "parameters": {
                "type": "object",
                "properties": {
                    "spokenName": { "type": "string", "description": "Suburb name as heard" }
                },
                "required": ["spokenName"]
            }
        }),
        json!({
            "name": "suburbs_in_lga",
            "description": "List all suburbs in a Local Government Area (city or council).",
            "parameters": {
                "type": "object",
                "properties": {
                    "lgaName": { "type": "string", "description": "LGA name or part of it (e.g., 'Newcastle')" },
                    "state": state
                },
                "required": ["lgaName"]
            }
        }),
        json!({
            "name": "get_suburb_lga",
            "description": "Find the Local Government Area a suburb belongs to.",
            "parameters": {
                "type": "object",
                "properties": {
                    "suburb": { "type": "string", "description": "Suburb or locality name" },
                    "state": state
                },
                "required": ["suburb"]
            }
        }),
        json!({
            "name": "suburbs_within_radius",
            "description": "Find suburbs within a radius of a postcode or suburb, nearest first.",
            "parameters": {
                "type": "object",
                "properties": {
                    "postcodeOrSuburb": { "type": "string", "description": "Center postcode or suburb name" },
                    "radiusKm": { "type": "number", "description": "Radius in kilometres, up to 500 (default 10)" },
                    "state": state
                },
                "required": ["postcodeOrSuburb"]
            }
        }),
        json!({
            "name": "find_neighbors",
            "description": "Find the suburbs nearest to a suburb.",
            "parameters": {
                "type": "object",
                "properties": {
                    "suburb": { "type": "string", "description": "Suburb or locality name" },
                    "state": state,
                    "maxNeighbors": { "type": "integer", "description": "Maximum neighbours, 1 to 50 (default 10)" }
                },
                "required": ["suburb"]
            }
        }),
        json!({
            "name": "state_stats",
            "description": "Postcode, suburb, and LGA counts for one state or all states.",
            "parameters": {
                "type": "object",
                "properties": {
                    "state": state
                },
                "required": []
            }
        }),
        json!({
            "name": "list_lgas",
            "description": "List Local Government Areas, optionally with suburb counts.",
            "parameters": {
                "type": "object",
                "properties": {
                    "state": state,
                    "includeSuburbsCount": { "type": "boolean", "description": "Include the number of suburbs in each LGA" }
                },
                "required": []
            }
        }),
        json!({
            "name": "search_region",
            "description": "Find suburbs in a named region (e.g., 'Hunter', 'Illawarra'). Falls back to statistical area names.",
            "parameters": {
                "type": "object",
                "properties": {
                    "region": { "type": "string", "description": "Region name or part of it" },
                    "state": state
                },
                "required": ["region"]
            }
        }),
        json!({
            "name": "check_health",
            "description": "Report whether the postcode data is loaded and queryable.",
            "parameters": {
                "type": "object",
                "properties": {},
                "required": []
            }
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolName;

    #[test]
    fn one_definition_per_tool_in_order() {
        let definitions = tool_definitions();
        let names: Vec<&str> = definitions
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        let expected: Vec<&str> = ToolName::all().iter().map(AsRef::as_ref).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn required_fields_are_declared_properties() {
        for definition in tool_definitions() {
            let properties = definition["parameters"]["properties"].as_object().unwrap();
            for required in definition["parameters"]["required"].as_array().unwrap() {
                assert!(
                    properties.contains_key(required.as_str().unwrap()),
                    "{} requires undeclared {required}",
                    definition["name"]
                );
            }
        }
    }
}
