#![deny(missing_docs)]

//! # Schema Merging
//!
//! Folds an endpoint's fetched swagger fragments, strictly in fetch order,
//! into one coherent document: base-path canonicalization, first-fragment
//! seeding, per-path operation merging with first-seen `operationId`
//! deduplication, parameter canonicalization, response-description
//! defaulting, last-write-wins definitions, and the final nullable rewrite.

use crate::error::{AppError, AppResult};
use crate::normalization::rewrite_nullable_keys;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Accumulates fetched fragments for one endpoint into a single document.
///
/// One merger instance is one merge run: the seen-`operationId` set lives
/// here and is discarded with the merger, so repeated runs never leak state
/// across endpoints.
pub struct SchemaMerger {
    endpoint: String,
    top_level: Map<String, Value>,
    paths: Map<String, Value>,
    definitions: Map<String, Value>,
    seen_operation_ids: HashSet<String>,
    seeded: bool,
}

impl SchemaMerger {
    /// Creates an empty merger for `endpoint`.
    pub fn new(endpoint: &str) -> Self {
        SchemaMerger {
            endpoint: endpoint.to_string(),
            top_level: Map::new(),
            paths: Map::new(),
            definitions: Map::new(),
            seen_operation_ids: HashSet::new(),
            seeded: false,
        }
    }

    /// Folds one fetched fragment into the accumulator.
    ///
    /// Fragments must be folded strictly in fetch order: the first fragment
    /// seeds the document, and the first operation seen under an
    /// `operationId` wins deduplication. `route` and `url` are carried for
    /// error context.
    pub fn fold(&mut self, route: &str, url: &str, fragment: Value) -> AppResult<()> {
        let mut fragment = match fragment {
            Value::Object(map) => map,
            _ => return Err(schema_format(route, url, "fragment is not a JSON object")),
        };

        let base_path = fragment
            .get("basePath")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| schema_format(route, url, "missing basePath"))?;
        let (canonical_base, path_prefix) = split_base_path(&base_path);

        let version = fragment
            .get("info")
            .and_then(|info| info.get("version"))
            .cloned()
            .ok_or_else(|| schema_format(route, url, "missing info.version"))?;

        let paths = match fragment.remove("paths") {
            Some(Value::Object(paths)) => paths,
            _ => return Err(schema_format(route, url, "missing paths")),
        };
        // An absent definitions table is treated as empty.
        let definitions = match fragment.remove("definitions") {
            Some(Value::Object(definitions)) => definitions,
            _ => Map::new(),
        };

        if !self.seeded {
            self.seed(fragment, canonical_base, version);
        }

        for (declared_path, path_config) in paths {
            let operations = match path_config {
                Value::Object(operations) => operations,
                _ => {
                    return Err(schema_format(
                        route,
                        url,
                        &format!("path '{}' is not an object", declared_path),
                    ))
                }
            };

            let mut admitted = Map::new();
            for (method, operation) in operations {
                if let Some(operation) = self.admit_operation(operation) {
                    admitted.insert(method, operation);
                }
            }

            // Replaces any prior entry at this exact path key.
            let final_path = format!("/{}{}", path_prefix, declared_path);
            self.paths.insert(final_path, Value::Object(admitted));
        }

        // Definitions are last-write-wins, unlike operations.
        for (name, definition) in definitions {
            self.definitions.insert(name, definition);
        }

        Ok(())
    }

    /// Finishes the run: assembles the document and applies the nullable
    /// rewrite. With no fragments folded, yields a document with empty
    /// `paths` and `definitions`.
    pub fn finish(self) -> Value {
        let mut document = self.top_level;
        document.insert("paths".to_string(), Value::Object(self.paths));
        document.insert("definitions".to_string(), Value::Object(self.definitions));

        let mut value = Value::Object(document);
        rewrite_nullable_keys(&mut value);
        value
    }

    /// Seeds the document from the first fragment: all its top-level fields,
    /// with `basePath` canonicalized and `info` rebuilt for the endpoint.
    /// `paths` and `definitions` start empty and are rebuilt incrementally.
    fn seed(&mut self, fragment: Map<String, Value>, canonical_base: String, version: Value) {
        self.top_level = fragment;
        self.top_level
            .insert("basePath".to_string(), Value::String(canonical_base));
        self.top_level.insert(
            "info".to_string(),
            json!({
                "title": self.endpoint,
                "description": format!("{} API", self.endpoint),
                "version": version,
            }),
        );
        self.seeded = true;
    }

    /// Canonicalizes one operation, or drops it when its `operationId` was
    /// already admitted earlier in this run. Operations without an
    /// `operationId` carry no deduplication key and are always admitted.
    fn admit_operation(&mut self, mut operation: Value) -> Option<Value> {
        if let Some(id) = operation.get("operationId").and_then(Value::as_str) {
            if !self.seen_operation_ids.insert(id.to_string()) {
                // A reissue of a route already captured from an
                // earlier-processed fragment.
                return None;
            }
        }

        if let Some(Value::Array(parameters)) = operation.get_mut("parameters") {
            sort_parameters(parameters);
            for parameter in parameters.iter_mut() {
                normalize_format_parameter(parameter);
            }
        }

        if let Some(Value::Object(responses)) = operation.get_mut("responses") {
            for response in responses.values_mut() {
                if let Value::Object(fields) = response {
                    ensure_description(fields);
                }
            }
        }

        Some(operation)
    }
}

/// Folds `fragments` (route name, URL, parsed document) strictly in order
/// into one merged document for `endpoint`.
pub fn merge_fragments(
    endpoint: &str,
    fragments: Vec<(String, String, Value)>,
) -> AppResult<Value> {
    let mut merger = SchemaMerger::new(endpoint);
    for (route, url, fragment) in fragments {
        merger.fold(&route, &url, fragment)?;
    }
    Ok(merger.finish())
}

/// Splits a fragment `basePath` into the canonical two-segment API root and
/// the fragment-specific path prefix (remaining segments rejoined).
fn split_base_path(base_path: &str) -> (String, String) {
    let mut segments = base_path.split('/').filter(|s| !s.is_empty());
    let first = segments.next().unwrap_or_default();
    let second = segments.next().unwrap_or_default();
    let prefix = segments.collect::<Vec<_>>().join("/");
    (format!("/{}/{}", first, second), prefix)
}

/// Stable priority-key sort over an operation's parameter list:
/// `format`-named parameters last; among the rest, parameters carrying a
/// truthy `default` after those without; among the remainder, `required`
/// parameters first. Original order is the final tie-break.
fn sort_parameters(parameters: &mut [Value]) {
    parameters.sort_by_key(|parameter| {
        let is_format = parameter.get("name").and_then(Value::as_str) == Some("format");
        let has_default = parameter.get("default").is_some_and(is_truthy);
        let required = parameter
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        (is_format, has_default, !required)
    });
}

/// Forces the canonical `default` / `enum` values onto a parameter literally
/// named `format`, overwriting any upstream values.
fn normalize_format_parameter(parameter: &mut Value) {
    if parameter.get("name").and_then(Value::as_str) != Some("format") {
        return;
    }
    if let Some(fields) = parameter.as_object_mut() {
        fields.insert("default".to_string(), Value::String("JSON".to_string()));
        fields.insert("enum".to_string(), json!(["JSON", "XML"]));
    }
}

/// Defaults an absent or null response `description` to the empty string.
fn ensure_description(response: &mut Map<String, Value>) {
    match response.get("description") {
        None | Some(Value::Null) => {
            response.insert("description".to_string(), Value::String(String::new()));
        }
        Some(_) => {}
    }
}

/// A `default` counts as truthy unless it is `null`, `false`, zero, an
/// empty string, `"0"`, or an empty array.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn schema_format(route: &str, url: &str, message: &str) -> AppError {
    AppError::SchemaFormat {
        route: route.to_string(),
        message: format!("{} ({})", message, url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragment(base_path: &str, paths: Value, definitions: Value) -> Value {
        json!({
            "swagger": "2.0",
            "host": "api.example.invalid",
            "basePath": base_path,
            "info": { "title": "upstream title", "version": "1.0" },
            "paths": paths,
            "definitions": definitions,
        })
    }

    fn merge_one(fragment: Value) -> Value {
        merge_fragments(
            "Scores",
            vec![(
                "players".to_string(),
                "https://example.invalid/players.json".to_string(),
                fragment,
            )],
        )
        .unwrap()
    }

    #[test]
    fn test_base_path_is_first_two_segments_of_first_fragment() {
        let first = fragment("/v3/nba/scores/json", json!({}), json!({}));
        let second = fragment("/v2/mlb/stats/json", json!({}), json!({}));
        let merged = merge_fragments(
            "Scores",
            vec![
                ("a".into(), "u1".into(), first),
                ("b".into(), "u2".into(), second),
            ],
        )
        .unwrap();

        assert_eq!(merged["basePath"], json!("/v3/nba"));
    }

    #[test]
    fn test_seed_rebuilds_info_and_keeps_other_top_level_fields() {
        let merged = merge_one(fragment("/v3/nba/scores/json", json!({}), json!({})));

        assert_eq!(merged["swagger"], json!("2.0"));
        assert_eq!(merged["host"], json!("api.example.invalid"));
        assert_eq!(
            merged["info"],
            json!({ "title": "Scores", "description": "Scores API", "version": "1.0" })
        );
    }

    #[test]
    fn test_paths_are_prefixed_with_fragment_prefix() {
        let merged = merge_one(fragment(
            "/v3/nba/scores/json",
            json!({ "/Games/{season}": { "get": { "operationId": "GetGames" } } }),
            json!({}),
        ));

        assert!(merged["paths"].get("/scores/json/Games/{season}").is_some());
        assert!(merged["paths"].get("/Games/{season}").is_none());
    }

    #[test]
    fn test_duplicate_operation_ids_first_fragment_wins() {
        let first = fragment(
            "/v3/nba/scores/json",
            json!({ "/Teams": { "get": { "operationId": "GetTeams", "summary": "from first" } } }),
            json!({}),
        );
        let second = fragment(
            "/v3/nba/stats/json",
            json!({ "/Teams": { "get": { "operationId": "GetTeams", "summary": "from second" } } }),
            json!({}),
        );

        let merged = merge_fragments(
            "Scores",
            vec![
                ("scores".into(), "u1".into(), first),
                ("stats".into(), "u2".into(), second),
            ],
        )
        .unwrap();

        assert_eq!(
            merged["paths"]["/scores/json/Teams"]["get"]["summary"],
            json!("from first")
        );
        // The duplicate's path entry is written, but empty.
        assert_eq!(merged["paths"]["/stats/json/Teams"], json!({}));

        let serialized = serde_json::to_string(&merged).unwrap();
        assert_eq!(serialized.matches("GetTeams").count(), 1);
    }

    #[test]
    fn test_operations_without_id_are_always_admitted() {
        let merged = merge_one(fragment(
            "/v3/nba/scores/json",
            json!({
                "/A": { "get": { "summary": "one" } },
                "/B": { "get": { "summary": "two" } }
            }),
            json!({}),
        ));

        assert_eq!(merged["paths"]["/scores/json/A"]["get"]["summary"], json!("one"));
        assert_eq!(merged["paths"]["/scores/json/B"]["get"]["summary"], json!("two"));
    }

    #[test]
    fn test_parameter_sort_order() {
        let merged = merge_one(fragment(
            "/v3/nba/scores/json",
            json!({ "/Games": { "get": {
                "operationId": "GetGames",
                "parameters": [
                    { "name": "format", "required": true },
                    { "name": "page", "default": 1 },
                    { "name": "season", "required": true },
                    { "name": "team" },
                    { "name": "date", "required": true }
                ]
            } } }),
            json!({}),
        ));

        let names: Vec<&str> = merged["paths"]["/scores/json/Games"]["get"]["parameters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();

        // Required first (original relative order kept), then optional, then
        // truthy-default carriers, format always last.
        assert_eq!(names, vec!["season", "date", "team", "page", "format"]);
    }

    #[test]
    fn test_parameter_sort_is_idempotent() {
        let params = json!([
            { "name": "season", "required": true },
            { "name": "team" },
            { "name": "page", "default": 1 },
            { "name": "format" }
        ]);

        let mut once = params.as_array().unwrap().clone();
        sort_parameters(&mut once);
        let mut twice = once.clone();
        sort_parameters(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_falsy_defaults_do_not_sort_late() {
        let mut params = vec![
            json!({ "name": "flag", "default": false }),
            json!({ "name": "empty", "default": "" }),
            json!({ "name": "zero", "default": 0 }),
            json!({ "name": "real", "default": "2024REG" }),
        ];
        sort_parameters(&mut params);

        let names: Vec<&str> = params.iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["flag", "empty", "zero", "real"]);
    }

    #[test]
    fn test_format_parameter_values_are_forced() {
        let merged = merge_one(fragment(
            "/v3/nba/scores/json",
            json!({ "/Games": { "get": {
                "operationId": "GetGames",
                "parameters": [
                    { "name": "format", "default": "xml", "enum": ["xml"] }
                ]
            } } }),
            json!({}),
        ));

        let format = &merged["paths"]["/scores/json/Games"]["get"]["parameters"][0];
        assert_eq!(format["default"], json!("JSON"));
        assert_eq!(format["enum"], json!(["JSON", "XML"]));
    }

    #[test]
    fn test_response_descriptions_are_defaulted() {
        let merged = merge_one(fragment(
            "/v3/nba/scores/json",
            json!({ "/Games": { "get": {
                "operationId": "GetGames",
                "responses": {
                    "200": { "description": "OK" },
                    "404": {},
                    "500": { "description": null }
                }
            } } }),
            json!({}),
        ));

        let responses = &merged["paths"]["/scores/json/Games"]["get"]["responses"];
        assert_eq!(responses["200"]["description"], json!("OK"));
        assert_eq!(responses["404"]["description"], json!(""));
        assert_eq!(responses["500"]["description"], json!(""));
    }

    #[test]
    fn test_definitions_are_last_write_wins() {
        let first = fragment(
            "/v3/nba/scores/json",
            json!({}),
            json!({ "Player": { "type": "object", "description": "from A" } }),
        );
        let second = fragment(
            "/v3/nba/stats/json",
            json!({}),
            json!({ "Player": { "type": "object", "description": "from B" } }),
        );

        let merged = merge_fragments(
            "Scores",
            vec![
                ("a".into(), "u1".into(), first),
                ("b".into(), "u2".into(), second),
            ],
        )
        .unwrap();

        assert_eq!(merged["definitions"]["Player"]["description"], json!("from B"));
    }

    #[test]
    fn test_nullable_keys_are_rewritten_in_output() {
        let merged = merge_one(fragment(
            "/v3/nba/scores/json",
            json!({}),
            json!({ "Player": {
                "type": "object",
                "properties": { "Height": { "type": "integer", "nullable": true } }
            } }),
        ));

        assert_eq!(
            merged["definitions"]["Player"]["properties"]["Height"]["x-nullable"],
            json!(true)
        );
        assert!(merged["definitions"]["Player"]["properties"]["Height"]
            .get("nullable")
            .is_none());
    }

    #[test]
    fn test_malformed_fragments_name_the_route() {
        let missing_base = json!({
            "info": { "version": "1.0" },
            "paths": {}
        });
        let err = merge_fragments(
            "Scores",
            vec![("players".into(), "u1".into(), missing_base)],
        )
        .unwrap_err();
        match err {
            AppError::SchemaFormat { route, message } => {
                assert_eq!(route, "players");
                assert!(message.contains("missing basePath"));
                assert!(message.contains("u1"));
            }
            other => panic!("expected SchemaFormat, got {}", other),
        }

        let missing_version = json!({
            "basePath": "/v3/nba",
            "info": {},
            "paths": {}
        });
        let err = merge_fragments(
            "Scores",
            vec![("players".into(), "u1".into(), missing_version)],
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("missing info.version"));

        let missing_paths = json!({
            "basePath": "/v3/nba",
            "info": { "version": "1.0" }
        });
        let err = merge_fragments(
            "Scores",
            vec![("players".into(), "u1".into(), missing_paths)],
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("missing paths"));
    }

    #[test]
    fn test_split_base_path() {
        assert_eq!(
            split_base_path("/v3/nba/scores/json"),
            ("/v3/nba".to_string(), "scores/json".to_string())
        );
        assert_eq!(
            split_base_path("/v3/nba"),
            ("/v3/nba".to_string(), String::new())
        );
    }
}
