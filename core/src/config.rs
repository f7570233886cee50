#![deny(missing_docs)]

//! # Run Configuration & Endpoint Registry
//!
//! Serde models for the two JSON inputs: the endpoint registry (endpoint
//! name -> versioned route tables) and the run configuration (versions,
//! endpoints, route allow-list, output directory).
//!
//! Registry-dependent defaults are resolved at parse time, so the rest of
//! the pipeline only ever sees a fully populated [`RunConfig`]. All maps are
//! ordered: configuration order determines fetch order, which is load-bearing
//! for the merge (first fragment seeds the document, first-seen operation
//! wins deduplication).

use crate::error::{AppError, AppResult};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The endpoint registry: endpoint name -> per-version route tables.
pub type EndpointRegistry = IndexMap<String, EndpointRoutes>;

/// Per-endpoint route tables, keyed by API version.
///
/// A missing version key deserializes to an empty table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointRoutes {
    /// Version 2 route table: route name -> fragment URL.
    #[serde(rename = "routes-v2", default)]
    pub routes_v2: IndexMap<String, String>,

    /// Version 3 route table: route name -> fragment URL.
    #[serde(rename = "routes-v3", default)]
    pub routes_v3: IndexMap<String, String>,
}

/// Run configuration with registry-dependent defaults already resolved.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Enabled API versions (subset of `v2` / `v3`).
    pub versions: IndexSet<String>,

    /// Endpoints to generate, in order.
    pub endpoints: Vec<String>,

    /// Route-name allow-list: only routes named here are fetched and merged.
    pub routes: IndexSet<String>,

    /// Directory the generated client libraries are placed under.
    pub output_directory: PathBuf,
}

/// Raw configuration file shape, before default resolution.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    versions: Option<IndexSet<String>>,

    #[serde(default)]
    endpoints: Option<Vec<String>>,

    #[serde(default)]
    routes: Option<IndexSet<String>>,

    #[serde(rename = "output-directory", default)]
    output_directory: Option<PathBuf>,
}

/// Reads and parses the endpoint registry file.
///
/// A missing or unreadable file is a fatal [`AppError::Config`].
pub fn load_registry(path: &Path) -> AppResult<EndpointRegistry> {
    let raw = fs::read_to_string(path).map_err(|_| {
        AppError::Config(format!(
            "Configuration file not found under: {}",
            path.display()
        ))
    })?;
    parse_registry(&raw)
}

/// Parses the endpoint registry from a JSON string.
pub fn parse_registry(json: &str) -> AppResult<EndpointRegistry> {
    serde_json::from_str(json)
        .map_err(|e| AppError::Config(format!("Malformed endpoint registry: {}", e)))
}

/// Reads and parses the run configuration file, resolving defaults against
/// `registry`.
///
/// A missing or unreadable file is a fatal [`AppError::Config`].
pub fn load_config(path: &Path, registry: &EndpointRegistry) -> AppResult<RunConfig> {
    let raw = fs::read_to_string(path).map_err(|_| {
        AppError::Config(format!(
            "Configuration file not found under: {}",
            path.display()
        ))
    })?;
    parse_config(&raw, registry)
}

/// Parses the run configuration from a JSON string, resolving defaults
/// against `registry`:
///
/// - `versions` defaults to both `v2` and `v3`;
/// - `endpoints` defaults to every registry key, in registry order;
/// - `routes` defaults to the union of all route names (see
///   [`default_route_allow_list`]);
/// - `output-directory` defaults to `generated`.
pub fn parse_config(json: &str, registry: &EndpointRegistry) -> AppResult<RunConfig> {
    let raw: RawConfig = serde_json::from_str(json)
        .map_err(|e| AppError::Config(format!("Malformed run configuration: {}", e)))?;

    Ok(RunConfig {
        versions: raw.versions.unwrap_or_else(default_versions),
        endpoints: raw
            .endpoints
            .unwrap_or_else(|| registry.keys().cloned().collect()),
        routes: raw
            .routes
            .unwrap_or_else(|| default_route_allow_list(registry)),
        output_directory: raw
            .output_directory
            .unwrap_or_else(|| PathBuf::from("generated")),
    })
}

fn default_versions() -> IndexSet<String> {
    ["v2", "v3"].iter().map(|v| v.to_string()).collect()
}

/// Union of every route name in the registry, v3 tables first, deduplicated.
pub fn default_route_allow_list(registry: &EndpointRegistry) -> IndexSet<String> {
    let mut names = IndexSet::new();
    for tables in registry.values() {
        names.extend(tables.routes_v3.keys().cloned());
    }
    for tables in registry.values() {
        names.extend(tables.routes_v2.keys().cloned());
    }
    names
}
