#![deny(missing_docs)]

//! # Route Selection
//!
//! Builds the ordered route-name -> fragment-URL mapping to fetch for one
//! endpoint. Pure data transform over the registry and configuration; no
//! network access.

use crate::config::EndpointRegistry;
use crate::error::{AppError, AppResult};
use indexmap::{IndexMap, IndexSet};

/// Produces the ordered routes to fetch for `endpoint`.
///
/// The v2 table is inserted first (when `v2` is enabled), then the v3 table
/// (when `v3` is enabled). `IndexMap::insert` replaces the value in place,
/// so a same-named v3 entry overwrites the v2 URL while keeping the original
/// insertion position: v3 takes precedence on name collision and the table
/// ordering, which drives fetch order, stays deterministic.
///
/// Route names absent from `allowed_routes` are dropped. An unknown endpoint
/// name is a fatal [`AppError::Config`].
pub fn select_routes(
    registry: &EndpointRegistry,
    endpoint: &str,
    enabled_versions: &IndexSet<String>,
    allowed_routes: &IndexSet<String>,
) -> AppResult<IndexMap<String, String>> {
    let tables = registry.get(endpoint).ok_or_else(|| {
        AppError::Config(format!("Unknown endpoint in configuration: {}", endpoint))
    })?;

    let mut routes = IndexMap::new();
    if enabled_versions.contains("v2") {
        for (name, url) in &tables.routes_v2 {
            routes.insert(name.clone(), url.clone());
        }
    }
    if enabled_versions.contains("v3") {
        for (name, url) in &tables.routes_v3 {
            routes.insert(name.clone(), url.clone());
        }
    }

    routes.retain(|name, _| allowed_routes.contains(name));
    Ok(routes)
}
