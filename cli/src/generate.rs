#![deny(missing_docs)]

//! # Generation Run Loop
//!
//! Processes endpoints one at a time, in configuration order: select routes,
//! fetch each fragment sequentially, merge, persist, and drive the external
//! generator. Per-endpoint failures are reported and the run continues;
//! configuration errors abort the whole run.

use sportsgen_core::config::{EndpointRegistry, RunConfig};
use sportsgen_core::emit::{write_generator_inputs, ClientGenerator};
use sportsgen_core::fetch::FragmentFetcher;
use sportsgen_core::merge::SchemaMerger;
use sportsgen_core::routes::select_routes;
use sportsgen_core::AppResult;

/// Per-endpoint outcome tally for one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Endpoints whose library was generated.
    pub succeeded: Vec<String>,
    /// Endpoints that failed and were skipped.
    pub failed: Vec<String>,
}

/// Generates every configured endpoint.
///
/// Fetch, schema-format, and generation failures abort only the owning
/// endpoint; configuration errors (an unknown endpoint name, for instance)
/// are unrecoverable and propagate immediately.
pub fn execute(
    config: &RunConfig,
    registry: &EndpointRegistry,
    fetcher: &impl FragmentFetcher,
    generator: &impl ClientGenerator,
) -> AppResult<RunSummary> {
    let mut summary = RunSummary::default();

    for endpoint in &config.endpoints {
        println!("Generating library for endpoint: {}", endpoint);
        match generate_endpoint(endpoint, config, registry, fetcher, generator) {
            Ok(()) => {
                println!("Generated library for endpoint: {}", endpoint);
                summary.succeeded.push(endpoint.clone());
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                eprintln!("Could not generate library for endpoint {}: {}", endpoint, err);
                summary.failed.push(endpoint.clone());
            }
        }
    }

    Ok(summary)
}

/// One endpoint, start to finish. The merger and its seen-operation state
/// live only for this call.
fn generate_endpoint(
    endpoint: &str,
    config: &RunConfig,
    registry: &EndpointRegistry,
    fetcher: &impl FragmentFetcher,
    generator: &impl ClientGenerator,
) -> AppResult<()> {
    let routes = select_routes(registry, endpoint, &config.versions, &config.routes)?;
    if routes.is_empty() {
        println!("No routes selected for endpoint: {}", endpoint);
        return Ok(());
    }

    let mut merger = SchemaMerger::new(endpoint);
    for (route, url) in &routes {
        let fragment = fetcher.fetch(route, url)?;
        merger.fold(route, url, fragment)?;
    }
    let document = merger.finish();

    let job = write_generator_inputs(&document, endpoint, &config.output_directory)?;
    generator.generate(&job)
}
