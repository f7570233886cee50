#![deny(missing_docs)]

//! # sportsgen core
//!
//! Core library for the swagger fragment merger: it turns the many
//! versioned, partially overlapping swagger documents a partitioned REST API
//! publishes into one coherent document per endpoint, ready for an external
//! client-code generator.

/// Shared error types.
pub mod error;

/// Run configuration and the endpoint registry.
pub mod config;

/// Route selection: version precedence and allow-listing.
pub mod routes;

/// Fragment fetching over HTTP.
pub mod fetch;

/// Fragment folding into one merged document.
pub mod merge;

/// Generator-dialect normalization passes.
pub mod normalization;

/// Scratch-file emission and external generator invocation.
pub mod emit;

pub use config::{
    default_route_allow_list, load_config, load_registry, parse_config, parse_registry,
    EndpointRegistry, EndpointRoutes, RunConfig,
};
pub use emit::{write_generator_inputs, ClientGenerator, ExternalGenerator, GeneratorJob};
pub use error::{AppError, AppResult};
pub use fetch::{FragmentFetcher, HttpFetcher};
pub use merge::{merge_fragments, SchemaMerger};
pub use routes::select_routes;
