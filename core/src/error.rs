#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! The taxonomy mirrors how failures propagate at runtime: `Config` errors
//! abort the whole run, `Fetch` / `SchemaFormat` / `Generation` errors abort
//! only the owning endpoint's generation.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate. `From` is derived only for the
/// wrapper variants; the domain variants carry context and are constructed
/// explicitly at the failure site.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Required configuration or registry data is missing or unreadable.
    /// Fatal: aborts the whole run.
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Config(String),

    /// Transport failure while retrieving a schema fragment.
    /// Aborts only the owning endpoint's generation.
    #[from(ignore)]
    #[display("Fetch Error for route '{route}' ({url}): {message}")]
    Fetch {
        /// Route name whose fragment was being fetched.
        route: String,
        /// Fragment URL that failed.
        url: String,
        /// Transport diagnostic.
        message: String,
    },

    /// A fetched fragment lacks the fields required for merging.
    /// Aborts only the owning endpoint's generation.
    #[from(ignore)]
    #[display("Schema Format Error for route '{route}': {message}")]
    SchemaFormat {
        /// Route name whose fragment was malformed.
        route: String,
        /// What was missing or malformed.
        message: String,
    },

    /// The external generator exited non-zero or emitted diagnostics.
    /// The endpoint is reported as failed; the run continues.
    #[from(ignore)]
    #[display("Generation Error: {_0}")]
    Generation(String),

    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Whether this error aborts the whole run rather than one endpoint.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}
