#![deny(missing_docs)]

//! # Fragment Fetching
//!
//! Retrieves schema fragments over HTTP. The trait seam keeps the merge
//! pipeline testable without a network; the run loop injects whichever
//! fetcher it is given, exactly like any other strategy.

use crate::error::{AppError, AppResult};
use serde_json::Value;

/// Retrieves one parsed schema fragment per URL.
///
/// Fetches may block; there are no retries. A failure maps to
/// [`AppError::Fetch`] and aborts only the owning endpoint's generation.
pub trait FragmentFetcher {
    /// Fetches and parses the fragment at `url`. `route` is carried for
    /// error context only.
    fn fetch(&self, route: &str, url: &str) -> AppResult<Value>;
}

/// Blocking HTTP fetcher used by the real run loop.
#[derive(Debug, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    /// Creates a fetcher with default transport settings.
    pub fn new() -> Self {
        HttpFetcher
    }
}

impl FragmentFetcher for HttpFetcher {
    fn fetch(&self, route: &str, url: &str) -> AppResult<Value> {
        let fetch_error = |message: String| AppError::Fetch {
            route: route.to_string(),
            url: url.to_string(),
            message,
        };

        let mut response = ureq::get(url)
            .call()
            .map_err(|e| fetch_error(e.to_string()))?;
        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| fetch_error(e.to_string()))
    }
}
