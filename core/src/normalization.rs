#![deny(missing_docs)]

//! # Generator-Dialect Normalization
//!
//! Helpers that rewrite a merged document into the shape the external
//! generator's schema dialect understands. These are intentionally
//! conservative and only touch fields that are known compatibility gaps.

use serde_json::Value;

/// Renames every `nullable` key to `x-nullable`, keeping its value.
///
/// The target generator predates the `nullable` keyword and only recognizes
/// the `x-nullable` vendor extension. The walk treats objects and arrays
/// uniformly and rewrites every occurrence at every nesting depth.
pub fn rewrite_nullable_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(flag) = map.remove("nullable") {
                map.insert("x-nullable".to_string(), flag);
            }
            for v in map.values_mut() {
                rewrite_nullable_keys(v);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                rewrite_nullable_keys(v);
            }
        }
        _ => {}
    }
}
