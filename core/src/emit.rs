#![deny(missing_docs)]

//! # Document Emission & Generator Invocation
//!
//! Persists a merged document to scratch files and drives the external
//! client-code generator against them. The scratch directory is a temp dir
//! dropped with the job; only the generated library under the output
//! directory survives.

use crate::error::{AppError, AppResult};
use serde_json::json;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Binary name of the external client-code generator.
pub const GENERATOR_BIN: &str = "openapi-generator";

/// Namespace prefix for generated client libraries.
pub const NAMESPACE_PREFIX: &str = "Sportsdata.API";

/// Scratch inputs prepared for one generator invocation.
pub struct GeneratorJob {
    scratch: TempDir,
    config_path: PathBuf,
    namespace: String,
    directory: PathBuf,
}

impl GeneratorJob {
    /// Path of the generator configuration file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Path of the scratch schema file.
    pub fn schema_path(&self) -> PathBuf {
        self.scratch.path().join("schema.json")
    }

    /// Namespace the generator is asked to emit.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Directory the generated library is written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Writes the merged `document` and a generator configuration pointing at it
/// to a fresh scratch directory, returning the prepared job.
///
/// The configuration names the schema file, the endpoint's namespace
/// (`Sportsdata.API.<Endpoint>`), and the output directory
/// (`<output_root>/<Endpoint>`, created here).
pub fn write_generator_inputs(
    document: &Value,
    endpoint: &str,
    output_root: &Path,
) -> AppResult<GeneratorJob> {
    let scratch = TempDir::new()?;

    let schema_path = scratch.path().join("schema.json");
    fs::write(&schema_path, serde_json::to_string_pretty(document)?)?;

    let namespace = format!("{}.{}", NAMESPACE_PREFIX, endpoint);
    let directory = output_root.join(endpoint);
    fs::create_dir_all(&directory)?;

    let config = json!({
        "openapi-file": schema_path.display().to_string(),
        "namespace": namespace,
        "directory": directory.display().to_string(),
    });
    let config_path = scratch.path().join("generator-config.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    Ok(GeneratorJob {
        scratch,
        config_path,
        namespace,
        directory,
    })
}

/// Runs the external generator for prepared jobs.
pub trait ClientGenerator {
    /// Generates one client library from `job`'s scratch inputs.
    fn generate(&self, job: &GeneratorJob) -> AppResult<()>;
}

/// Invokes the `openapi-generator` binary as a subprocess.
#[derive(Debug, Default)]
pub struct ExternalGenerator;

impl ClientGenerator for ExternalGenerator {
    fn generate(&self, job: &GeneratorJob) -> AppResult<()> {
        let output = Command::new(GENERATOR_BIN)
            .arg("generate")
            .arg("--config")
            .arg(job.config_path())
            .output()
            .map_err(|e| {
                AppError::Generation(format!("could not launch {}: {}", GENERATOR_BIN, e))
            })?;

        interpret_generator_output(
            output.status.success(),
            &output.stdout,
            &output.stderr,
        )
    }
}

/// Maps a generator invocation's exit status and captured streams to a
/// result. The generator is expected to be silent on success: any diagnostic
/// output counts as failure, as does a non-zero exit.
fn interpret_generator_output(success: bool, stdout: &[u8], stderr: &[u8]) -> AppResult<()> {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    let diagnostics = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if !success {
        return Err(AppError::Generation(format!(
            "{} exited non-zero: {}",
            GENERATOR_BIN, diagnostics
        )));
    }
    if !diagnostics.is_empty() {
        return Err(AppError::Generation(format!(
            "{} emitted diagnostics: {}",
            GENERATOR_BIN, diagnostics
        )));
    }
    Ok(())
}
