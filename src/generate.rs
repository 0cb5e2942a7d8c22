//! Batch icon generation.
//!
//! Runs the [`Pipeline`] over every input file in parallel and writes each
//! result to `<output_dir>/<stem>-<variant>.png`. A failing input does not
//! stop the batch: it is recorded in the report and the rest carry on. Only
//! problems with the output directory itself abort.
//!
//! Two inputs can map to the same output name (`a/imp.png` and
//! `b/imp.png`, or `imp.png` and `imp.svg`). The first one in input order
//! owns the name; the others are reported as failures and never written.
//!
//! ## Parallel Processing
//!
//! Inputs are processed with [rayon](https://docs.rs/rayon). The pool size
//! comes from `[processing] max_processes` (see
//! [`effective_threads`](crate::config::effective_threads)). Progress is
//! reported per icon over an optional channel so the CLI can print while
//! work is still running.

use crate::imaging::ImageSurface;
use crate::naming::output_file_name;
use crate::process::{Pipeline, Stage};
use crate::types::ProcessingOptions;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Could not create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An icon written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedIcon {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub stages: Vec<Stage>,
}

/// An input that could not be turned into an icon.
#[derive(Debug, Clone, Serialize)]
pub struct FailedIcon {
    pub input: PathBuf,
    /// Failing stage, when the pipeline got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub error: String,
}

/// Progress event, one per input, sent as soon as that input finishes.
#[derive(Debug, Clone)]
pub enum GenerateEvent {
    Written { index: usize, icon: GeneratedIcon },
    Failed { index: usize, failure: FailedIcon },
}

/// Outcome of a batch, in input order.
#[derive(Debug, Default, Serialize)]
pub struct GenerateReport {
    pub generated: Vec<GeneratedIcon>,
    pub failed: Vec<FailedIcon>,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Assign each input its output path, refusing names already claimed by an
/// earlier input.
fn claim_outputs(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &ProcessingOptions,
) -> Vec<Result<PathBuf, FailedIcon>> {
    let mut owners: HashMap<PathBuf, &Path> = HashMap::new();
    inputs
        .iter()
        .map(|input| {
            let output = output_dir.join(output_file_name(input, options.variant));
            match owners.entry(output) {
                Entry::Occupied(owner) => Err(FailedIcon {
                    input: input.clone(),
                    stage: None,
                    error: format!(
                        "output {} is already produced by {}",
                        owner.key().display(),
                        owner.get().display()
                    ),
                }),
                Entry::Vacant(slot) => {
                    let output = slot.key().clone();
                    slot.insert(input);
                    Ok(output)
                }
            }
        })
        .collect()
}

fn generate_one<S: ImageSurface>(
    pipeline: &Pipeline<'_, S>,
    input: &Path,
    output: PathBuf,
    options: &ProcessingOptions,
) -> Result<GeneratedIcon, FailedIcon> {
    let fail = |stage: Option<Stage>, error: String| FailedIcon {
        input: input.to_path_buf(),
        stage,
        error,
    };

    let bytes = std::fs::read(input).map_err(|e| fail(None, format!("read failed: {e}")))?;
    let icon = pipeline
        .run(&bytes, options)
        .map_err(|e| fail(Some(e.stage()), e.to_string()))?;

    std::fs::write(&output, &icon.png).map_err(|e| {
        fail(
            Some(Stage::Encode),
            format!("write to {} failed: {e}", output.display()),
        )
    })?;

    Ok(GeneratedIcon {
        input: input.to_path_buf(),
        output,
        width: icon.width,
        height: icon.height,
        stages: icon.stages,
    })
}

/// Generate one icon per input with the same options.
pub fn generate<S: ImageSurface>(
    pipeline: &Pipeline<'_, S>,
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &ProcessingOptions,
    events: Option<Sender<GenerateEvent>>,
) -> Result<GenerateReport, GenerateError> {
    std::fs::create_dir_all(output_dir).map_err(|source| GenerateError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let claims = claim_outputs(inputs, output_dir, options);
    let results: Vec<Result<GeneratedIcon, FailedIcon>> = inputs
        .par_iter()
        .zip(claims)
        .enumerate()
        .map_with(events, |events, (index, (input, claim))| {
            let result = claim.and_then(|output| generate_one(pipeline, input, output, options));
            match &result {
                Ok(icon) => tracing::info!(
                    input = %icon.input.display(),
                    output = %icon.output.display(),
                    "icon written"
                ),
                Err(failure) => tracing::warn!(
                    input = %failure.input.display(),
                    error = %failure.error,
                    "icon failed"
                ),
            }
            if let Some(tx) = events {
                let event = match &result {
                    Ok(icon) => GenerateEvent::Written {
                        index,
                        icon: icon.clone(),
                    },
                    Err(failure) => GenerateEvent::Failed {
                        index,
                        failure: failure.clone(),
                    },
                };
                tx.send(event).ok();
            }
            result
        })
        .collect();

    let mut report = GenerateReport::default();
    for result in results {
        match result {
            Ok(icon) => report.generated.push(icon),
            Err(failure) => report.failed.push(failure),
        }
    }
    Ok(report)
}
