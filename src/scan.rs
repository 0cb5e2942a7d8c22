//! Input discovery.
//!
//! Expands the paths given on the command line into the list of image files
//! to process. Files are taken as-is (the decoder decides whether it can
//! read them); directories are walked recursively and only files with a
//! supported image extension are kept.
//!
//! ```text
//! uploads/
//! ├── imp.png          → kept
//! ├── .scratch.png     → skipped (hidden)
//! ├── notes.txt        → skipped (extension)
//! └── minions/
//!     └── poisoner.svg → kept
//! ```
//!
//! The result is sorted and de-duplicated so output order and file naming
//! are stable across runs.

use crate::imaging::rust_backend::supported_input_extensions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("No supported images found in: {0}")]
    NoImages(PathBuf),
}

/// Whether `path` has an extension the decoder supports (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Image files under `dir`, recursively, sorted.
fn images_in_dir(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_supported_image(p))
        .collect();
    files.sort();
    files
}

/// Expand files and directories into a sorted, de-duplicated list of inputs.
///
/// A directory without any supported image is an error, as is a path that
/// does not exist.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = images_in_dir(path);
            if found.is_empty() {
                return Err(ScanError::NoImages(path.clone()));
            }
            inputs.extend(found);
        } else if path.is_file() {
            inputs.push(path.clone());
        } else {
            return Err(ScanError::NotFound(path.clone()));
        }
    }
    inputs.sort();
    inputs.dedup();
    Ok(inputs)
}
