//! Scoped scratch files.

use crate::{Error, Result};
use std::path::Path;
use tempfile::NamedTempFile;

/// Creates a uniquely named scratch file in `dir`.
///
/// The file is deleted when the returned handle is dropped.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the file cannot be created.
pub fn scratch_file(dir: &Path, prefix: &str) -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".tsv")
        .tempfile_in(dir)
        .map_err(|e| Error::OperationFailed {
            operation: "create_scratch_file".to_string(),
            cause: format!("{}: {e}", dir.display()),
        })
}
