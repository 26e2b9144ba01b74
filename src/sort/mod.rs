//! Byte-lexicographic line sorting.
//!
//! The deduplicator needs a totally ordered copy of its scratch file before the
//! merge scan can start. [`TotalOrder`] abstracts that step:
//!
//! - [`InMemorySort`] loads every line, sorts, and writes. Suitable for inputs
//!   that fit comfortably in memory and for tests.
//! - [`ExternalSort`] sorts bounded chunks, spills them to scratch files, and
//!   k-way merges the runs, so memory stays bounded by the chunk budget.
//!
//! Both compare whole lines byte by byte, excluding the line terminator, and
//! write every output line terminated by `\n`.

mod external;

pub use external::{DEFAULT_CHUNK_BYTES, DEFAULT_MERGE_FAN_IN, ExternalSort};

use crate::Result;
use crate::io::{create_sink, open_source};
use serde::Serialize;
use std::path::Path;
use tracing::instrument;

/// Counters reported by a sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SortStats {
    /// Lines sorted.
    pub lines: u64,
    /// Sorted runs spilled to scratch files (0 when sorted in memory).
    pub runs: u64,
    /// Intermediate merge passes before the final merge.
    pub merge_passes: u64,
}

/// Produces a totally ordered copy of a line multiset.
pub trait TotalOrder {
    /// Writes the lines of `input` to `output` in byte-lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, scratch space cannot be
    /// used, or the output cannot be written.
    fn sort(&self, input: &Path, output: &Path) -> Result<SortStats>;
}

/// Sorts entirely in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemorySort;

impl InMemorySort {
    /// Creates an in-memory sorter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TotalOrder for InMemorySort {
    #[instrument(name = "triplecull.sort.in_memory", skip_all)]
    fn sort(&self, input: &Path, output: &Path) -> Result<SortStats> {
        let mut reader = open_source(input)?;
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line()? {
            lines.push(strip_terminator(line).to_vec());
        }
        lines.sort_unstable();

        let mut sink = create_sink(output)?;
        for line in &lines {
            sink.write_line(line)?;
        }
        sink.finish()?;

        Ok(SortStats {
            lines: lines.len() as u64,
            runs: 0,
            merge_passes: 0,
        })
    }
}

impl<T: TotalOrder + ?Sized> TotalOrder for &T {
    fn sort(&self, input: &Path, output: &Path) -> Result<SortStats> {
        (**self).sort(input, output)
    }
}

/// Removes one trailing `\n`, which never takes part in the ordering.
pub(crate) fn strip_terminator(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\n").unwrap_or(line)
}
