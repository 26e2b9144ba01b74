//! External sort-based merge deduplicator.
//!
//! Compares a reference collection against a candidate collection without
//! holding either in memory:
//!
//! 1. **Tag & union**: every line is trimmed and suffixed with `\tf`
//!    (reference) or `\tw` (candidate) into one scratch file.
//! 2. **Total order**: the scratch file is sorted byte-wise by the injected
//!    [`TotalOrder`].
//! 3. **Merge scan**: a single pass with one held reference key writes
//!    reference-only keys to the difference output and keys present on both
//!    sides to the matched output (see [`MergeScan`]).
//!
//! Scratch files live in the scratch directory only for the duration of
//! [`Deduplicator::dedupe_files`] and are removed on every exit path.
//!
//! # Example
//!
//! ```rust,ignore
//! use triplecull::dedupe::Deduplicator;
//! use triplecull::sort::ExternalSort;
//!
//! let dedupe = Deduplicator::new(ExternalSort::new("/var/tmp"), "/var/tmp");
//! let report = dedupe.dedupe_files(&old_dump, &new_dump, &difference, &matched)?;
//! println!("{report}"); // "12 duplicates removed"
//! ```

mod merge;
mod tagging;

pub use merge::{MergeCounts, MergeScan, MergeState, merge_sorted};
pub use tagging::tag_collection;

use crate::Result;
use crate::io::{LineSink, create_sink, open_source, scratch_file};
use crate::models::Origin;
use crate::sort::{SortStats, TotalOrder};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::instrument;

/// Outcome of a dedupe run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupeReport {
    /// Reference lines read.
    pub reference_lines: u64,
    /// Candidate lines read.
    pub candidate_lines: u64,
    /// Keys written to the difference output.
    pub difference: u64,
    /// Keys written to the matched output.
    pub matched: u64,
    /// Reference keys collapsed by the containment rule.
    pub duplicates: u64,
    /// Sort stage counters.
    pub sort: SortStats,
}

impl fmt::Display for DedupeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} duplicates removed", self.duplicates)
    }
}

/// Computes the difference and matched sets of two line collections.
#[derive(Debug, Clone)]
pub struct Deduplicator<S: TotalOrder> {
    sorter: S,
    scratch_dir: PathBuf,
}

impl<S: TotalOrder> Deduplicator<S> {
    /// Creates a deduplicator that sorts with `sorter` and keeps its scratch
    /// files in `scratch_dir`.
    pub fn new(sorter: S, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            sorter,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Runs the three stages over two files.
    ///
    /// Both inputs are opened before anything is written. The outputs are
    /// created only once the sort has succeeded.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceUnavailable`](crate::Error::SourceUnavailable) if either input cannot be opened or read.
    /// - [`Error::SinkWriteFailure`](crate::Error::SinkWriteFailure) if an output cannot be written.
    /// - [`Error::OperationFailed`](crate::Error::OperationFailed) if scratch files cannot be created.
    #[instrument(
        name = "triplecull.dedupe.run",
        skip_all,
        fields(reference = %reference.display(), candidate = %candidate.display())
    )]
    pub fn dedupe_files(
        &self,
        reference: &Path,
        candidate: &Path,
        difference: &Path,
        matched: &Path,
    ) -> Result<DedupeReport> {
        let start = Instant::now();
        let mut reference_input = open_source(reference)?;
        let mut candidate_input = open_source(candidate)?;

        let mut tagged = scratch_file(&self.scratch_dir, "triplecull-tagged-")?;
        let tagged_name = tagged.path().display().to_string();
        let (reference_lines, candidate_lines) = {
            let mut sink = LineSink::new(&mut tagged, tagged_name);
            let reference_lines =
                tag_collection(&mut reference_input, Origin::Reference, &mut sink)?;
            let candidate_lines =
                tag_collection(&mut candidate_input, Origin::Candidate, &mut sink)?;
            sink.finish()?;
            (reference_lines, candidate_lines)
        };
        tracing::info!(reference_lines, candidate_lines, "tagged inputs");

        let sorted = scratch_file(&self.scratch_dir, "triplecull-sorted-")?;
        let sort = self.sorter.sort(tagged.path(), sorted.path())?;
        drop(tagged);
        tracing::info!(
            lines = sort.lines,
            runs = sort.runs,
            merge_passes = sort.merge_passes,
            "sorted tagged union"
        );

        let mut sorted_input = open_source(sorted.path())?;
        let (counts, _, _) = merge_sorted(
            &mut sorted_input,
            create_sink(difference)?,
            create_sink(matched)?,
        )?;

        let report = DedupeReport {
            reference_lines,
            candidate_lines,
            difference: counts.difference,
            matched: counts.matched,
            duplicates: counts.duplicates,
            sort,
        };
        tracing::info!(
            difference = report.difference,
            matched = report.matched,
            duplicates = report.duplicates,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "dedupe finished"
        );
        Ok(report)
    }
}
