//! Grouped merge scan over the sorted, tagged scratch file.

use crate::io::{LineReader, LineSink};
use crate::models::{Origin, TaggedLine, contains_subslice};
use crate::{Error, Result};
use serde::Serialize;
use std::io::{BufRead, Write};

/// State of the merge scan.
///
/// At most one reference key is held while the scan waits to see whether a
/// candidate line matches it or the next reference line supersedes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MergeState {
    /// No reference key is waiting.
    #[default]
    Empty,
    /// A reference key is waiting for a match.
    Holding(Vec<u8>),
}

/// Counters produced by a merge scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeCounts {
    /// Keys written to the difference output.
    pub difference: u64,
    /// Keys written to the matched output.
    pub matched: u64,
    /// Reference keys collapsed into the following reference key.
    pub duplicates: u64,
}

/// Streams sorted tagged lines into the difference and matched outputs.
///
/// Transitions:
///
/// | Line | State | Effect |
/// |------|-------|--------|
/// | reference | `Empty` | hold it |
/// | reference | `Holding(p)` | `p` inside the new key: duplicate, else emit `p` to difference; hold the new key |
/// | candidate | `Empty` | skip |
/// | candidate | `Holding(p)`, equal key | emit to matched, go `Empty` |
/// | candidate | `Holding(p)`, other key | unchanged |
///
/// [`finish`](Self::finish) emits a key still held at end of input to the
/// difference output.
pub struct MergeScan<D: Write, M: Write> {
    state: MergeState,
    difference: LineSink<D>,
    matched: LineSink<M>,
    counts: MergeCounts,
}

impl<D: Write, M: Write> MergeScan<D, M> {
    /// Creates a scan writing to the given outputs.
    pub fn new(difference: LineSink<D>, matched: LineSink<M>) -> Self {
        Self {
            state: MergeState::Empty,
            difference,
            matched,
            counts: MergeCounts::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &MergeState {
        &self.state
    }

    /// Counters so far.
    #[must_use]
    pub const fn counts(&self) -> MergeCounts {
        self.counts
    }

    /// Feeds the next line of the sorted sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkWriteFailure`] if an output cannot be written.
    pub fn push(&mut self, line: TaggedLine<'_>) -> Result<()> {
        match line.origin {
            Origin::Reference => {
                let mut held = match std::mem::take(&mut self.state) {
                    MergeState::Holding(pending) => {
                        self.settle(&pending, line.key)?;
                        pending
                    },
                    MergeState::Empty => Vec::new(),
                };
                held.clear();
                held.extend_from_slice(line.key);
                self.state = MergeState::Holding(held);
            },
            Origin::Candidate => {
                if matches!(&self.state, MergeState::Holding(pending) if pending.as_slice() == line.key)
                {
                    self.matched.write_line(line.key)?;
                    self.counts.matched += 1;
                    self.state = MergeState::Empty;
                }
            },
        }
        Ok(())
    }

    /// Flushes the held key and both outputs.
    ///
    /// Returns the counters and the output writers as `(difference, matched)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkWriteFailure`] if an output cannot be written.
    pub fn finish(mut self) -> Result<(MergeCounts, D, M)> {
        if let MergeState::Holding(pending) = std::mem::take(&mut self.state) {
            self.difference.write_line(&pending)?;
            self.counts.difference += 1;
        }
        let difference = self.difference.finish()?;
        let matched = self.matched.finish()?;
        Ok((self.counts, difference, matched))
    }

    /// Decides the fate of a held reference key when the next reference key arrives.
    ///
    /// A held key that occurs inside the next key is treated as superseded.
    /// This is a containment test, not equality: `ab` followed by `abc` counts
    /// as a duplicate.
    fn settle(&mut self, pending: &[u8], next_key: &[u8]) -> Result<()> {
        if contains_subslice(next_key, pending) {
            self.counts.duplicates += 1;
        } else {
            self.difference.write_line(pending)?;
            self.counts.difference += 1;
        }
        Ok(())
    }
}

/// Runs a merge scan over every line of a sorted, tagged input.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] for a line without an origin tag, and
/// propagates read and write failures.
pub fn merge_sorted<R: BufRead, D: Write, M: Write>(
    sorted: &mut LineReader<R>,
    difference: LineSink<D>,
    matched: LineSink<M>,
) -> Result<(MergeCounts, D, M)> {
    let mut scan = MergeScan::new(difference, matched);
    let mut line_number = 0u64;
    while let Some(line) = sorted.next_line()? {
        line_number += 1;
        let tagged = TaggedLine::parse(line).ok_or_else(|| Error::OperationFailed {
            operation: "merge_scan".to_string(),
            cause: format!("line {line_number} of the sorted scratch file has no origin tag"),
        })?;
        scan.push(tagged)?;
    }
    scan.finish()
}
