//! Chunked external merge sort.

use super::{SortStats, TotalOrder, strip_terminator};
use crate::Result;
use crate::io::{LineSink, create_sink, open_source, scratch_file};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::instrument;

/// Default in-memory chunk budget (256 MiB).
pub const DEFAULT_CHUNK_BYTES: NonZeroUsize = match NonZeroUsize::new(256 * 1024 * 1024) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Default number of runs merged at once.
pub const DEFAULT_MERGE_FAN_IN: usize = 64;

/// Smallest usable fan-in.
const MIN_MERGE_FAN_IN: usize = 2;

/// Per-line bookkeeping charged against the chunk budget.
const LINE_OVERHEAD: usize = std::mem::size_of::<Vec<u8>>();

/// Sorts with bounded memory by spilling sorted chunks to scratch files.
///
/// Input that fits in one chunk is sorted in memory and written directly.
/// Otherwise every chunk becomes a sorted run in the scratch directory and the
/// runs are merged with a binary heap, `merge_fan_in` at a time. Scratch files
/// are removed when the sort returns, on success or failure.
#[derive(Debug, Clone)]
pub struct ExternalSort {
    chunk_bytes: NonZeroUsize,
    merge_fan_in: usize,
    scratch_dir: PathBuf,
}

impl ExternalSort {
    /// Creates an external sort that spills into `scratch_dir`.
    #[must_use]
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            merge_fan_in: DEFAULT_MERGE_FAN_IN,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Sets the in-memory chunk budget in bytes.
    #[must_use]
    pub const fn with_chunk_bytes(mut self, chunk_bytes: NonZeroUsize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    /// Sets how many runs are merged at once. Values below 2 are raised to 2.
    #[must_use]
    pub fn with_merge_fan_in(mut self, fan_in: usize) -> Self {
        self.merge_fan_in = fan_in.max(MIN_MERGE_FAN_IN);
        self
    }

    /// Sorts a chunk and writes it out as a run.
    fn spill(&self, chunk: &mut Vec<Vec<u8>>) -> Result<NamedTempFile> {
        chunk.sort_unstable();
        let mut run = scratch_file(&self.scratch_dir, "triplecull-run-")?;
        let name = run.path().display().to_string();
        {
            let mut sink = LineSink::new(&mut run, name);
            for line in chunk.iter() {
                sink.write_line(line)?;
            }
            sink.finish()?;
        }
        tracing::debug!(lines = chunk.len(), path = %run.path().display(), "spilled sorted run");
        chunk.clear();
        Ok(run)
    }

    /// Merges groups of runs until at most `merge_fan_in` remain.
    fn reduce_runs(&self, mut runs: Vec<NamedTempFile>) -> Result<(Vec<NamedTempFile>, u64)> {
        let mut passes = 0;
        while runs.len() > self.merge_fan_in {
            passes += 1;
            let mut merged = Vec::with_capacity(runs.len().div_ceil(self.merge_fan_in));
            while !runs.is_empty() {
                let take = runs.len().min(self.merge_fan_in);
                let group: Vec<NamedTempFile> = runs.drain(..take).collect();
                let mut run = scratch_file(&self.scratch_dir, "triplecull-merge-")?;
                let name = run.path().display().to_string();
                {
                    let mut sink = LineSink::new(&mut run, name);
                    merge_runs(&group, &mut sink)?;
                    sink.finish()?;
                }
                merged.push(run);
            }
            tracing::debug!(pass = passes, runs = merged.len(), "merge pass finished");
            runs = merged;
        }
        Ok((runs, passes))
    }
}

impl Default for ExternalSort {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl TotalOrder for ExternalSort {
    #[instrument(
        name = "triplecull.sort.external",
        skip_all,
        fields(chunk_bytes = self.chunk_bytes.get(), fan_in = self.merge_fan_in)
    )]
    fn sort(&self, input: &Path, output: &Path) -> Result<SortStats> {
        let mut reader = open_source(input)?;
        let mut runs = Vec::new();
        let mut chunk: Vec<Vec<u8>> = Vec::new();
        let mut chunk_bytes = 0usize;
        let mut lines = 0u64;

        while let Some(line) = reader.next_line()? {
            let line = strip_terminator(line);
            chunk_bytes += line.len() + LINE_OVERHEAD;
            chunk.push(line.to_vec());
            lines += 1;
            if chunk_bytes >= self.chunk_bytes.get() {
                runs.push(self.spill(&mut chunk)?);
                chunk_bytes = 0;
            }
        }

        if runs.is_empty() {
            chunk.sort_unstable();
            let mut sink = create_sink(output)?;
            for line in &chunk {
                sink.write_line(line)?;
            }
            sink.finish()?;
            return Ok(SortStats {
                lines,
                runs: 0,
                merge_passes: 0,
            });
        }

        if !chunk.is_empty() {
            runs.push(self.spill(&mut chunk)?);
        }
        drop(chunk);

        let run_count = runs.len() as u64;
        let (runs, merge_passes) = self.reduce_runs(runs)?;
        let mut sink = create_sink(output)?;
        merge_runs(&runs, &mut sink)?;
        sink.finish()?;

        Ok(SortStats {
            lines,
            runs: run_count,
            merge_passes,
        })
    }
}

/// K-way merges sorted runs into `sink`.
fn merge_runs<W: Write>(runs: &[NamedTempFile], sink: &mut LineSink<W>) -> Result<()> {
    let mut readers = runs
        .iter()
        .map(|run| open_source(run.path()))
        .collect::<Result<Vec<_>>>()?;

    let mut heap = BinaryHeap::with_capacity(readers.len());
    for (index, reader) in readers.iter_mut().enumerate() {
        if let Some(line) = reader.next_line()? {
            heap.push(Reverse((strip_terminator(line).to_vec(), index)));
        }
    }

    while let Some(Reverse((line, index))) = heap.pop() {
        sink.write_line(&line)?;
        if let Some(reader) = readers.get_mut(index) {
            if let Some(next) = reader.next_line()? {
                heap.push(Reverse((strip_terminator(next).to_vec(), index)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::sort::InMemorySort;

    fn sort_with(sorter: &impl TotalOrder, content: &str) -> (SortStats, String) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.tsv");
        let output = dir.path().join("out.tsv");
        std::fs::write(&input, content).unwrap();
        let stats = sorter.sort(&input, &output).unwrap();
        (stats, std::fs::read_to_string(&output).unwrap())
    }

    fn sample() -> String {
        (0..200)
            .map(|i| format!("{}\t{}\n", (i * 7919) % 113, if i % 2 == 0 { 'f' } else { 'w' }))
            .collect()
    }

    #[test]
    fn test_small_input_stays_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let sorter = ExternalSort::new(dir.path());
        let (stats, out) = sort_with(&sorter, "c\nb\na\n");
        assert_eq!(out, "a\nb\nc\n");
        assert_eq!(stats.runs, 0);
    }

    #[test]
    fn test_spilled_runs_match_in_memory_order() {
        let dir = tempfile::tempdir().unwrap();
        let sorter = ExternalSort::new(dir.path())
            .with_chunk_bytes(NonZeroUsize::new(256).unwrap())
            .with_merge_fan_in(3);
        let content = sample();

        let (stats, external) = sort_with(&sorter, &content);
        let (_, in_memory) = sort_with(&InMemorySort::new(), &content);

        assert_eq!(external, in_memory);
        assert_eq!(stats.lines, 200);
        assert!(stats.runs > 3);
        assert!(stats.merge_passes >= 1);
    }

    #[test]
    fn test_scratch_files_removed() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        let sorter = ExternalSort::new(&scratch).with_chunk_bytes(NonZeroUsize::new(64).unwrap());

        sort_with(&sorter, &sample());

        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_scratch_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.tsv");
        std::fs::write(&input, sample()).unwrap();
        let sorter = ExternalSort::new(dir.path().join("absent"))
            .with_chunk_bytes(NonZeroUsize::new(64).unwrap());

        let err = sorter.sort(&input, &dir.path().join("out.tsv")).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_fan_in_floor() {
        let sorter = ExternalSort::default().with_merge_fan_in(0);
        assert_eq!(sorter.merge_fan_in, MIN_MERGE_FAN_IN);
    }
}
