//! `Deduplicator` Integration Tests
//!
//! Runs the tag, sort, and merge stages end to end over real files with both
//! sorters, focusing on:
//! - Difference and matched outputs for small collections
//! - The containment tie-break
//! - Idempotence of a repeated run
//! - Scratch directory cleanup on success and failure

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use test_case::test_case;
use triplecull::config::TripleCullConfig;
use triplecull::sort::{ExternalSort, InMemorySort, TotalOrder};
use triplecull::{DedupeReport, Deduplicator, Error};

// ============================================================================
// Test Helpers
// ============================================================================

struct Workspace {
    dir: TempDir,
    scratch: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let scratch = dir.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        Self { dir, scratch }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, lines: &[&str]) -> PathBuf {
        let path = self.path(name);
        let content: String = lines.iter().map(|l| format!("{l}\n")).collect();
        fs::write(&path, content).unwrap();
        path
    }

    fn tiny_external(&self) -> ExternalSort {
        ExternalSort::new(&self.scratch)
            .with_chunk_bytes(NonZeroUsize::new(48).unwrap())
            .with_merge_fan_in(2)
    }

    fn scratch_is_empty(&self) -> bool {
        fs::read_dir(&self.scratch).unwrap().next().is_none()
    }
}

fn run<S: TotalOrder>(
    ws: &Workspace,
    sorter: S,
    reference: &[&str],
    candidate: &[&str],
) -> (DedupeReport, Vec<String>, Vec<String>) {
    let reference = ws.write("reference.tsv", reference);
    let candidate = ws.write("candidate.tsv", candidate);
    let difference = ws.path("difference.tsv");
    let matched = ws.path("matched.tsv");

    let report = Deduplicator::new(sorter, &ws.scratch)
        .dedupe_files(&reference, &candidate, &difference, &matched)
        .unwrap();

    (report, read_lines(&difference), read_lines(&matched))
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test_case(false; "in memory")]
#[test_case(true; "external")]
fn test_matched_line_leaves_difference(external: bool) {
    let ws = Workspace::new();
    let (report, difference, matched) = if external {
        run(&ws, ws.tiny_external(), &["a", "b", "c"], &["b"])
    } else {
        run(&ws, InMemorySort::new(), &["a", "b", "c"], &["b"])
    };

    assert_eq!(matched, vec!["b"]);
    assert_eq!(difference, vec!["a", "c"]);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.to_string(), "0 duplicates removed");
    assert!(ws.scratch_is_empty());
}

#[test_case(false; "in memory")]
#[test_case(true; "external")]
fn test_contained_key_is_collapsed(external: bool) {
    let ws = Workspace::new();
    let (report, difference, matched) = if external {
        run(&ws, ws.tiny_external(), &["ab", "abc"], &[])
    } else {
        run(&ws, InMemorySort::new(), &["ab", "abc"], &[])
    };

    assert_eq!(report.duplicates, 1);
    assert_eq!(difference, vec!["abc"]);
    assert!(matched.is_empty());
}

#[test]
fn test_triple_lines_with_tabs() {
    let ws = Workspace::new();
    let reference = [
        "<http://rdf.freebase.com/ns/m.01>\t<http://rdf.freebase.com/ns/p>\t\"x\"\t.",
        "<http://rdf.freebase.com/ns/m.02>\t<http://rdf.freebase.com/ns/p>\t\"y\"\t.",
    ];
    let candidate = [reference[1]];

    let (report, difference, matched) = run(&ws, InMemorySort::new(), &reference, &candidate);

    assert_eq!(difference, vec![reference[0]]);
    assert_eq!(matched, vec![reference[1]]);
    assert_eq!(report.reference_lines, 2);
    assert_eq!(report.candidate_lines, 1);
}

#[test]
fn test_trailing_whitespace_trimmed_and_blank_lines_kept() {
    let ws = Workspace::new();
    let (report, difference, matched) =
        run(&ws, InMemorySort::new(), &["k1  ", "", "k2\r"], &["k2", "   "]);

    assert_eq!(difference, vec!["k1"]);
    assert_eq!(matched, vec!["", "k2"]);
    assert_eq!(report.reference_lines, 3);
    assert_eq!(report.candidate_lines, 2);
}

#[test_case(false; "in memory")]
#[test_case(true; "external")]
fn test_blank_reference_line_collapses_into_next_key(external: bool) {
    let ws = Workspace::new();
    let (report, difference, matched) = if external {
        run(&ws, ws.tiny_external(), &["", "a"], &[])
    } else {
        run(&ws, InMemorySort::new(), &["", "a"], &[])
    };

    assert_eq!(report.reference_lines, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(difference, vec!["a"]);
    assert!(matched.is_empty());
}

#[test]
fn test_candidate_only_lines_are_ignored() {
    let ws = Workspace::new();
    let (report, difference, matched) =
        run(&ws, InMemorySort::new(), &["m"], &["a", "z", "zz"]);

    assert_eq!(difference, vec!["m"]);
    assert!(matched.is_empty());
    assert_eq!(report.matched, 0);
}

#[test]
fn test_empty_inputs() {
    let ws = Workspace::new();
    let (report, difference, matched) = run(&ws, ws.tiny_external(), &[], &[]);

    assert!(difference.is_empty());
    assert!(matched.is_empty());
    assert_eq!(report.sort.lines, 0);
}

#[test]
fn test_rerun_is_idempotent() {
    let ws = Workspace::new();
    let reference: Vec<String> = (0..300).map(|i| format!("line-{:05}", (i * 37) % 300)).collect();
    let candidate: Vec<String> = (0..300).step_by(3).map(|i| format!("line-{i:05}")).collect();
    let reference: Vec<&str> = reference.iter().map(String::as_str).collect();
    let candidate: Vec<&str> = candidate.iter().map(String::as_str).collect();

    let first = run(&ws, ws.tiny_external(), &reference, &candidate);
    let second = run(&ws, ws.tiny_external(), &reference, &candidate);

    assert_eq!(first, second);
    let (report, difference, matched) = first;
    assert_eq!(matched.len(), 100);
    assert_eq!(difference.len(), 200);
    assert!(report.sort.runs > 2);
    assert!(report.sort.merge_passes >= 1);
    assert!(ws.scratch_is_empty());
}

#[test]
fn test_external_matches_in_memory() {
    let ws = Workspace::new();
    let reference: Vec<String> = (0..120).map(|i| format!("{}", (i * 7919) % 97)).collect();
    let candidate: Vec<String> = (0..60).map(|i| format!("{}", (i * 13) % 97)).collect();
    let reference: Vec<&str> = reference.iter().map(String::as_str).collect();
    let candidate: Vec<&str> = candidate.iter().map(String::as_str).collect();

    let (external, ext_diff, ext_matched) =
        run(&ws, ws.tiny_external(), &reference, &candidate);
    let (in_memory, mem_diff, mem_matched) =
        run(&ws, InMemorySort::new(), &reference, &candidate);

    assert_eq!(ext_diff, mem_diff);
    assert_eq!(ext_matched, mem_matched);
    assert_eq!(external.duplicates, in_memory.duplicates);
}

#[test]
fn test_missing_candidate_leaves_scratch_empty() {
    let ws = Workspace::new();
    let reference = ws.write("reference.tsv", &["a"]);
    let difference = ws.path("difference.tsv");
    let matched = ws.path("matched.tsv");

    let err = Deduplicator::new(ws.tiny_external(), &ws.scratch)
        .dedupe_files(&reference, &ws.path("absent.tsv"), &difference, &matched)
        .unwrap_err();

    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert!(ws.scratch_is_empty());
    assert!(!difference.exists());
}

#[test]
fn test_unwritable_output_leaves_scratch_empty() {
    let ws = Workspace::new();
    let reference = ws.write("reference.tsv", &["a", "b"]);
    let candidate = ws.write("candidate.tsv", &["b"]);

    let err = Deduplicator::new(InMemorySort::new(), &ws.scratch)
        .dedupe_files(
            &reference,
            &candidate,
            &ws.path("no-such-dir").join("difference.tsv"),
            &ws.path("matched.tsv"),
        )
        .unwrap_err();

    assert!(matches!(err, Error::SinkWriteFailure { .. }));
    assert!(ws.scratch_is_empty());
}

#[test]
fn test_config_builds_external_sort() {
    let ws = Workspace::new();
    let config = TripleCullConfig::from_toml("[sort]\nchunk_bytes = 40\nmerge_fan_in = 2\n")
        .unwrap()
        .with_scratch_dir(&ws.scratch);

    let (report, difference, matched) =
        run(&ws, config.external_sort(), &["x", "y", "z", "w"], &["y"]);

    assert_eq!(difference, vec!["w", "x", "z"]);
    assert_eq!(matched, vec!["y"]);
    assert!(report.sort.runs >= 2);
}
