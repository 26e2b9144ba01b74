//! Dedupe command handler.

use anyhow::Context;
use std::path::Path;
use triplecull::config::TripleCullConfig;
use triplecull::dedupe::{DedupeReport, Deduplicator};
use triplecull::sort::{InMemorySort, TotalOrder};

/// Dedupe command.
pub fn cmd_dedupe(
    config: &TripleCullConfig,
    reference: &Path,
    candidate: &Path,
    difference: &Path,
    matched: &Path,
    in_memory: bool,
    json: bool,
) -> anyhow::Result<()> {
    let scratch_dir = config.scratch_dir();
    let outcome = if in_memory {
        run(
            Deduplicator::new(InMemorySort::new(), scratch_dir),
            reference,
            candidate,
            difference,
            matched,
        )
    } else {
        run(
            Deduplicator::new(config.external_sort(), scratch_dir),
            reference,
            candidate,
            difference,
            matched,
        )
    };
    let report = outcome.with_context(|| {
        format!(
            "deduplicating {} against {}",
            reference.display(),
            candidate.display()
        )
    })?;

    if json {
        super::print_json(&report)?;
    } else {
        println!("{report}");
    }
    Ok(())
}

fn run<S: TotalOrder>(
    dedupe: Deduplicator<S>,
    reference: &Path,
    candidate: &Path,
    difference: &Path,
    matched: &Path,
) -> triplecull::Result<DedupeReport> {
    dedupe.dedupe_files(reference, candidate, difference, matched)
}
