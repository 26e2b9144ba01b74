//! Streaming triple router.
//!
//! A single forward pass over a triple dump that splits it into three
//! channels under a [`FilterPolicy`]:
//!
//! | Channel | Record | Source |
//! |---------|--------|--------|
//! | types | `entity_id \t type_id` | `type.object.type` triples |
//! | labels | `entity_id \t name_literal` | `type.object.name` triples |
//! | generic | raw line | everything else the policy keeps |
//!
//! The router holds two counters and one line buffer, so memory stays
//! constant regardless of dump size.
//!
//! # Example
//!
//! ```rust,ignore
//! use triplecull::io::open_source;
//! use triplecull::router::{ChannelSinks, FilterPolicy, TripleRouter};
//!
//! let router = TripleRouter::new(FilterPolicy::freebase());
//! let mut input = open_source(Path::new("-"))?;
//! let mut sinks = ChannelSinks::create(&generic, &types, &labels)?;
//! let stats = router.route(&mut input, &mut sinks, None)?;
//! println!("{} {}", stats.kept, stats.total);
//! ```

mod policy;
mod sinks;

pub use policy::{
    BLOCKED_PREDICATES, DropReason, EXCLUDED_PREDICATE_SUBSTRINGS, FICTIONAL_UNIVERSE_PREFIX,
    FilterPolicy, NAME_PREDICATE, Route, SUBJECT_PREFIXES, TYPE_PREDICATE,
};
pub use sinks::ChannelSinks;

use crate::Result;
use crate::io::LineReader;
use crate::models::Triple;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::num::NonZeroU64;
use std::time::Instant;
use tracing::instrument;

/// Lines between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: NonZeroU64 = match NonZeroU64::new(1_000_000) {
    Some(n) => n,
    None => NonZeroU64::MIN,
};

/// Dropped-line counts by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    /// Subjects outside the accepted namespaces.
    pub foreign_subject: u64,
    /// Block-listed predicates.
    pub blocked_predicate: u64,
    /// Fictional-universe predicates.
    pub fictional_universe: u64,
    /// Predicates with an excluded substring.
    pub excluded_substring: u64,
}

impl DropCounts {
    const fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::ForeignSubject => self.foreign_subject += 1,
            DropReason::BlockedPredicate => self.blocked_predicate += 1,
            DropReason::FictionalUniverse => self.fictional_universe += 1,
            DropReason::ExcludedSubstring => self.excluded_substring += 1,
        }
    }

    /// Total dropped lines.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.foreign_subject + self.blocked_predicate + self.fictional_universe + self.excluded_substring
    }
}

/// Counters accumulated over one routing pass.
///
/// `kept` counts generic-channel lines only; type and label records are
/// tallied separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteStats {
    /// Lines written to the generic channel.
    pub kept: u64,
    /// Lines read.
    pub total: u64,
    /// Records written to the type channel.
    pub types: u64,
    /// Records written to the label channel.
    pub labels: u64,
    /// Lines dropped, by reason.
    pub dropped: DropCounts,
}

/// Periodic progress signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteProgress {
    /// Generic lines kept so far.
    pub kept: u64,
    /// Lines read so far.
    pub total: u64,
    /// Completed progress intervals (`total / interval`).
    pub intervals: u64,
}

/// Routes a triple stream into type, label, and generic channels.
#[derive(Debug, Clone)]
pub struct TripleRouter {
    policy: FilterPolicy,
    progress_interval: NonZeroU64,
}

impl TripleRouter {
    /// Creates a router with the default progress interval.
    #[must_use]
    pub const fn new(policy: FilterPolicy) -> Self {
        Self {
            policy,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Sets the number of lines between progress reports.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: NonZeroU64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Routes every line of `input` and flushes the sinks.
    ///
    /// `progress` is called every `progress_interval` lines, before the line
    /// that completes the interval is classified.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedRecord`](crate::Error::MalformedRecord) for a line
    ///   that does not split into four fields; the pass stops there.
    /// - [`Error::SourceUnavailable`](crate::Error::SourceUnavailable) if
    ///   reading fails.
    /// - [`Error::SinkWriteFailure`](crate::Error::SinkWriteFailure) if any
    ///   channel cannot be written.
    #[instrument(
        name = "triplecull.router.route",
        skip_all,
        fields(source = input.name(), interval = self.progress_interval.get())
    )]
    pub fn route<R: BufRead, W: Write>(
        &self,
        input: &mut LineReader<R>,
        sinks: &mut ChannelSinks<W>,
        mut progress: Option<&mut dyn FnMut(&RouteProgress)>,
    ) -> Result<RouteStats> {
        let start = Instant::now();
        let interval = self.progress_interval.get();
        let mut stats = RouteStats::default();

        while let Some(line) = input.next_line()? {
            stats.total += 1;
            if stats.total % interval == 0 {
                if let Some(report) = progress.as_deref_mut() {
                    report(&RouteProgress {
                        kept: stats.kept,
                        total: stats.total,
                        intervals: stats.total / interval,
                    });
                }
            }

            let triple = Triple::parse(line, stats.total)?;
            match self.policy.classify(&triple) {
                Route::Type => {
                    sinks
                        .types
                        .write_pair(triple.subject_id(), triple.object_type_id())?;
                    stats.types += 1;
                },
                Route::Label => {
                    sinks.labels.write_pair(triple.subject_id(), triple.object)?;
                    stats.labels += 1;
                },
                Route::Generic => {
                    sinks.generic.write_line(line)?;
                    stats.kept += 1;
                },
                Route::Dropped(reason) => stats.dropped.record(reason),
            }
        }

        sinks.flush()?;

        tracing::info!(
            kept = stats.kept,
            total = stats.total,
            types = stats.types,
            labels = stats.labels,
            dropped = stats.dropped.total(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "routing finished"
        );
        Ok(stats)
    }
}

impl Default for TripleRouter {
    fn default() -> Self {
        Self::new(FilterPolicy::default())
    }
}
