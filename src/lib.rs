//! # Triplecull
//!
//! Reduces a large knowledge-graph dump of tab-separated triples to a smaller,
//! cleaned corpus.
//!
//! The crate provides the two batch stages of that reduction:
//!
//! - [`router::TripleRouter`] streams a triple dump once and splits it into
//!   type, label, and generic channels under a fixed [`router::FilterPolicy`].
//! - [`dedupe::Deduplicator`] compares a reference collection against a
//!   candidate collection with a tag, sort, and merge pass, producing the
//!   reference-only difference and the matched intersection in bounded memory.
//!
//! The two stages compose only through files: the generic channel of one dump
//! is typically the reference input of a later dedupe run.
//!
//! ## Example
//!
//! ```rust,ignore
//! use triplecull::dedupe::Deduplicator;
//! use triplecull::sort::ExternalSort;
//!
//! let dedupe = Deduplicator::new(ExternalSort::default(), scratch_dir);
//! let report = dedupe.dedupe_files(&reference, &candidate, &difference, &matched)?;
//! println!("{report}");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod dedupe;
pub mod io;
pub mod models;
pub mod observability;
pub mod router;
pub mod sort;

pub use config::TripleCullConfig;
pub use dedupe::{DedupeReport, Deduplicator};
pub use models::{Origin, TaggedLine, Triple};
pub use router::{ChannelSinks, FilterPolicy, Route, RouteStats, TripleRouter};
pub use sort::{ExternalSort, InMemorySort, SortStats, TotalOrder};

/// Error type for triplecull operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `MalformedRecord` | A router input line does not split into exactly 4 fields |
/// | `SourceUnavailable` | An input file or stdin cannot be opened or read |
/// | `SinkWriteFailure` | An output file cannot be created, written, or flushed |
/// | `InvalidInput` | Configuration or CLI values are out of range or unparseable |
/// | `OperationFailed` | Scratch files, sort runs, or logging setup fail |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A triple line did not split into exactly four tab-separated fields.
    ///
    /// The dump is assumed well-formed, so there is no recovery path.
    #[error("malformed record at line {line}: expected 4 tab-separated fields, found {fields}")]
    MalformedRecord {
        /// 1-based line number within the input.
        line: u64,
        /// Number of fields the line actually split into.
        fields: usize,
    },

    /// An input collection cannot be opened or read.
    #[error("source '{path}' unavailable: {cause}")]
    SourceUnavailable {
        /// Path of the input (`-` for stdin).
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// An output destination cannot be written.
    #[error("failed writing to '{sink}': {cause}")]
    SinkWriteFailure {
        /// Name or path of the sink.
        sink: String,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A config file cannot be parsed
    /// - A progress interval, chunk budget, or merge fan-in is zero
    /// - A log format name is unknown
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Scratch files cannot be created in the scratch directory
    /// - A sorted run cannot be read back during a merge
    /// - Logging has already been initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for triplecull operations.
pub type Result<T> = std::result::Result<T, Error>;
