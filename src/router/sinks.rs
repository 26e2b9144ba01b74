//! Output channels of the router.

use crate::Result;
use crate::io::{LineSink, create_sink};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// The three output channels written by [`TripleRouter`](super::TripleRouter).
///
/// Constructors and [`finish`](Self::finish) all take channels in the order
/// `generic, types, labels`.
pub struct ChannelSinks<W: Write> {
    /// Raw accepted lines.
    pub generic: LineSink<W>,
    /// `entity_id \t type_id` records.
    pub types: LineSink<W>,
    /// `entity_id \t name_literal` records.
    pub labels: LineSink<W>,
}

impl<W: Write> ChannelSinks<W> {
    /// Wraps three writers as named channels.
    pub fn new(generic: W, types: W, labels: W) -> Self {
        Self {
            generic: LineSink::new(generic, "generic"),
            types: LineSink::new(types, "types"),
            labels: LineSink::new(labels, "labels"),
        }
    }

    /// Flushes all three channels.
    ///
    /// # Errors
    ///
    /// Returns the first flush failure.
    pub fn flush(&mut self) -> Result<()> {
        self.generic.flush()?;
        self.types.flush()?;
        self.labels.flush()
    }

    /// Flushes and returns the writers as `(generic, types, labels)`.
    ///
    /// # Errors
    ///
    /// Returns the first flush failure.
    pub fn finish(self) -> Result<(W, W, W)> {
        Ok((
            self.generic.finish()?,
            self.types.finish()?,
            self.labels.finish()?,
        ))
    }
}

impl ChannelSinks<File> {
    /// Creates the three channel files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkWriteFailure`](crate::Error::SinkWriteFailure) if
    /// any file cannot be created.
    pub fn create(generic: &Path, types: &Path, labels: &Path) -> Result<Self> {
        Ok(Self {
            generic: create_sink(generic)?,
            types: create_sink(types)?,
            labels: create_sink(labels)?,
        })
    }
}
