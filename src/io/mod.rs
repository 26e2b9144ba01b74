//! Line-oriented file I/O.
//!
//! Both pipeline stages read and write newline-terminated byte lines. This
//! module wraps the readers and writers so that I/O failures surface as the
//! crate's error taxonomy:
//!
//! - read failures become [`Error::SourceUnavailable`](crate::Error::SourceUnavailable)
//! - write and flush failures become [`Error::SinkWriteFailure`](crate::Error::SinkWriteFailure)
//!
//! Scratch files for the sort stage are created with [`scratch_file`] and
//! disappear when their handle is dropped.
//!
//! # Examples
//!
//! ```rust,ignore
//! use triplecull::io::{create_sink, open_source};
//!
//! let mut reader = open_source(Path::new("-"))?; // stdin
//! let mut sink = create_sink(Path::new("out.tsv"))?;
//! while let Some(line) = reader.next_line()? {
//!     sink.write_line(line)?;
//! }
//! sink.finish()?;
//! ```

mod scratch;
mod sink;
mod source;

pub use scratch::scratch_file;
pub use sink::{LineSink, create_sink};
pub use source::{LineReader, STDIN_PATH, open_source};
