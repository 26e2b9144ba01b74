//! Line sinks.

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write buffer size for output files.
const WRITE_BUFFER_BYTES: usize = 1 << 20;

/// Buffered writer for newline-terminated byte lines.
///
/// Counts the lines it writes and reports failures against its name.
pub struct LineSink<W: Write> {
    inner: BufWriter<W>,
    name: String,
    lines: u64,
}

impl<W: Write> LineSink<W> {
    /// Wraps a writer. `name` identifies the sink in errors.
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self {
            inner: BufWriter::with_capacity(WRITE_BUFFER_BYTES, writer),
            name: name.into(),
            lines: 0,
        }
    }

    /// Writes a line, adding a newline if it lacks one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkWriteFailure`] if the write fails.
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.put(line)?;
        if line.last() != Some(&b'\n') {
            self.put(b"\n")?;
        }
        self.lines += 1;
        Ok(())
    }

    /// Writes `first \t second \n`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkWriteFailure`] if the write fails.
    pub fn write_pair(&mut self, first: &[u8], second: &[u8]) -> Result<()> {
        self.put(first)?;
        self.put(b"\t")?;
        self.put(second)?;
        self.put(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of lines written so far.
    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Flushes buffered output to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkWriteFailure`] if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| Error::SinkWriteFailure {
            sink: self.name.clone(),
            cause: e.to_string(),
        })
    }

    /// Flushes buffered output and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkWriteFailure`] if the flush fails.
    pub fn finish(self) -> Result<W> {
        let name = self.name;
        self.inner.into_inner().map_err(|e| Error::SinkWriteFailure {
            sink: name,
            cause: e.error().to_string(),
        })
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| Error::SinkWriteFailure {
                sink: self.name.clone(),
                cause: e.to_string(),
            })
    }
}

/// Creates (or truncates) a file as a line sink.
///
/// # Errors
///
/// Returns [`Error::SinkWriteFailure`] if the file cannot be created.
pub fn create_sink(path: &Path) -> Result<LineSink<File>> {
    let name = path.display().to_string();
    let file = File::create(path).map_err(|e| Error::SinkWriteFailure {
        sink: name.clone(),
        cause: e.to_string(),
    })?;
    Ok(LineSink::new(file, name))
}
