//! Line sources.

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Path that selects standard input instead of a file.
pub const STDIN_PATH: &str = "-";

/// Read buffer size for dump files.
const READ_BUFFER_BYTES: usize = 1 << 20;

/// Reads newline-terminated byte lines into a reused buffer.
pub struct LineReader<R> {
    inner: R,
    name: String,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// Wraps a buffered reader. `name` identifies the source in errors.
    pub fn new(inner: R, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
            buf: Vec::with_capacity(1024),
        }
    }

    /// Returns the next line including its terminator, or `None` at end of input.
    ///
    /// The last line may lack a terminator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] if the underlying read fails.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        self.buf.clear();
        let read = self
            .inner
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| Error::SourceUnavailable {
                path: self.name.clone(),
                cause: e.to_string(),
            })?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(&self.buf))
    }

    /// Name of the source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Opens a file (or stdin for `-`) as a line reader.
///
/// # Errors
///
/// Returns [`Error::SourceUnavailable`] if the file cannot be opened.
pub fn open_source(path: &Path) -> Result<LineReader<Box<dyn BufRead>>> {
    let name = path.display().to_string();
    if path.as_os_str() == STDIN_PATH {
        let stdin: Box<dyn BufRead> = Box::new(std::io::stdin().lock());
        return Ok(LineReader::new(stdin, name));
    }

    let file = File::open(path).map_err(|e| Error::SourceUnavailable {
        path: name.clone(),
        cause: e.to_string(),
    })?;
    let reader: Box<dyn BufRead> = Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, file));
    Ok(LineReader::new(reader, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_next_line_keeps_terminator() {
        let mut reader = LineReader::new(Cursor::new(b"a\nb".to_vec()), "mem");
        assert_eq!(reader.next_line().unwrap(), Some(&b"a\n"[..]));
        assert_eq!(reader.next_line().unwrap(), Some(&b"b"[..]));
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn test_open_missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.tsv");
        let err = open_source(&missing).err().unwrap();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
        assert!(err.to_string().contains("nope.tsv"));
    }
}
