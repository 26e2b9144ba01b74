//! Tag-and-union stage.

use crate::Result;
use crate::io::{LineReader, LineSink};
use crate::models::{Origin, tag_line, trim_line_end};
use std::io::{BufRead, Write};

/// Copies every line of `input` into `sink` tagged with `origin`.
///
/// Trailing whitespace (including the terminator) is stripped before the tag
/// is appended. A blank line becomes the empty key. Returns the number of
/// lines written.
///
/// # Errors
///
/// Propagates read and write failures.
pub fn tag_collection<R: BufRead, W: Write>(
    input: &mut LineReader<R>,
    origin: Origin,
    sink: &mut LineSink<W>,
) -> Result<u64> {
    let mut tagged = Vec::with_capacity(1024);
    let mut written = 0u64;
    while let Some(line) = input.next_line()? {
        tagged.clear();
        tag_line(trim_line_end(line), origin, &mut tagged);
        sink.write_line(&tagged)?;
        written += 1;
    }
    Ok(written)
}
