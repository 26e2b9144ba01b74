//! Origin-tagged lines for the merge deduplicator.
//!
//! Every line written to the scratch file is `<content>\t<tag>\n`. The tab
//! sorts below every printable byte, so after a byte-wise sort a key lands
//! directly in front of any longer key it prefixes, and `f` before `w` puts a
//! reference line ahead of an equal candidate line.

use serde::Serialize;
use std::fmt;

/// Byte separating the content key from the origin tag.
pub const TAG_SEPARATOR: u8 = b'\t';

/// Which input collection a tagged line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The reference ("from") collection.
    Reference,
    /// The candidate ("with") collection.
    Candidate,
}

impl Origin {
    /// Returns the single-byte tag for this origin.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Reference => b'f',
            Self::Candidate => b'w',
        }
    }

    /// Parses a tag byte.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'f' => Some(Self::Reference),
            b'w' => Some(Self::Candidate),
            _ => None,
        }
    }

    /// Returns the origin as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Candidate => "candidate",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sorted scratch line split back into content key and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedLine<'a> {
    /// The line content without separator and tag.
    pub key: &'a [u8],
    /// Collection the line came from.
    pub origin: Origin,
}

impl<'a> TaggedLine<'a> {
    /// Parses `<content>\t<tag>` with optional trailing whitespace.
    ///
    /// Returns `None` if the line does not end in a separator and a known tag.
    #[must_use]
    pub fn parse(line: &'a [u8]) -> Option<Self> {
        let (&tag, rest) = trim_line_end(line).split_last()?;
        let origin = Origin::from_tag(tag)?;
        let key = rest.strip_suffix(&[TAG_SEPARATOR])?;
        Some(Self { key, origin })
    }
}

/// Strips trailing ASCII whitespace, including the line terminator.
#[must_use]
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    line.trim_ascii_end()
}

/// Appends `content`, the separator, the origin tag and a newline to `out`.
pub fn tag_line(content: &[u8], origin: Origin, out: &mut Vec<u8>) {
    out.extend_from_slice(content);
    out.push(TAG_SEPARATOR);
    out.push(origin.tag());
    out.push(b'\n');
}
