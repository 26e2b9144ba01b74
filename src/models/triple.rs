//! Tab-separated triple records.

use crate::{Error, Result};

/// Byte separating the fields of a dump line.
pub const FIELD_SEPARATOR: u8 = b'\t';

/// Number of fields every dump line must split into.
pub const FIELD_COUNT: usize = 4;

/// Namespace prefix removed from subjects to form entity ids.
///
/// `<http://rdf.freebase.com/ns/m.0abc>` becomes `m.0abc`.
pub const SUBJECT_NAMESPACE: &[u8] = b"<http://rdf.freebase.com/ns/";

/// Host prefix removed from type objects.
///
/// Type ids keep their `/ns/` path so they line up with schema ids used by the
/// downstream conversion: `<http://rdf.freebase.com/ns/people.person>` becomes
/// `/ns/people.person`.
pub const SCHEMA_PREFIX: &[u8] = b"<http://rdf.freebase.com";

const URI_CLOSE: &[u8] = b">";

/// One line of a triple dump, split into its four fields.
///
/// Fields borrow from the line buffer. The terminator keeps whatever trails
/// the last tab, including the newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triple<'a> {
    /// Subject URI.
    pub subject: &'a [u8],
    /// Predicate URI.
    pub predicate: &'a [u8],
    /// Object URI or literal.
    pub object: &'a [u8],
    /// Trailing statement marker (usually `.` plus newline).
    pub terminator: &'a [u8],
}

impl<'a> Triple<'a> {
    /// Splits a raw dump line into a triple.
    ///
    /// `line_number` is only used to locate the failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] if the line does not split into
    /// exactly four tab-separated fields.
    pub fn parse(line: &'a [u8], line_number: u64) -> Result<Self> {
        let fields = line.iter().filter(|&&b| b == FIELD_SEPARATOR).count() + 1;
        if fields != FIELD_COUNT {
            return Err(Error::MalformedRecord {
                line: line_number,
                fields,
            });
        }

        let mut parts = line.splitn(FIELD_COUNT, |&b| b == FIELD_SEPARATOR);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(subject), Some(predicate), Some(object), Some(terminator)) => Ok(Self {
                subject,
                predicate,
                object,
                terminator,
            }),
            _ => Err(Error::MalformedRecord {
                line: line_number,
                fields,
            }),
        }
    }

    /// Entity id of the subject.
    #[must_use]
    pub fn subject_id(&self) -> &'a [u8] {
        strip_uri_markers(self.subject, SUBJECT_NAMESPACE)
    }

    /// Type id of the object, for `type.object.type` triples.
    #[must_use]
    pub fn object_type_id(&self) -> &'a [u8] {
        strip_uri_markers(self.object, SCHEMA_PREFIX)
    }
}

/// Removes `prefix` and the closing `>` from a URI.
///
/// Markers that are absent are left alone, so short or unexpected values pass
/// through instead of being sliced.
#[must_use]
pub fn strip_uri_markers<'v>(value: &'v [u8], prefix: &[u8]) -> &'v [u8] {
    let value = value.strip_prefix(prefix).unwrap_or(value);
    value.strip_suffix(URI_CLOSE).unwrap_or(value)
}
