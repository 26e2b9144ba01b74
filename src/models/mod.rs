//! Data models for triplecull.
//!
//! Both pipeline stages work on raw byte lines. [`Triple`] borrows the four
//! fields of a dump line; [`TaggedLine`] borrows the content key and origin of
//! a line in the deduplicator's scratch file.

mod bytes;
mod tagged;
mod triple;

pub use bytes::contains_subslice;
pub use tagged::{Origin, TAG_SEPARATOR, TaggedLine, tag_line, trim_line_end};
pub use triple::{
    FIELD_COUNT, FIELD_SEPARATOR, SCHEMA_PREFIX, SUBJECT_NAMESPACE, Triple, strip_uri_markers,
};
