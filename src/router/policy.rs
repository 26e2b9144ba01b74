//! Predicate filtering policy.
//!
//! Rules are evaluated in a fixed order and the first match decides the route:
//!
//! 1. Subjects outside the `m.` / `g.` namespaces are dropped.
//! 2. `type.object.type` goes to the type channel.
//! 3. `type.object.name` goes to the label channel.
//! 4. Block-listed predicates are dropped.
//! 5. Predicates starting with `/fictional_universe` are dropped.
//! 6. Predicates mentioning `wikipedia` or `topic_server` are dropped.
//! 7. Everything else goes to the generic channel.

use crate::models::{Triple, contains_subslice};
use serde::Serialize;
use std::collections::HashSet;

/// Subject prefixes accepted by the policy (machine ids and generated ids).
pub const SUBJECT_PREFIXES: [&[u8]; 2] = [
    b"<http://rdf.freebase.com/ns/m.",
    b"<http://rdf.freebase.com/ns/g.",
];

/// Predicate routed to the type channel.
pub const TYPE_PREDICATE: &[u8] = b"<http://rdf.freebase.com/ns/type.object.type>";

/// Predicate routed to the label channel.
pub const NAME_PREDICATE: &[u8] = b"<http://rdf.freebase.com/ns/type.object.name>";

/// Predicates that carry no statement worth converting.
pub const BLOCKED_PREDICATES: [&str; 27] = [
    "<http://rdf.freebase.com/ns/common.notable_for.display_name>",
    "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>",
    "<http://rdf.freebase.com/ns/type.object.type>",
    "<http://rdf.freebase.com/ns/type.type.instance>",
    "<http://rdf.freebase.com/ns/type.object.key>",
    "<http://www.w3.org/2000/01/rdf-schema#label>",
    "<http://rdf.freebase.com/ns/type.object.name>",
    "<http://rdf.freebase.com/ns/common.topic.topic_equivalent_webpage>",
    "<http://rdf.freebase.com/ns/common.topic.notable_for>",
    "<http://rdf.freebase.com/ns/common.notable_for.predicate>",
    "<http://rdf.freebase.com/ns/common.notable_for.notable_object>",
    "<http://rdf.freebase.com/ns/common.notable_for.object>",
    "<http://rdf.freebase.com/ns/common.topic.notable_types>",
    "<http://rdf.freebase.com/ns/common.topic.description>",
    "<http://rdf.freebase.com/key/dataworld.freeq>",
    "<http://rdf.freebase.com/ns/type.permission.controls>",
    "<http://rdf.freebase.com/ns/type.object.permission>",
    "<http://rdf.freebase.com/key/en>",
    "<http://rdf.freebase.com/ns/common.document.text>",
    "<http://rdf.freebase.com/ns/common.topic.article>",
    "<http://rdf.freebase.com/ns/common.topic.image>",
    "<http://rdf.freebase.com/ns/common.topic.alias>",
    "<http://rdf.freebase.com/ns/common.document.source_uri>",
    "<http://rdf.freebase.com/ns/dataworld.gardening_hint.last_referenced_by>",
    "<http://rdf.freebase.com/ns/type.object.id>",
    "<http://rdf.freebase.com/ns/dataworld.gardening_hint.replaced_by>",
    "<http://rdf.freebase.com/ns/freebase.object_hints.best_hrid>",
];

/// Predicate prefix of the fictional-universe domain.
///
/// Only the bare schema path matches; full `<http://...>` predicate URIs of the
/// domain stay in the generic channel.
pub const FICTIONAL_UNIVERSE_PREFIX: &[u8] = b"/fictional_universe";

/// Substrings that exclude a predicate wherever they occur.
pub const EXCLUDED_PREDICATE_SUBSTRINGS: [&[u8]; 2] = [b"wikipedia", b"topic_server"];

/// Why a triple was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Subject is not an `m.` or `g.` entity.
    ForeignSubject,
    /// Predicate is on the block-list.
    BlockedPredicate,
    /// Predicate belongs to the fictional-universe domain.
    FictionalUniverse,
    /// Predicate contains an excluded substring.
    ExcludedSubstring,
}

/// Channel decision for one triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Entity to type pair.
    Type,
    /// Entity to name pair.
    Label,
    /// Raw line kept as-is.
    Generic,
    /// Not written anywhere.
    Dropped(DropReason),
}

/// Immutable predicate filtering rules.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    blocked: HashSet<Vec<u8>>,
}

impl FilterPolicy {
    /// Creates the standard policy for Freebase dumps.
    #[must_use]
    pub fn freebase() -> Self {
        Self {
            blocked: BLOCKED_PREDICATES
                .iter()
                .map(|p| p.as_bytes().to_vec())
                .collect(),
        }
    }

    /// Adds predicates to the block-list.
    #[must_use]
    pub fn with_blocked_predicates<I, P>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        self.blocked
            .extend(predicates.into_iter().map(|p| p.as_ref().to_vec()));
        self
    }

    /// Number of block-listed predicates.
    #[must_use]
    pub fn blocked_len(&self) -> usize {
        self.blocked.len()
    }

    /// Decides which channel a triple goes to.
    #[must_use]
    pub fn classify(&self, triple: &Triple<'_>) -> Route {
        if !SUBJECT_PREFIXES
            .iter()
            .any(|prefix| triple.subject.starts_with(prefix))
        {
            return Route::Dropped(DropReason::ForeignSubject);
        }

        let predicate = triple.predicate;
        if predicate == TYPE_PREDICATE {
            return Route::Type;
        }
        if predicate == NAME_PREDICATE {
            return Route::Label;
        }
        if self.blocked.contains(predicate) {
            return Route::Dropped(DropReason::BlockedPredicate);
        }
        if predicate.starts_with(FICTIONAL_UNIVERSE_PREFIX) {
            return Route::Dropped(DropReason::FictionalUniverse);
        }
        if EXCLUDED_PREDICATE_SUBSTRINGS
            .iter()
            .any(|needle| contains_subslice(predicate, needle))
        {
            return Route::Dropped(DropReason::ExcludedSubstring);
        }

        Route::Generic
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::freebase()
    }
}
