//! Property-based tests for the router and deduplicator.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Router counters agree with channel contents
//! - Entity ids are the subject with namespace markers removed
//! - External sort agrees with the in-memory sort for any chunk budget
//! - A collection deduplicated against itself matches every distinct key
//! - Difference and matched outputs are disjoint and come from the reference

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;
use std::num::NonZeroUsize;
use tempfile::TempDir;
use triplecull::io::LineReader;
use triplecull::sort::{ExternalSort, InMemorySort, TotalOrder};
use triplecull::{ChannelSinks, Deduplicator, TripleRouter};

// ============================================================================
// Strategies
// ============================================================================

const NS: &str = "<http://rdf.freebase.com/ns/";

fn subject() -> impl Strategy<Value = String> {
    prop_oneof![
        "m\\.[0-9a-z_]{1,8}".prop_map(|id| format!("{NS}{id}>")),
        "g\\.[0-9a-z_]{1,8}".prop_map(|id| format!("{NS}{id}>")),
        "[a-z]{2}\\.[a-z_]{1,8}".prop_map(|id| format!("{NS}{id}>")),
    ]
}

fn predicate() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(format!("{NS}type.object.type>")),
        Just(format!("{NS}type.object.name>")),
        Just(format!("{NS}common.topic.alias>")),
        Just("/fictional_universe/character/powers".to_string()),
        Just(format!("{NS}fictional_universe.character.powers>")),
        Just(format!("{NS}common.topic.topic_equivalent_wikipedia>")),
        "[a-z]{3,8}\\.[a-z]{3,8}\\.[a-z_]{3,10}".prop_map(|p| format!("{NS}{p}>")),
    ]
}

fn dump_line() -> impl Strategy<Value = String> {
    (subject(), predicate(), "[a-zA-Z0-9 .@\"/<>:_]{1,24}")
        .prop_map(|(s, p, o)| format!("{s}\t{p}\t{o}\t.\n"))
}

fn keys() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 0..60)
}

fn write_lines(dir: &TempDir, name: &str, lines: &[String]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let content: String = lines.iter().map(|l| format!("{l}\n")).collect();
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Router properties
// ============================================================================

proptest! {
    /// Property: `kept <= total` and `kept` equals the generic line count.
    #[test]
    fn prop_router_counters_match_channels(lines in prop::collection::vec(dump_line(), 0..80)) {
        let router = TripleRouter::default();
        let mut reader = LineReader::new(Cursor::new(lines.concat().into_bytes()), "mem");
        let mut sinks = ChannelSinks::new(Vec::new(), Vec::new(), Vec::new());
        let stats = router.route(&mut reader, &mut sinks, None).unwrap();
        let (generic, types, labels) = sinks.finish().unwrap();

        let count = |bytes: &[u8]| bytes.iter().filter(|&&b| b == b'\n').count() as u64;
        prop_assert!(stats.kept <= stats.total);
        prop_assert_eq!(stats.total, lines.len() as u64);
        prop_assert_eq!(stats.kept, count(&generic));
        prop_assert_eq!(stats.types, count(&types));
        prop_assert_eq!(stats.labels, count(&labels));
        prop_assert_eq!(
            stats.kept + stats.types + stats.labels + stats.dropped.total(),
            stats.total
        );
    }

    /// Property: type and label records start with the bare entity id.
    #[test]
    fn prop_entity_ids_are_stripped(lines in prop::collection::vec(dump_line(), 1..40)) {
        let router = TripleRouter::default();
        let mut reader = LineReader::new(Cursor::new(lines.concat().into_bytes()), "mem");
        let mut sinks = ChannelSinks::new(Vec::new(), Vec::new(), Vec::new());
        router.route(&mut reader, &mut sinks, None).unwrap();
        let (_, types, labels) = sinks.finish().unwrap();

        let types = String::from_utf8(types).unwrap();
        let labels = String::from_utf8(labels).unwrap();
        for record in types.lines().chain(labels.lines()) {
            let id = record.split('\t').next().unwrap();
            prop_assert!(id.starts_with("m.") || id.starts_with("g."));
            prop_assert!(!id.contains('<') && !id.contains('>'));
        }
    }
}

// ============================================================================
// Sort and dedupe properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: external sort output equals the in-memory sort output.
    #[test]
    fn prop_external_sort_matches_in_memory(
        lines in prop::collection::vec("[a-z\t]{0,10}", 0..120),
        chunk in 1usize..200,
        fan_in in 2usize..5,
    ) {
        let dir = TempDir::new().unwrap();
        let input = write_lines(&dir, "in.tsv", &lines);
        let external_out = dir.path().join("external.tsv");
        let memory_out = dir.path().join("memory.tsv");

        let external = ExternalSort::new(dir.path())
            .with_chunk_bytes(NonZeroUsize::new(chunk).unwrap())
            .with_merge_fan_in(fan_in);
        let stats = external.sort(&input, &external_out).unwrap();
        InMemorySort::new().sort(&input, &memory_out).unwrap();

        prop_assert_eq!(stats.lines, lines.len() as u64);
        prop_assert_eq!(fs::read(&external_out).unwrap(), fs::read(&memory_out).unwrap());
    }

    /// Property: deduplicating a collection against itself matches every
    /// distinct key and leaves the difference empty.
    #[test]
    fn prop_self_dedupe_matches_everything(lines in keys()) {
        let dir = TempDir::new().unwrap();
        let reference = write_lines(&dir, "reference.tsv", &lines);
        let candidate = write_lines(&dir, "candidate.tsv", &lines);
        let difference = dir.path().join("difference.tsv");
        let matched = dir.path().join("matched.tsv");

        Deduplicator::new(InMemorySort::new(), dir.path())
            .dedupe_files(&reference, &candidate, &difference, &matched)
            .unwrap();

        let distinct: Vec<String> = lines.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        let matched: Vec<String> = fs::read_to_string(&matched).unwrap().lines().map(str::to_string).collect();
        prop_assert_eq!(fs::read_to_string(&difference).unwrap(), "");
        prop_assert_eq!(matched, distinct);
    }

    /// Property: outputs are disjoint subsets of the reference keys, and every
    /// matched key also appears in the candidate.
    #[test]
    fn prop_outputs_partition_reference(reference_keys in keys(), candidate_keys in keys()) {
        let dir = TempDir::new().unwrap();
        let reference = write_lines(&dir, "reference.tsv", &reference_keys);
        let candidate = write_lines(&dir, "candidate.tsv", &candidate_keys);
        let difference = dir.path().join("difference.tsv");
        let matched = dir.path().join("matched.tsv");

        let sorter = ExternalSort::new(dir.path()).with_chunk_bytes(NonZeroUsize::new(64).unwrap());
        let report = Deduplicator::new(sorter, dir.path())
            .dedupe_files(&reference, &candidate, &difference, &matched)
            .unwrap();

        let reference_set: BTreeSet<String> = reference_keys.into_iter().collect();
        let candidate_set: BTreeSet<String> = candidate_keys.into_iter().collect();
        let difference: Vec<String> = fs::read_to_string(&difference).unwrap().lines().map(str::to_string).collect();
        let matched: Vec<String> = fs::read_to_string(&matched).unwrap().lines().map(str::to_string).collect();

        prop_assert_eq!(report.difference, difference.len() as u64);
        prop_assert_eq!(report.matched, matched.len() as u64);
        for key in &matched {
            prop_assert!(reference_set.contains(key));
            prop_assert!(candidate_set.contains(key));
            prop_assert!(!difference.contains(key));
        }
        for key in &difference {
            prop_assert!(reference_set.contains(key));
        }
    }
}
