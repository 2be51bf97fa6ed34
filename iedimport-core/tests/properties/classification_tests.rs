//! Property-based tests for collision classification
//!
//! A candidate is unique exactly when neither the target document nor an
//! earlier candidate of the same batch carries its name.

use std::collections::HashSet;

use iedimport_core::import::{CandidateBatch, CandidateLoader, is_unique_candidate};
use iedimport_core::scl::{IedName, SclDocument};
use proptest::prelude::*;

/// Strategy for a device name from a small alphabet, sometimes absent
fn arb_name() -> impl Strategy<Value = Option<String>> {
    prop::option::weighted(0.85, "[A-D]")
}

fn ied_markup(name: Option<&String>) -> String {
    name.map_or_else(|| "<IED/>".to_string(), |n| format!("<IED name=\"{n}\"/>"))
}

fn scl_markup(names: &[Option<String>]) -> String {
    let body: String = names.iter().map(|n| ied_markup(n.as_ref())).collect();
    format!("<SCL>{body}</SCL>")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The first batch occurrence of a name absent from the target is
    /// unique, every later occurrence is not, and names present in the
    /// target are never unique.
    #[test]
    fn prop_flags_follow_first_occurrence(
        existing in prop::collection::vec(arb_name(), 0..4),
        incoming in prop::collection::vec(arb_name(), 0..10),
    ) {
        let target = SclDocument::parse(&scl_markup(&existing)).expect("parse target");
        let mut batch = CandidateBatch::new();
        let found = CandidateLoader::new()
            .load_str(&scl_markup(&incoming), "input.icd", &target, &mut batch)
            .expect("load");
        prop_assert_eq!(found, incoming.len());

        let mut seen: HashSet<Option<String>> = existing.iter().cloned().collect();
        let expected: Vec<bool> = incoming.iter().map(|name| seen.insert(name.clone())).collect();
        let flags: Vec<bool> = batch.entries().iter().map(|entry| entry.unique).collect();
        prop_assert_eq!(flags, expected);
    }

    /// Classifying a name against a finished batch agrees with membership
    #[test]
    fn prop_unique_check_matches_membership(
        existing in prop::collection::vec(arb_name(), 0..4),
        incoming in prop::collection::vec(arb_name(), 0..6),
        lookup in arb_name(),
    ) {
        let target = SclDocument::parse(&scl_markup(&existing)).expect("parse target");
        let mut batch = CandidateBatch::new();
        CandidateLoader::new()
            .load_str(&scl_markup(&incoming), "input.icd", &target, &mut batch)
            .expect("load");

        let taken = existing.contains(&lookup) || incoming.contains(&lookup);
        let name = IedName::from_attribute(lookup.as_deref());
        prop_assert_eq!(is_unique_candidate(&target, &name, &batch), !taken);
    }

    /// IEDs nested below other elements of the target do not collide
    #[test]
    fn prop_nested_target_devices_do_not_collide(name in "[A-D]") {
        let target = SclDocument::parse(&format!(
            "<SCL><Private><IED name=\"{name}\"/></Private></SCL>"
        ))
        .expect("parse target");
        let batch = CandidateBatch::new();
        prop_assert!(is_unique_candidate(&target, &IedName::new(name), &batch));
    }
}
