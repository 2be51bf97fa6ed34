//! Property-based tests for picklist descriptions

use iedimport_core::import::{DESCRIPTION_SEPARATOR, DeviceDescription};
use iedimport_core::scl::SclDocument;
use proptest::prelude::*;

const ATTRIBUTES: [&str; 7] = [
    "manufacturer",
    "type",
    "desc",
    "configVersion",
    "originalSclVersion",
    "originalSclRevision",
    "originalSclRelease",
];

/// Builds an IED carrying the attributes selected by `mask`; `empty` turns
/// selected attributes into empty strings.
fn ied(mask: u8, empty: u8) -> String {
    let attributes: String = ATTRIBUTES
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(bit, name)| {
            let value = if empty & (1 << bit) != 0 { "" } else { "v" };
            format!(" {name}=\"{value}\"")
        })
        .collect();
    format!("<IED name=\"D\"{attributes}/>")
}

fn check_line(line: &str) -> Result<(), TestCaseError> {
    prop_assert!(!line.contains("null"));
    prop_assert!(!line.contains("undefined"));
    prop_assert!(!line.starts_with(DESCRIPTION_SEPARATOR.trim_end()));
    prop_assert!(!line.ends_with(DESCRIPTION_SEPARATOR.trim_start()));
    let doubled = format!("{DESCRIPTION_SEPARATOR}{DESCRIPTION_SEPARATOR}");
    prop_assert!(!line.contains(&doubled));
    Ok(())
}

#[test]
fn test_every_attribute_combination_is_clean() {
    for mask in 0..128u8 {
        let doc = SclDocument::parse(&ied(mask, 0)).expect("parse");
        let description = DeviceDescription::of(&doc.root_element());
        assert_eq!(description.headline, "D");
        for line in [&description.primary, &description.secondary] {
            assert!(check_line(line).is_ok(), "mask {mask:#09b}: {line:?}");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Empty attribute values behave like absent ones
    #[test]
    fn prop_empty_values_are_dropped(mask in 0..128u8, empty in 0..128u8) {
        let with_empty = SclDocument::parse(&ied(mask, empty)).expect("parse");
        let without = SclDocument::parse(&ied(mask & !empty, 0)).expect("parse");

        let a = DeviceDescription::of(&with_empty.root_element());
        let b = DeviceDescription::of(&without.root_element());
        check_line(&a.primary)?;
        check_line(&a.secondary)?;
        prop_assert_eq!(a, b);
    }
}
