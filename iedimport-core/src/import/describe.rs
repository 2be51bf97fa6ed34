//! Picklist description lines for candidate devices.

use crate::scl::{ElementRef, IedName};

/// Separator between description parts
pub const DESCRIPTION_SEPARATOR: &str = " - ";

/// Attributes shown in the first description line, in order
pub const PRIMARY_ATTRIBUTES: [&str; 2] = ["manufacturer", "type"];

/// Attributes forming the version stamp, concatenated in order
pub const VERSION_ATTRIBUTES: [&str; 3] =
    ["originalSclVersion", "originalSclRevision", "originalSclRelease"];

/// Display text for one candidate device
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceDescription {
    /// Device name, or `<unnamed>`
    pub headline: String,
    /// Manufacturer and type
    pub primary: String,
    /// Description, configuration version and version stamp
    pub secondary: String,
}

impl DeviceDescription {
    /// Builds the description of an IED element.
    ///
    /// Absent and empty attribute values are left out, so neither line ever
    /// starts, ends or doubles a separator.
    #[must_use]
    pub fn of(element: &ElementRef<'_>) -> Self {
        let present = |name: &str| element.attribute(name).filter(|value| !value.is_empty());

        let primary = join_present(PRIMARY_ATTRIBUTES.iter().map(|name| present(name)));

        let stamp: String = VERSION_ATTRIBUTES
            .iter()
            .filter_map(|name| present(name))
            .collect();
        let secondary = join_present([
            present("desc"),
            present("configVersion"),
            Some(stamp.as_str()).filter(|s| !s.is_empty()),
        ]);

        Self {
            headline: IedName::of(element).to_string(),
            primary,
            secondary,
        }
    }

    /// Returns true when `query` (lowercased) occurs in any line
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        [&self.headline, &self.primary, &self.secondary]
            .iter()
            .any(|line| line.to_lowercase().contains(query))
    }
}

fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(DESCRIPTION_SEPARATOR)
}
