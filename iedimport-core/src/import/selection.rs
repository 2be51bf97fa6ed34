//! The picklist shown before importing.

use crate::scl::IedName;

use super::candidate::{CandidateBatch, CandidateDevice};
use super::describe::DeviceDescription;

/// One row of the picklist
#[derive(Debug, Clone)]
pub struct SelectItem {
    /// Display text
    pub description: DeviceDescription,
    /// Whether the device will be imported
    pub selected: bool,
    /// Collision flag computed while loading
    pub unique: bool,
    /// The device itself
    pub device: CandidateDevice,
}

impl SelectItem {
    /// Device name line
    #[must_use]
    pub fn headline(&self) -> &str {
        &self.description.headline
    }
}

/// Ordered, filterable device selection.
///
/// Unique candidates start selected and colliding ones start deselected;
/// every default can be overridden before importing.
#[derive(Debug, Clone, Default)]
pub struct SelectionList {
    items: Vec<SelectItem>,
}

impl SelectionList {
    /// Builds the list from a classified batch, keeping batch order
    #[must_use]
    pub fn from_batch(batch: CandidateBatch) -> Self {
        let items = batch
            .into_entries()
            .into_iter()
            .map(|entry| SelectItem {
                description: DeviceDescription::of(&entry.device.element()),
                selected: entry.unique,
                unique: entry.unique,
                device: entry.device,
            })
            .collect();
        Self { items }
    }

    /// All rows
    #[must_use]
    pub fn items(&self) -> &[SelectItem] {
        &self.items
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the list has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sets the selection of one row. Returns false for an invalid index.
    pub fn set_selected(&mut self, index: usize, selected: bool) -> bool {
        self.items.get_mut(index).is_some_and(|item| {
            item.selected = selected;
            true
        })
    }

    /// Flips the selection of one row. Returns the new state.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let item = self.items.get_mut(index)?;
        item.selected = !item.selected;
        Some(item.selected)
    }

    /// Selects every row
    pub fn select_all(&mut self) {
        self.items.iter_mut().for_each(|item| item.selected = true);
    }

    /// Deselects every row
    pub fn select_none(&mut self) {
        self.items.iter_mut().for_each(|item| item.selected = false);
    }

    /// Sets the selection of every row with the given name.
    /// Returns the number of rows changed or confirmed.
    pub fn select_named(&mut self, name: &IedName, selected: bool) -> usize {
        let mut count = 0;
        for item in self.items.iter_mut().filter(|item| item.device.name() == *name) {
            item.selected = selected;
            count += 1;
        }
        count
    }

    /// Indices of rows whose headline or description contains `query`,
    /// ignoring case. An empty query matches every row.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<usize> {
        let query = query.trim().to_lowercase();
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| query.is_empty() || item.description.matches(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Selected devices in list order
    #[must_use]
    pub fn selected_devices(&self) -> Vec<CandidateDevice> {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.device.clone())
            .collect()
    }

    /// Number of selected rows
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    /// Number of rows that collided when loaded
    #[must_use]
    pub fn conflict_count(&self) -> usize {
        self.items.iter().filter(|item| !item.unique).count()
    }

    /// Returns a summary string of the selection
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Devices: {}, Selected: {}, Conflicts: {}",
            self.len(),
            self.selected_count(),
            self.conflict_count()
        )
    }
}
