//! Candidate devices and collision classification.

use std::sync::Arc;

use crate::scl::{ElementRef, IED_TAG, IedName, NodeId, SclDocument};

/// An IED read from an input file and offered for import.
///
/// The whole source document is kept alongside the element so the inserter
/// can reach the device's communication entries and data type templates.
#[derive(Debug, Clone)]
pub struct CandidateDevice {
    source: Arc<SclDocument>,
    node: NodeId,
    origin: String,
}

impl CandidateDevice {
    /// Creates a candidate for the element `node` of `source`.
    ///
    /// Returns `None` when `node` is not an element of `source`.
    #[must_use]
    pub fn new(source: Arc<SclDocument>, node: NodeId, origin: impl Into<String>) -> Option<Self> {
        source.element(node)?;
        Some(Self {
            source,
            node,
            origin: origin.into(),
        })
    }

    /// The device element
    #[must_use]
    pub fn element(&self) -> ElementRef<'_> {
        self.source
            .element(self.node)
            .unwrap_or_else(|| unreachable!("candidate node is checked on construction"))
    }

    /// Identity of the device
    #[must_use]
    pub fn name(&self) -> IedName {
        IedName::of(&self.element())
    }

    /// The parsed file the device comes from
    #[must_use]
    pub fn source(&self) -> &SclDocument {
        &self.source
    }

    /// Node id of the device inside its source document
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// File path or label of the input the device was read from
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

/// A candidate with its collision flag
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// The candidate
    pub device: CandidateDevice,
    /// True when the candidate collided with nothing when it was added
    pub unique: bool,
}

/// Candidates of one loading pass, in the order they were found.
///
/// Each candidate is classified once, when pushed, against the entries
/// before it and the target document as it was at that moment.
#[derive(Debug, Clone, Default)]
pub struct CandidateBatch {
    entries: Vec<BatchEntry>,
}

impl CandidateBatch {
    /// Creates an empty batch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `device` and appends it. Returns the uniqueness flag.
    pub fn push(&mut self, target: &SclDocument, device: CandidateDevice) -> bool {
        let unique = is_unique_candidate(target, &device.name(), self);
        self.entries.push(BatchEntry { device, unique });
        unique
    }

    /// All entries in order
    #[must_use]
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the batch has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries flagged unique
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.unique).count()
    }

    /// Returns true when an entry with this identity exists
    #[must_use]
    pub fn contains_name(&self, name: &IedName) -> bool {
        self.entries.iter().any(|entry| entry.device.name() == *name)
    }

    /// Consumes the batch, returning its entries
    #[must_use]
    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.entries
    }
}

/// Returns true iff `name` equals neither the name of an entry already in
/// `batch` nor the name of a top-level IED of `target`.
///
/// Names compare with the [`IedName`] rule, so an absent name collides with
/// another absent name.
#[must_use]
pub fn is_unique_candidate(target: &SclDocument, name: &IedName, batch: &CandidateBatch) -> bool {
    !batch.contains_name(name) && existing_top_level_ied(target, name).is_none()
}

/// Finds an IED with the given identity among the direct children of the
/// root element.
#[must_use]
pub fn existing_top_level_ied<'a>(target: &'a SclDocument, name: &IedName) -> Option<ElementRef<'a>> {
    target
        .root_element()
        .children_named(IED_TAG)
        .find(|ied| IedName::of(ied) == *name)
}
