//! Document hosts.

use tracing::{debug, warn};

use crate::error::EditError;
use crate::scl::{NodeId, SclDocument};

use super::{Edit, Insert, Remove};

/// The application side of an import: owns the target document, applies
/// edit events and counts changes.
///
/// `submit` is fire-and-forget. Callers do not learn whether an event was
/// applied; a host that rejects an event reports it through its own channel.
pub trait DocumentHost {
    /// Read-only view of the current target document
    fn document(&self) -> &SclDocument;

    /// Dispatches one edit event
    fn submit(&mut self, edits: Vec<Edit>);

    /// Change counter, incremented by the host whenever the document changes
    fn edit_count(&self) -> u64;
}

/// One edit as it was applied, with enough information to revert it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppliedEdit {
    Inserted {
        node: NodeId,
        parent: NodeId,
        index: usize,
    },
    Removed {
        node: NodeId,
        parent: NodeId,
        index: usize,
    },
}

/// An event the host refused to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEvent {
    /// Ordinal of the event among all submitted events, starting at 1
    pub event: u64,
    /// Number of edits in the event
    pub edit_count: usize,
    /// Why the event was refused
    pub error: EditError,
}

/// A host keeping the document in memory with linear undo history.
///
/// Every event is applied atomically: when one edit fails the edits already
/// applied from the same event are reverted and the event is recorded as
/// rejected. Each applied event is one undo step.
#[derive(Debug)]
pub struct InMemoryHost {
    document: SclDocument,
    undo: Vec<Vec<AppliedEdit>>,
    redo: Vec<Vec<AppliedEdit>>,
    rejections: Vec<RejectedEvent>,
    events_received: u64,
    edit_count: u64,
}

impl InMemoryHost {
    /// Creates a host for the given document
    #[must_use]
    pub const fn new(document: SclDocument) -> Self {
        Self {
            document,
            undo: Vec::new(),
            redo: Vec::new(),
            rejections: Vec::new(),
            events_received: 0,
            edit_count: 0,
        }
    }

    /// Applies one event, returning the error that caused a rejection.
    ///
    /// # Errors
    ///
    /// Returns the first failing edit's error; the document is left unchanged.
    pub fn apply(&mut self, edits: &[Edit]) -> Result<(), EditError> {
        let mut applied = Vec::with_capacity(edits.len());

        for edit in edits {
            let result = match edit {
                Edit::Insert(insert) => self.apply_insert(insert),
                Edit::Remove(remove) => self.apply_remove(*remove),
            };

            match result {
                Ok(step) => applied.push(step),
                Err(err) => {
                    self.revert(&applied)?;
                    return Err(err);
                }
            }
        }

        if !applied.is_empty() {
            self.undo.push(applied);
            self.redo.clear();
            self.edit_count += 1;
        }
        Ok(())
    }

    /// Reverts the most recent applied event.
    ///
    /// # Errors
    ///
    /// Returns `EditError::NothingToUndo` when the history is empty.
    pub fn undo(&mut self) -> Result<(), EditError> {
        let step = self.undo.pop().ok_or(EditError::NothingToUndo)?;
        self.revert(&step)?;
        self.redo.push(step);
        self.edit_count += 1;
        Ok(())
    }

    /// Re-applies the most recently undone event.
    ///
    /// # Errors
    ///
    /// Returns `EditError::NothingToRedo` when nothing was undone.
    pub fn redo(&mut self) -> Result<(), EditError> {
        let step = self.redo.pop().ok_or(EditError::NothingToRedo)?;
        for applied in &step {
            match *applied {
                AppliedEdit::Inserted {
                    node,
                    parent,
                    index,
                } => self.document.reattach(node, parent, index)?,
                AppliedEdit::Removed { node, .. } => {
                    self.document.detach(node)?;
                }
            }
        }
        self.undo.push(step);
        self.edit_count += 1;
        Ok(())
    }

    /// Number of events that can be undone
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of events that can be redone
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Number of `submit` calls received, applied or not
    #[must_use]
    pub const fn events_received(&self) -> u64 {
        self.events_received
    }

    /// Events refused so far
    #[must_use]
    pub fn rejections(&self) -> &[RejectedEvent] {
        &self.rejections
    }

    /// Consumes the host, returning the document
    #[must_use]
    pub fn into_document(self) -> SclDocument {
        self.document
    }

    fn apply_insert(&mut self, insert: &Insert) -> Result<AppliedEdit, EditError> {
        let parent = insert.parent;
        if !self.document.contains(parent) {
            return Err(EditError::UnknownNode(parent));
        }
        if !self.document.is_attached(parent) {
            return Err(EditError::Detached(parent));
        }

        let index = match insert.reference {
            Some(reference) => self
                .document
                .children(parent)
                .iter()
                .position(|child| *child == reference)
                .ok_or(EditError::InvalidReference { parent, reference })?,
            None => self.document.children(parent).len(),
        };

        let node = self.document.attach(parent, index, &insert.node)?;
        Ok(AppliedEdit::Inserted {
            node,
            parent,
            index,
        })
    }

    fn apply_remove(&mut self, remove: Remove) -> Result<AppliedEdit, EditError> {
        let node = remove.node;
        if !self.document.contains(node) {
            return Err(EditError::UnknownNode(node));
        }
        if !self.document.is_attached(node) {
            return Err(EditError::Detached(node));
        }
        let (parent, index) = self.document.detach(node)?;
        Ok(AppliedEdit::Removed {
            node,
            parent,
            index,
        })
    }

    /// Reverts applied edits in reverse order
    fn revert(&mut self, applied: &[AppliedEdit]) -> Result<(), EditError> {
        for step in applied.iter().rev() {
            match *step {
                AppliedEdit::Inserted { node, .. } => {
                    self.document.detach(node)?;
                }
                AppliedEdit::Removed {
                    node,
                    parent,
                    index,
                } => self.document.reattach(node, parent, index)?,
            }
        }
        Ok(())
    }
}

impl DocumentHost for InMemoryHost {
    fn document(&self) -> &SclDocument {
        &self.document
    }

    fn submit(&mut self, edits: Vec<Edit>) {
        self.events_received += 1;
        let event = self.events_received;

        match self.apply(&edits) {
            Ok(()) => debug!(event, edits = edits.len(), "Applied edit event"),
            Err(error) => {
                warn!(event, edits = edits.len(), %error, "Rejected edit event");
                self.rejections.push(RejectedEvent {
                    event,
                    edit_count: edits.len(),
                    error,
                });
            }
        }
    }

    fn edit_count(&self) -> u64 {
        self.edit_count
    }
}
