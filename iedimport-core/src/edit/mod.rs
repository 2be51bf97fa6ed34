//! Edit requests and the host that applies them.
//!
//! Import code never mutates a target document. It builds [`Edit`] values and
//! hands them to a [`DocumentHost`]; one `submit` call is one edit event, and
//! the host decides how events are applied, grouped for undo and rejected.

mod host;

pub use host::{DocumentHost, InMemoryHost, RejectedEvent};

use crate::scl::{Fragment, NodeId};

/// A single structural edit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert a new subtree
    Insert(Insert),
    /// Detach an existing node
    Remove(Remove),
}

/// Inserts `node` as a child of `parent`, before `reference` when given,
/// otherwise as the last child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    /// Element receiving the new child
    pub parent: NodeId,
    /// Existing child to insert before
    pub reference: Option<NodeId>,
    /// Subtree to insert
    pub node: Fragment,
}

/// Detaches `node` (and its subtree) from its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remove {
    /// Node to detach
    pub node: NodeId,
}

impl Edit {
    /// Creates an insert request
    #[must_use]
    pub const fn insert(parent: NodeId, reference: Option<NodeId>, node: Fragment) -> Self {
        Self::Insert(Insert {
            parent,
            reference,
            node,
        })
    }

    /// Creates a remove request
    #[must_use]
    pub const fn remove(node: NodeId) -> Self {
        Self::Remove(Remove { node })
    }

    /// Returns true for remove requests
    #[must_use]
    pub const fn is_remove(&self) -> bool {
        matches!(self, Self::Remove(_))
    }

    /// Returns true for insert requests
    #[must_use]
    pub const fn is_insert(&self) -> bool {
        matches!(self, Self::Insert(_))
    }
}
