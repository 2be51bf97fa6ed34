//! Error types for `IedImport`
//!
//! This module defines all error types used throughout the library,
//! using `thiserror` for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

use crate::scl::NodeId;

/// Errors raised while parsing or writing SCL markup
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SclError {
    /// The markup is not well formed
    #[error("Malformed XML at byte {position}: {reason}")]
    Malformed {
        /// Byte offset reported by the reader
        position: u64,
        /// Reader diagnostic
        reason: String,
    },

    /// The input contains no element at all
    #[error("Document has no root element")]
    MissingRoot,

    /// Non-whitespace content or a second element after the root element
    #[error("Unexpected content outside the root element at byte {position}")]
    TrailingContent {
        /// Byte offset of the offending content
        position: u64,
    },

    /// The input ended inside an element
    #[error("Unclosed element <{0}> at end of input")]
    UnclosedElement(String),

    /// An attribute could not be read or unescaped
    #[error("Invalid attribute {attribute}: {reason}")]
    InvalidAttribute {
        /// Attribute (or owning element) name
        attribute: String,
        /// Reader diagnostic
        reason: String,
    },

    /// Serialization failed
    #[error("Failed to write XML: {0}")]
    Write(String),
}

/// Errors raised while applying edits to a document tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The node id does not belong to this document
    #[error("Node {0} does not exist")]
    UnknownNode(NodeId),

    /// The node exists but is not part of the attached tree
    #[error("Node {0} is not attached to the document")]
    Detached(NodeId),

    /// The node is already attached somewhere
    #[error("Node {0} is already attached")]
    AlreadyAttached(NodeId),

    /// The node is not an element
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// The insertion reference is not a child of the insertion parent
    #[error("Reference node {reference} is not a child of {parent}")]
    InvalidReference {
        /// Insertion parent
        parent: NodeId,
        /// Offending reference node
        reference: NodeId,
    },

    /// Attaching the node would make it its own ancestor
    #[error("Node {0} cannot be attached below itself")]
    Cycle(NodeId),

    /// The root element cannot be removed
    #[error("The root element cannot be removed")]
    RemoveRoot,

    /// The undo stack is empty
    #[error("Nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Errors raised by the IED insertion primitive
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// The insertion scope is not an attached element of the target
    #[error("Insertion scope {0} is not an attached element")]
    InvalidScope(NodeId),

    /// The candidate node is not an element of its source document
    #[error("Candidate node {0} is not an element")]
    NotAnElement(NodeId),
}

/// Errors raised while loading candidates or running an import
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// An input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// An input file could not be read
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// Path of the file
        path: PathBuf,
        /// I/O diagnostic
        reason: String,
    },

    /// An input file is not well-formed SCL markup
    #[error("Failed to parse {origin}: {source}")]
    Parse {
        /// File path or label of the input
        origin: String,
        /// Underlying parse error
        source: SclError,
    },

    /// An input file has an extension outside the accepted list
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(PathBuf),

    /// The target document has no `SCL` root element
    #[error("Target document has no SCL root element")]
    MissingScl,
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {reason}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to write configuration
    #[error("Failed to write configuration: {0}")]
    Write(String),
}

/// Main error type for the library
#[derive(Debug, Error)]
pub enum IedImportError {
    /// Markup error
    #[error("SCL error: {0}")]
    Scl(#[from] SclError),

    /// Import error
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Edit application error
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// Insertion primitive error
    #[error("Insert error: {0}")]
    Insert(#[from] InsertError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SCL operations
pub type SclResult<T> = std::result::Result<T, SclError>;

/// Result type alias for import operations
pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, IedImportError>;
