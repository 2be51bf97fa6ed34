//! SCL document model
//!
//! A small navigable element tree over `quick-xml`:
//! - [`SclDocument`] - arena of nodes with a single root element
//! - [`ElementRef`] - borrowed element view with attribute and child queries
//! - [`Fragment`] - owned element subtree used as insert payload
//! - [`IedName`] - typed IED identity with the absent-equals-absent rule

mod document;
mod fragment;
mod identity;
mod writer;

pub use document::{Attribute, ElementRef, NodeId, SclDocument};
pub use fragment::{Fragment, FragmentNode};
pub use identity::{IedName, NAME_ATTRIBUTE};

/// Root element of an SCL document
pub const SCL_TAG: &str = "SCL";
/// Device element
pub const IED_TAG: &str = "IED";
/// Network attachment record
pub const CONNECTED_AP_TAG: &str = "ConnectedAP";
/// Attribute of a `ConnectedAP` referencing its IED by name
pub const IED_NAME_ATTRIBUTE: &str = "iedName";
/// Communication section
pub const COMMUNICATION_TAG: &str = "Communication";
/// Network inside the communication section
pub const SUBNETWORK_TAG: &str = "SubNetwork";
/// Data type template section
pub const DATA_TYPE_TEMPLATES_TAG: &str = "DataTypeTemplates";
