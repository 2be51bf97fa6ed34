//! Typed IED identity.

use std::fmt;

use super::ElementRef;

/// Name of the attribute that identifies an IED
pub const NAME_ATTRIBUTE: &str = "name";

/// The identity of an IED: the value of its `name` attribute.
///
/// Two names are equal when both are present and identical strings, or when
/// both are absent. The absent-equals-absent rule is deliberate: a nameless
/// candidate collides with a nameless device already in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IedName(Option<String>);

impl IedName {
    /// Creates a present name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    /// The absent name
    #[must_use]
    pub const fn absent() -> Self {
        Self(None)
    }

    /// Reads the name of an element
    #[must_use]
    pub fn of(element: &ElementRef<'_>) -> Self {
        Self::from_attribute(element.attribute(NAME_ATTRIBUTE))
    }

    /// Wraps an optional attribute value
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        Self(value.map(str::to_string))
    }

    /// The raw attribute value
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Returns true when the element carries no name
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// Applies the equality rule against a raw attribute value
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        self.0.as_deref() == value
    }
}

impl From<&str> for IedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for IedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => f.write_str(name),
            None => f.write_str("<unnamed>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_equals_absent() {
        assert_eq!(IedName::absent(), IedName::from_attribute(None));
        assert!(IedName::absent().matches(None));
    }

    #[test]
    fn test_absent_differs_from_literal_null() {
        assert_ne!(IedName::absent(), IedName::new("null"));
        assert!(!IedName::absent().matches(Some("null")));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        assert_ne!(IedName::new("IED1"), IedName::new("ied1"));
        assert!(IedName::new("IED1").matches(Some("IED1")));
    }

    #[test]
    fn test_display() {
        assert_eq!(IedName::new("Bay1").to_string(), "Bay1");
        assert_eq!(IedName::absent().to_string(), "<unnamed>");
    }
}
