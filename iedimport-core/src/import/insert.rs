//! Insertion of a candidate IED into a target document.
//!
//! The inserter only builds edits. Each edit carries a complete subtree and
//! references nodes that already exist in the target, so one event can be
//! applied in order without forward references.

use std::collections::HashSet;

use crate::edit::Edit;
use crate::error::InsertError;
use crate::scl::{
    COMMUNICATION_TAG, CONNECTED_AP_TAG, DATA_TYPE_TEMPLATES_TAG, ElementRef, Fragment,
    IED_NAME_ATTRIBUTE, IED_TAG, IedName, NAME_ATTRIBUTE, NodeId, SUBNETWORK_TAG, SclDocument,
};

use super::candidate::CandidateDevice;

/// Template kinds in the order the schema requires inside `DataTypeTemplates`
const TEMPLATE_ORDER: [&str; 4] = ["LNodeType", "DOType", "DAType", "EnumType"];

/// Attributes copied when a missing `SubNetwork` is created
const SUBNETWORK_ATTRIBUTES: [&str; 3] = ["name", "type", "desc"];

/// Options passed to an [`IedInserter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOptions {
    /// Also copy the device's `ConnectedAP` entries into the communication section
    pub add_communication_section: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            add_communication_section: true,
        }
    }
}

/// Builds the edits that add one device to a target scope.
pub trait IedInserter {
    /// Returns the insertion edits for `device` under `scope` of `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edits cannot be built for the given input.
    fn insert(
        &self,
        target: &SclDocument,
        scope: NodeId,
        device: &CandidateDevice,
        options: InsertOptions,
    ) -> Result<Vec<Edit>, InsertError>;
}

/// Inserter for SCL documents.
///
/// - the IED goes before the first `DataTypeTemplates` child of the scope
/// - the data type templates the IED refers to are copied when missing
/// - with `add_communication_section`, the device's `ConnectedAP` entries are
///   copied into matching `SubNetwork`s, creating them as needed
#[derive(Debug, Clone, Copy, Default)]
pub struct SclInserter;

impl SclInserter {
    /// Creates an inserter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl IedInserter for SclInserter {
    fn insert(
        &self,
        target: &SclDocument,
        scope: NodeId,
        device: &CandidateDevice,
        options: InsertOptions,
    ) -> Result<Vec<Edit>, InsertError> {
        let scope_element = target
            .element(scope)
            .filter(ElementRef::is_attached)
            .ok_or(InsertError::InvalidScope(scope))?;
        let ied = device
            .source()
            .element(device.node())
            .ok_or(InsertError::NotAnElement(device.node()))?;

        let mut edits = Vec::new();

        if options.add_communication_section {
            edits.extend(communication_edits(scope_element, ied));
        }

        let templates = scope_element.children_named(DATA_TYPE_TEMPLATES_TAG).next();
        edits.push(Edit::insert(
            scope,
            templates.map(|t| t.id()),
            ied.to_fragment(),
        ));

        edits.extend(template_edits(scope_element, templates, ied));

        Ok(edits)
    }
}

/// Edits copying the data type templates `ied` depends on
fn template_edits(
    scope: ElementRef<'_>,
    target_templates: Option<ElementRef<'_>>,
    ied: ElementRef<'_>,
) -> Vec<Edit> {
    let Some(source_templates) = ied
        .document()
        .root_element()
        .children_named(DATA_TYPE_TEMPLATES_TAG)
        .next()
    else {
        return Vec::new();
    };

    let needed = referenced_templates(source_templates, ied);
    let defined: HashSet<(&str, &str)> = target_templates
        .map(|templates| {
            templates
                .child_elements()
                .filter_map(|t| Some((t.local_name(), t.attribute("id")?)))
                .collect()
        })
        .unwrap_or_default();

    let missing: Vec<ElementRef<'_>> = TEMPLATE_ORDER
        .iter()
        .flat_map(|kind| source_templates.children_named(*kind))
        .filter(|template| {
            template.attribute("id").is_some_and(|id| {
                needed.contains(&(template.local_name(), id))
                    && !defined.contains(&(template.local_name(), id))
            })
        })
        .collect();

    if missing.is_empty() {
        return Vec::new();
    }

    match target_templates {
        Some(templates) => missing
            .into_iter()
            .map(|template| {
                Edit::insert(
                    templates.id(),
                    reference_for(templates, template.local_name()),
                    template.to_fragment(),
                )
            })
            .collect(),
        None => {
            let section = missing
                .into_iter()
                .fold(Fragment::new(DATA_TYPE_TEMPLATES_TAG), |section, template| {
                    section.with_child(template.to_fragment())
                });
            vec![Edit::insert(scope.id(), None, section)]
        }
    }
}

/// First existing child that must follow a template of `kind`
fn reference_for(templates: ElementRef<'_>, kind: &str) -> Option<NodeId> {
    let position = TEMPLATE_ORDER.iter().position(|k| *k == kind)?;
    let later = &TEMPLATE_ORDER[position + 1..];
    templates
        .child_elements()
        .find(|child| later.contains(&child.local_name()))
        .map(|child| child.id())
}

/// Collects `(kind, id)` of every template reachable from the logical nodes
/// of `ied`.
fn referenced_templates<'a>(
    templates: ElementRef<'a>,
    ied: ElementRef<'a>,
) -> HashSet<(&'a str, &'a str)> {
    let mut found = HashSet::new();
    let mut pending: Vec<(&'a str, &'a str)> = ied
        .descendants()
        .into_iter()
        .filter(|e| matches!(e.local_name(), "LN0" | "LN"))
        .filter_map(|ln| Some(("LNodeType", ln.attribute("lnType")?)))
        .collect();

    while let Some(key) = pending.pop() {
        if !found.insert(key) {
            continue;
        }
        let (kind, id) = key;
        let Some(template) = templates
            .children_named(kind)
            .find(|t| t.attribute("id") == Some(id))
        else {
            continue;
        };

        for child in template.child_elements() {
            let Some(type_id) = child.attribute("type") else {
                continue;
            };
            let referenced = match child.local_name() {
                "DO" | "SDO" => Some("DOType"),
                "DA" | "BDA" => match child.attribute("bType") {
                    Some("Struct") => Some("DAType"),
                    Some("Enum") => Some("EnumType"),
                    _ => None,
                },
                _ => None,
            };
            if let Some(kind) = referenced {
                pending.push((kind, type_id));
            }
        }
    }

    found
}

/// Edits copying the `ConnectedAP` entries of `ied` into the target scope
fn communication_edits(scope: ElementRef<'_>, ied: ElementRef<'_>) -> Vec<Edit> {
    let name = IedName::of(&ied);
    if name.is_absent() {
        return Vec::new();
    }

    let source = ied.document();
    let access_points = source.find_by_tag_and_attribute(
        source.root(),
        CONNECTED_AP_TAG,
        IED_NAME_ATTRIBUTE,
        name.as_deref(),
    );

    // Group by source subnetwork, keeping first-seen order
    let mut groups: Vec<(ElementRef<'_>, Vec<ElementRef<'_>>)> = Vec::new();
    for ap in access_points {
        let Some(subnetwork) = ap.parent().filter(|p| p.local_name() == SUBNETWORK_TAG) else {
            continue;
        };
        match groups.iter_mut().find(|(s, _)| s.id() == subnetwork.id()) {
            Some((_, aps)) => aps.push(ap),
            None => groups.push((subnetwork, vec![ap])),
        }
    }

    let communication = scope.children_named(COMMUNICATION_TAG).next();
    let mut edits = Vec::new();
    let mut new_subnetworks = Vec::new();

    for (source_subnetwork, aps) in groups {
        let subnetwork_name = source_subnetwork.attribute(NAME_ATTRIBUTE);
        let existing = communication.and_then(|c| {
            c.children_named(SUBNETWORK_TAG)
                .find(|s| s.attribute(NAME_ATTRIBUTE) == subnetwork_name)
        });

        match existing {
            Some(subnetwork) => {
                for ap in aps {
                    if !has_access_point(subnetwork, ap) {
                        edits.push(Edit::insert(subnetwork.id(), None, ap.to_fragment()));
                    }
                }
            }
            None => {
                let fragment = aps.into_iter().fold(
                    new_subnetwork(source_subnetwork),
                    |fragment, ap| fragment.with_child(ap.to_fragment()),
                );
                new_subnetworks.push(fragment);
            }
        }
    }

    if new_subnetworks.is_empty() {
        return edits;
    }

    match communication {
        Some(communication) => edits.extend(
            new_subnetworks
                .into_iter()
                .map(|fragment| Edit::insert(communication.id(), None, fragment)),
        ),
        None => {
            let section = new_subnetworks
                .into_iter()
                .fold(Fragment::new(COMMUNICATION_TAG), Fragment::with_child);
            let reference = scope
                .children_named(IED_TAG)
                .next()
                .or_else(|| scope.children_named(DATA_TYPE_TEMPLATES_TAG).next())
                .map(|e| e.id());
            edits.push(Edit::insert(scope.id(), reference, section));
        }
    }

    edits
}

/// Shell of a source subnetwork: identifying attributes and bit rate
fn new_subnetwork(source: ElementRef<'_>) -> Fragment {
    let fragment = SUBNETWORK_ATTRIBUTES
        .iter()
        .filter_map(|attr| Some((*attr, source.attribute(attr)?)))
        .fold(Fragment::new(SUBNETWORK_TAG), |fragment, (attr, value)| {
            fragment.with_attribute(attr, value)
        });
    source
        .children_named("BitRate")
        .fold(fragment, |fragment, bit_rate| {
            fragment.with_child(bit_rate.to_fragment())
        })
}

fn has_access_point(subnetwork: ElementRef<'_>, ap: ElementRef<'_>) -> bool {
    subnetwork.children_named(CONNECTED_AP_TAG).any(|existing| {
        existing.attribute(IED_NAME_ATTRIBUTE) == ap.attribute(IED_NAME_ATTRIBUTE)
            && existing.attribute("apName") == ap.attribute("apName")
    })
}
