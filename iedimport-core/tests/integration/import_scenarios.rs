//! Integration tests for the import orchestrator
//!
//! These tests run imports against an applying host and against a host that
//! only records events, and check the emitted events and resulting documents.

use std::sync::Arc;
use std::time::{Duration, Instant};

use iedimport_core::edit::{DocumentHost, Edit, InMemoryHost};
use iedimport_core::error::{ImportError, InsertError};
use iedimport_core::import::{
    CandidateBatch, CandidateDevice, CandidateLoader, DeviceOutcome, EditSpacing, IedInserter,
    ImportOrchestrator, InsertOptions, SelectionList,
};
use iedimport_core::scl::{IedName, NodeId, SclDocument};

const TARGET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SCL xmlns="http://www.iec.ch/61850/2003/SCL" version="2007" revision="B">
  <Header id="station"/>
  <Communication>
    <SubNetwork name="StationBus" type="8-MMS">
      <ConnectedAP iedName="A" apName="AP1"/>
    </SubNetwork>
  </Communication>
  <IED name="A" manufacturer="Old"/>
  <IED name="Keep" manufacturer="Other"/>
  <DataTypeTemplates/>
</SCL>"#;

const INCOMING_A: &str = r#"<SCL version="2007">
  <IED name="A" manufacturer="New" type="Relay"/>
</SCL>"#;

/// Host that records events without applying them
struct RecordingHost {
    document: SclDocument,
    events: Vec<Vec<Edit>>,
}

impl RecordingHost {
    fn new(markup: &str) -> Self {
        Self {
            document: SclDocument::parse(markup).expect("parse target"),
            events: Vec::new(),
        }
    }
}

impl DocumentHost for RecordingHost {
    fn document(&self) -> &SclDocument {
        &self.document
    }

    fn submit(&mut self, edits: Vec<Edit>) {
        self.events.push(edits);
    }

    fn edit_count(&self) -> u64 {
        0
    }
}

/// Inserter that refuses every device
struct RefusingInserter;

impl IedInserter for RefusingInserter {
    fn insert(
        &self,
        _target: &SclDocument,
        scope: NodeId,
        _device: &CandidateDevice,
        _options: InsertOptions,
    ) -> Result<Vec<Edit>, InsertError> {
        Err(InsertError::InvalidScope(scope))
    }
}

fn orchestrator() -> ImportOrchestrator {
    ImportOrchestrator::new().with_spacing(EditSpacing::none())
}

fn load(target: &SclDocument, inputs: &[&str]) -> CandidateBatch {
    let loader = CandidateLoader::new();
    let mut batch = CandidateBatch::new();
    for (index, input) in inputs.iter().enumerate() {
        loader
            .load_str(input, &format!("input{index}.icd"), target, &mut batch)
            .expect("load input");
    }
    batch
}

fn ied_manufacturers(doc: &SclDocument) -> Vec<(String, String)> {
    doc.root_element()
        .children_named("IED")
        .map(|ied| {
            (
                ied.attribute("name").unwrap_or("<none>").to_string(),
                ied.attribute("manufacturer").unwrap_or("<none>").to_string(),
            )
        })
        .collect()
}

// ============================================================================
// Replacement of an existing device
// ============================================================================

#[tokio::test]
async fn test_existing_device_is_replaced_with_two_events() {
    let mut host = RecordingHost::new(TARGET);
    let batch = load(&host.document, &[INCOMING_A]);
    assert!(!batch.entries()[0].unique);

    let mut list = SelectionList::from_batch(batch);
    assert!(list.selected_devices().is_empty());
    assert!(list.set_selected(0, true));

    let report = orchestrator()
        .run(&mut host, &list.selected_devices())
        .await
        .expect("run");

    assert_eq!(host.events.len(), 2);
    assert_eq!(report.events_submitted, 2);

    let existing = host
        .document
        .find_child(host.document.root(), "IED", "name", Some("A"))
        .expect("existing A")
        .id();
    let ap = host
        .document
        .find_descendants(host.document.root(), "ConnectedAP")[0]
        .id();
    assert_eq!(host.events[0], vec![Edit::remove(existing), Edit::remove(ap)]);

    assert!(host.events[1].iter().all(Edit::is_insert));
    let inserted_ied = host.events[1].iter().find_map(|edit| match edit {
        Edit::Insert(insert) if insert.node.local_name() == "IED" => Some(&insert.node),
        _ => None,
    });
    assert_eq!(
        inserted_ied.and_then(|ied| ied.attribute("manufacturer")),
        Some("New")
    );

    assert_eq!(
        report.outcomes,
        vec![DeviceOutcome::Imported {
            name: IedName::new("A"),
            replaced: true,
            removed_attachments: 1,
        }]
    );
}

#[tokio::test]
async fn test_replacement_applied_by_host_keeps_empty_network_containers() {
    let mut host = InMemoryHost::new(SclDocument::parse(TARGET).expect("parse"));
    let before = host.document().to_xml_string().expect("write");
    let batch = load(host.document(), &[INCOMING_A]);
    let mut list = SelectionList::from_batch(batch);
    list.select_all();

    orchestrator()
        .run(&mut host, &list.selected_devices())
        .await
        .expect("run");

    let doc = host.document();
    assert_eq!(
        ied_manufacturers(doc),
        vec![
            ("Keep".to_string(), "Other".to_string()),
            ("A".to_string(), "New".to_string()),
        ]
    );
    assert!(doc.find_descendants(doc.root(), "ConnectedAP").is_empty());
    // Emptied containers stay in place
    assert_eq!(doc.find_descendants(doc.root(), "SubNetwork").len(), 1);
    assert!(host.rejections().is_empty());

    // Each event is one undo step
    assert_eq!(host.undo_depth(), 2);
    host.undo().expect("undo insert");
    host.undo().expect("undo removal");
    assert_eq!(host.document().to_xml_string().expect("write"), before);
}

// ============================================================================
// Duplicates inside one batch
// ============================================================================

#[tokio::test]
async fn test_duplicate_in_batch_with_applying_host() {
    let mut host = InMemoryHost::new(SclDocument::parse("<SCL/>").expect("parse"));
    let batch = load(
        host.document(),
        &[
            r#"<SCL><IED name="A" manufacturer="First"/></SCL>"#,
            r#"<SCL><IED name="A" manufacturer="Second"/></SCL>"#,
        ],
    );
    let flags: Vec<bool> = batch.entries().iter().map(|e| e.unique).collect();
    assert_eq!(flags, vec![true, false]);

    let mut list = SelectionList::from_batch(batch);
    list.select_all();
    let report = orchestrator()
        .run(&mut host, &list.selected_devices())
        .await
        .expect("run");

    // The second device finds the first one, already applied, and replaces it
    assert_eq!(report.events_submitted, 3);
    assert_eq!(report.replaced_count(), 1);
    assert_eq!(
        ied_manufacturers(host.document()),
        vec![("A".to_string(), "Second".to_string())]
    );
}

#[tokio::test]
async fn test_duplicate_in_batch_with_deferred_host() {
    let mut host = RecordingHost::new("<SCL/>");
    let batch = load(
        &host.document,
        &[
            r#"<SCL><IED name="A"/></SCL>"#,
            r#"<SCL><IED name="A"/></SCL>"#,
        ],
    );
    let mut list = SelectionList::from_batch(batch);
    list.select_all();

    let report = orchestrator()
        .run(&mut host, &list.selected_devices())
        .await
        .expect("run");

    // Nothing was applied, so neither device replaces the other
    assert_eq!(report.events_submitted, 2);
    assert_eq!(report.replaced_count(), 0);
    assert!(host.events.iter().flatten().all(Edit::is_insert));
}

// ============================================================================
// Absent names
// ============================================================================

#[tokio::test]
async fn test_nameless_candidate_collides_with_nameless_device() {
    let mut host = InMemoryHost::new(
        SclDocument::parse(r#"<SCL><IED manufacturer="Old"/></SCL>"#).expect("parse"),
    );
    let batch = load(host.document(), &[r#"<SCL><IED manufacturer="New"/></SCL>"#]);
    assert!(!batch.entries()[0].unique);
    assert!(batch.entries()[0].device.name().is_absent());

    let mut list = SelectionList::from_batch(batch);
    assert_eq!(list.items()[0].headline(), "<unnamed>");
    list.select_all();
    let report = orchestrator()
        .run(&mut host, &list.selected_devices())
        .await
        .expect("run");

    assert_eq!(report.replaced_count(), 1);
    assert_eq!(
        ied_manufacturers(host.document()),
        vec![("<none>".to_string(), "New".to_string())]
    );
}

#[tokio::test]
async fn test_nameless_replacement_removes_only_unattributed_access_points() {
    let target = r#"<SCL>
  <Communication>
    <SubNetwork name="StationBus">
      <ConnectedAP apName="AP1"/>
      <ConnectedAP iedName="Other" apName="AP1"/>
    </SubNetwork>
  </Communication>
  <IED manufacturer="Old"/>
  <IED name="Other"/>
</SCL>"#;
    let incoming = r#"<SCL><IED manufacturer="New"/></SCL>"#;

    let mut recording = RecordingHost::new(target);
    let batch = load(&recording.document, &[incoming]);
    let mut list = SelectionList::from_batch(batch);
    list.select_all();
    let report = orchestrator()
        .run(&mut recording, &list.selected_devices())
        .await
        .expect("run");

    let doc = &recording.document;
    let nameless_ied = doc
        .find_child(doc.root(), "IED", "name", None)
        .expect("nameless IED")
        .id();
    let bare_ap = doc.find_descendants(doc.root(), "ConnectedAP")[0].id();
    assert!(recording.events[0].iter().all(Edit::is_remove));
    assert_eq!(
        recording.events[0],
        vec![Edit::remove(nameless_ied), Edit::remove(bare_ap)]
    );
    assert_eq!(
        report.outcomes,
        vec![DeviceOutcome::Imported {
            name: IedName::absent(),
            replaced: true,
            removed_attachments: 1,
        }]
    );

    let mut host = InMemoryHost::new(SclDocument::parse(target).expect("parse"));
    let batch = load(host.document(), &[incoming]);
    let mut list = SelectionList::from_batch(batch);
    list.select_all();
    orchestrator()
        .run(&mut host, &list.selected_devices())
        .await
        .expect("run");

    let doc = host.document();
    let remaining: Vec<_> = doc
        .find_descendants(doc.root(), "ConnectedAP")
        .iter()
        .map(|ap| ap.attribute("iedName").map(str::to_string))
        .collect();
    assert_eq!(remaining, vec![Some("Other".to_string())]);
    assert_eq!(
        ied_manufacturers(doc),
        vec![
            ("Other".to_string(), "<none>".to_string()),
            ("<none>".to_string(), "New".to_string()),
        ]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_target_without_scl_root_is_refused() {
    let mut host = RecordingHost::new("<Other><IED name=\"A\"/></Other>");
    let source = Arc::new(SclDocument::parse(INCOMING_A).expect("parse"));
    let node = source.find_descendants(source.root(), "IED")[0].id();
    let device = CandidateDevice::new(source, node, "a.icd").expect("device");

    let err = orchestrator()
        .run(&mut host, &[device])
        .await
        .expect_err("missing SCL");
    assert_eq!(err, ImportError::MissingScl);
    assert!(host.events.is_empty());
}

#[tokio::test]
async fn test_refusing_inserter_does_not_stop_the_run() {
    let mut host = RecordingHost::new(TARGET);
    let batch = load(
        &host.document,
        &[r#"<SCL><IED name="A"/><IED name="B"/></SCL>"#],
    );
    let mut list = SelectionList::from_batch(batch);
    list.select_all();

    let report = ImportOrchestrator::with_inserter(RefusingInserter)
        .with_spacing(EditSpacing::none())
        .run(&mut host, &list.selected_devices())
        .await
        .expect("run");

    assert_eq!(report.failed_count(), 2);
    assert_eq!(report.events_submitted, 0);
    assert!(host.events.is_empty());
    assert!(matches!(
        &report.outcomes[1],
        DeviceOutcome::Failed { name, .. } if *name == IedName::new("B")
    ));
}

// ============================================================================
// Spacing
// ============================================================================

#[tokio::test]
async fn test_spacing_is_applied_between_devices_only() {
    let mut host = RecordingHost::new("<SCL/>");
    let batch = load(
        &host.document,
        &[r#"<SCL><IED name="A"/><IED name="B"/><IED name="C"/></SCL>"#],
    );
    let devices = SelectionList::from_batch(batch).selected_devices();

    let started = Instant::now();
    let report = ImportOrchestrator::new()
        .with_spacing(EditSpacing::from_millis(40))
        .run(&mut host, &devices)
        .await
        .expect("run");
    let elapsed = started.elapsed();

    assert_eq!(report.imported_count(), 3);
    // Two pauses for three devices, none after the last one
    assert!(elapsed >= Duration::from_millis(80), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(120), "{elapsed:?}");
}

#[tokio::test]
async fn test_communication_section_follows_option() {
    let incoming = r#"<SCL>
      <Communication><SubNetwork name="ProcessBus"><ConnectedAP iedName="N" apName="AP1"/></SubNetwork></Communication>
      <IED name="N"/>
    </SCL>"#;

    for (add, expected) in [(true, 1), (false, 0)] {
        let mut host = InMemoryHost::new(SclDocument::parse("<SCL/>").expect("parse"));
        let batch = load(host.document(), &[incoming]);
        let devices = SelectionList::from_batch(batch).selected_devices();

        orchestrator()
            .with_options(InsertOptions {
                add_communication_section: add,
            })
            .run(&mut host, &devices)
            .await
            .expect("run");

        let doc = host.document();
        assert_eq!(doc.find_descendants(doc.root(), "ConnectedAP").len(), expected);
    }
}
