//! Integration tests for import sessions loaded from files

use std::fs;
use std::path::PathBuf;

use iedimport_core::edit::{DocumentHost, InMemoryHost};
use iedimport_core::error::ImportError;
use iedimport_core::import::{
    CandidateLoader, EditSpacing, ImportOrchestrator, ImportSession, ParseFailurePolicy,
};
use iedimport_core::scl::{IedName, SclDocument};
use tempfile::TempDir;

const TARGET: &str = r#"<SCL version="2007">
  <IED name="Existing" manufacturer="Old"/>
</SCL>"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write input");
    path
}

fn host() -> InMemoryHost {
    InMemoryHost::new(SclDocument::parse(TARGET).expect("parse target"))
}

fn orchestrator() -> ImportOrchestrator {
    ImportOrchestrator::new().with_spacing(EditSpacing::none())
}

#[tokio::test]
async fn test_open_marks_collisions_and_preselects_unique() {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![
        write_file(
            &dir,
            "first.icd",
            r#"<SCL><IED name="Existing"/><IED name="New" manufacturer="Vendor" type="Relay"/></SCL>"#,
        ),
        write_file(&dir, "second.cid", r#"<SCL><IED name="New"/></SCL>"#),
    ];
    let host = host();

    let session = ImportSession::open(&host, &CandidateLoader::new(), &paths)
        .await
        .expect("open")
        .expect("session");

    let selection = session.selection();
    let unique: Vec<bool> = selection.items().iter().map(|item| item.unique).collect();
    assert_eq!(unique, vec![false, true, false]);
    assert_eq!(selection.selected_count(), 1);
    assert_eq!(selection.items()[1].description.primary, "Vendor - Relay");
    assert_eq!(selection.summary(), "Devices: 3, Selected: 1, Conflicts: 2");
    assert!(session.skipped().is_empty());
}

#[tokio::test]
async fn test_confirm_with_override_replaces_existing() {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![write_file(
        &dir,
        "device.iid",
        r#"<SCL><IED name="Existing" manufacturer="Updated"/></SCL>"#,
    )];
    let mut host = host();

    let mut session = ImportSession::open(&host, &CandidateLoader::new(), &paths)
        .await
        .expect("open")
        .expect("session");
    assert_eq!(session.selection().selected_count(), 0);
    assert_eq!(
        session
            .selection_mut()
            .select_named(&IedName::new("Existing"), true),
        1
    );

    let report = session
        .confirm(&mut host, &orchestrator())
        .await
        .expect("confirm");

    assert_eq!(report.replaced_count(), 1);
    assert_eq!(host.events_received(), 2);
    let root = host.document().root_element();
    let ieds: Vec<_> = root.children_named("IED").collect();
    assert_eq!(ieds.len(), 1);
    assert_eq!(ieds[0].attribute("manufacturer"), Some("Updated"));
}

#[tokio::test]
async fn test_dismiss_leaves_document_untouched() {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![write_file(&dir, "device.scd", r#"<SCL><IED name="Other"/></SCL>"#)];
    let host = host();
    let before = host.document().to_xml_string().expect("write");

    let session = ImportSession::open(&host, &CandidateLoader::new(), &paths)
        .await
        .expect("open")
        .expect("session");
    assert_eq!(session.selection().selected_count(), 1);
    session.dismiss();

    assert_eq!(host.events_received(), 0);
    assert_eq!(host.edit_count(), 0);
    assert_eq!(host.document().to_xml_string().expect("write"), before);
}

#[tokio::test]
async fn test_confirm_after_external_change_rechecks_document() {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![write_file(&dir, "device.icd", r#"<SCL><IED name="Late"/></SCL>"#)];
    let mut host = host();

    let session = ImportSession::open(&host, &CandidateLoader::new(), &paths)
        .await
        .expect("open")
        .expect("session");
    assert_eq!(session.edit_count_at_load(), 0);
    assert!(session.selection().items()[0].unique);

    // Another edit adds a device with the same name after the picklist was built
    let late = SclDocument::parse(r#"<SCL><IED name="Late" manufacturer="Elsewhere"/></SCL>"#)
        .expect("parse");
    let fragment = late.find_descendants(late.root(), "IED")[0].to_fragment();
    let root = host.document().root();
    host.apply(&[iedimport_core::Edit::insert(root, None, fragment)])
        .expect("apply");

    let report = session
        .confirm(&mut host, &orchestrator())
        .await
        .expect("confirm");

    assert_eq!(report.replaced_count(), 1);
    let root = host.document().root_element();
    assert_eq!(root.children_named("IED").count(), 2);
    assert!(
        root.children_named("IED")
            .all(|ied| ied.attribute("manufacturer") != Some("Elsewhere"))
    );
}

#[tokio::test]
async fn test_skip_policy_reports_bad_files() {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![
        write_file(&dir, "broken.icd", "<SCL><IED name=\"A\">"),
        write_file(&dir, "notes.txt", "<SCL/>"),
        write_file(&dir, "good.icd", r#"<SCL><IED name="B"/></SCL>"#),
        dir.path().join("missing.icd"),
    ];
    let host = host();

    let session = ImportSession::open(&host, &CandidateLoader::new(), &paths)
        .await
        .expect("open")
        .expect("session");

    assert_eq!(session.selection().len(), 1);
    assert_eq!(session.skipped().len(), 3);
    assert!(matches!(
        session.skipped()[1].error,
        ImportError::UnsupportedExtension(_)
    ));
    assert!(matches!(
        session.skipped()[2].error,
        ImportError::FileNotFound(_)
    ));
}

#[tokio::test]
async fn test_abort_policy_fails_open() {
    let dir = TempDir::new().expect("tempdir");
    let paths = vec![
        write_file(&dir, "good.icd", r#"<SCL><IED name="B"/></SCL>"#),
        write_file(&dir, "broken.icd", "<SCL><IED"),
    ];
    let host = host();
    let loader = CandidateLoader::new().with_policy(ParseFailurePolicy::Abort);

    let err = ImportSession::open(&host, &loader, &paths)
        .await
        .expect_err("abort");
    assert!(matches!(err, ImportError::Parse { .. }));
}
