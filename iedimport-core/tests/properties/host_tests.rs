//! Property-based tests for the in-memory host's history

use iedimport_core::edit::{DocumentHost, Edit, InMemoryHost};
use iedimport_core::scl::{Fragment, NodeId, SclDocument};
use proptest::prelude::*;

const BASE: &str = r#"<SCL><Header id="h"/><Substation name="S"><VoltageLevel name="V"/></Substation><IED name="A"/><DataTypeTemplates/></SCL>"#;

/// One random operation: insert below or remove the element picked by index
#[derive(Debug, Clone)]
enum Op {
    Insert { parent: usize, before_first: bool },
    Remove { target: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), any::<bool>())
            .prop_map(|(parent, before_first)| Op::Insert { parent, before_first }),
        any::<usize>().prop_map(|target| Op::Remove { target }),
    ]
}

fn attached_elements(host: &InMemoryHost) -> Vec<NodeId> {
    let root = host.document().root_element();
    std::iter::once(root.id())
        .chain(root.descendants().into_iter().map(|e| e.id()))
        .collect()
}

fn to_edit(host: &InMemoryHost, op: &Op, step: usize) -> Option<Edit> {
    let elements = attached_elements(host);
    match *op {
        Op::Insert { parent, before_first } => {
            let parent = elements[parent % elements.len()];
            let reference = before_first
                .then(|| host.document().children(parent).first().copied())
                .flatten();
            let node = Fragment::new("Private").with_attribute("step", step.to_string());
            Some(Edit::insert(parent, reference, node))
        }
        Op::Remove { target } => {
            // The root cannot be removed
            let candidates = &elements[1..];
            (!candidates.is_empty()).then(|| Edit::remove(candidates[target % candidates.len()]))
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Undoing every applied event restores the original document, and
    /// redoing them restores the edited one.
    #[test]
    fn prop_undo_restores_original(ops in prop::collection::vec(arb_op(), 0..20)) {
        let mut host = InMemoryHost::new(SclDocument::parse(BASE).expect("parse"));
        let original = host.document().to_xml_string().expect("write");

        let mut applied = 0;
        for (step, op) in ops.iter().enumerate() {
            if let Some(edit) = to_edit(&host, op, step) {
                host.submit(vec![edit]);
                applied += 1;
            }
        }
        prop_assert!(host.rejections().is_empty());
        prop_assert_eq!(host.undo_depth(), applied);
        let edited = host.document().to_xml_string().expect("write");

        while host.undo_depth() > 0 {
            host.undo().expect("undo");
        }
        prop_assert_eq!(host.document().to_xml_string().expect("write"), original);

        while host.redo_depth() > 0 {
            host.redo().expect("redo");
        }
        prop_assert_eq!(host.document().to_xml_string().expect("write"), edited);
    }

    /// A rejected event leaves the document exactly as it was
    #[test]
    fn prop_rejected_event_changes_nothing(ops in prop::collection::vec(arb_op(), 1..8)) {
        let mut host = InMemoryHost::new(SclDocument::parse(BASE).expect("parse"));
        let mut edits: Vec<Edit> = ops
            .iter()
            .enumerate()
            .filter_map(|(step, op)| to_edit(&host, op, step))
            .collect();
        // Removing the root always fails, after the valid edits ran
        edits.push(Edit::remove(host.document().root()));

        let before = host.document().to_xml_string().expect("write");
        let count = host.edit_count();
        host.submit(edits);

        prop_assert_eq!(host.rejections().len(), 1);
        prop_assert_eq!(host.edit_count(), count);
        prop_assert_eq!(host.document().to_xml_string().expect("write"), before);
    }
}
