use super::*;
use crate::apply::MutationError;
use std::sync::Mutex;

#[derive(Default)]
struct Backend {
    created: Mutex<Vec<String>>,
    fail_create: bool,
}

impl LabelBackend for Backend {
    fn assign_label(&self, _: &ResourceId, _: &str) -> Result<(), MutationError> {
        Ok(())
    }

    fn unassign_label(&self, _: &ResourceId, _: &str) -> Result<(), MutationError> {
        Ok(())
    }

    fn create_label(&self, label: &str) -> Result<(), MutationError> {
        if self.fail_create {
            return Err(MutationError::new("quota exceeded"));
        }
        self.created.lock().unwrap().push(label.to_string());
        Ok(())
    }
}

fn session(rows: &[ResourceRow]) -> EditSession {
    let catalog = LabelCatalog::new(vec!["infra.prod".to_string(), "infra.dev".to_string()]);
    EditSession::new(catalog, rows)
}

fn row(id: u64, labels: &[&str]) -> ResourceRow {
    ResourceRow::new(
        ResourceId::from(id),
        labels.iter().map(|l| l.to_string()).collect(),
    )
}

#[test]
fn phase_follows_edits_and_commits() {
    let mut session = session(&[row(1, &["infra.prod"]), row(2, &[])]);
    assert_eq!(session.phase(), SessionPhase::Clean);

    session.toggle_leaf("infra.dev").unwrap();
    assert_eq!(session.phase(), SessionPhase::Dirty);

    let plan = session.begin_apply().unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(session.phase(), SessionPhase::Applying);
    assert!(session.applying_labels());

    let report = plan.dispatch(&Backend::default(), 4);
    session.finish_apply(&report).unwrap();
    assert_eq!(session.phase(), SessionPhase::Clean);
    assert!(!session.applying_labels());
}

#[test]
fn edits_are_refused_while_applying() {
    let mut session = session(&[row(1, &[])]);
    session.toggle_leaf("infra.dev").unwrap();
    session.begin_apply().unwrap();

    assert_eq!(
        session.toggle_leaf("infra.dev").unwrap_err(),
        EditError::ApplyInProgress
    );
    assert_eq!(
        session.toggle_folder("infra").unwrap_err(),
        EditError::ApplyInProgress
    );
    assert_eq!(
        session.reset_initial_state().unwrap_err(),
        EditError::ApplyInProgress
    );
    assert_eq!(
        session.begin_apply().unwrap_err(),
        EditError::ApplyInProgress
    );
    assert_eq!(
        session
            .create_label(&Backend::default(), "x")
            .unwrap_err(),
        CreateLabelError::ApplyInProgress
    );
    assert_eq!(
        session.set_working_set(&[row(9, &[])]).unwrap_err(),
        EditError::ApplyInProgress
    );
}

#[test]
fn finish_without_begin_is_an_error() {
    let mut session = session(&[row(1, &[])]);
    assert_eq!(
        session.finish_apply(&ApplyReport::default()).unwrap_err(),
        EditError::NotApplying
    );
}

#[test]
fn invalid_paths_are_rejected_before_touching_the_tree() {
    let mut session = session(&[row(1, &[])]);
    assert!(matches!(
        session.toggle_leaf("infra..prod"),
        Err(EditError::InvalidPath(_))
    ));

    let backend = Backend::default();
    assert!(matches!(
        session.create_label(&backend, ".bad"),
        Err(CreateLabelError::InvalidPath(_))
    ));
    assert!(backend.created.lock().unwrap().is_empty());
    assert_eq!(session.phase(), SessionPhase::Clean);
}

#[test]
fn reset_discards_uncommitted_toggles() {
    let mut session = session(&[row(1, &["infra.prod"]), row(2, &[])]);
    session.toggle_folder("infra").unwrap();
    assert!(session.is_modified());

    session.reset_initial_state().unwrap();
    assert!(!session.is_modified());
    assert_eq!(session.state("infra.prod"), Some(TriState::Partial));
    assert_eq!(session.state("infra.dev"), Some(TriState::None));
}

#[test]
fn created_label_survives_reset_with_no_carriers() {
    let mut session = session(&[row(1, &[]), row(2, &[])]);
    let backend = Backend::default();
    session.create_label(&backend, "infra.staging").unwrap();
    assert_eq!(session.state("infra.staging"), Some(TriState::All));
    assert_eq!(session.phase(), SessionPhase::Dirty);
    assert_eq!(backend.created.lock().unwrap().as_slice(), ["infra.staging"]);
    assert!(session.catalog().user.contains(&"infra.staging".to_string()));

    session.reset_initial_state().unwrap();
    assert!(session.tree().contains_label("infra.staging"));
    assert_eq!(session.state("infra.staging"), Some(TriState::None));
    assert_eq!(session.phase(), SessionPhase::Clean);
}

#[test]
fn working_set_change_rebuilds_and_drops_edits() {
    let mut session = session(&[row(1, &["infra.prod"]), row(2, &[])]);
    assert_eq!(
        session
            .set_working_set(&[row(2, &[]), row(1, &["infra.prod"])])
            .unwrap(),
        WorkingSetChange::Unchanged
    );

    session.toggle_leaf("infra.prod").unwrap();
    let change = session.set_working_set(&[row(3, &["infra.dev"])]).unwrap();
    assert_eq!(change, WorkingSetChange::Rebuilt { dropped_edits: true });
    assert!(!session.is_modified());
    assert_eq!(session.state("infra.dev"), Some(TriState::All));
    assert_eq!(session.state("infra.prod"), Some(TriState::None));

    let change = session.set_working_set(&[]).unwrap();
    assert_eq!(change, WorkingSetChange::Rebuilt { dropped_edits: false });
    assert!(!session.has_selection());
}

#[test]
fn expansion_is_independent_of_selection() {
    let mut session = session(&[row(1, &[])]);
    assert!(session.toggle_expanded("infra"));
    assert!(session.expansion().is_expanded("infra"));
    assert!(!session.toggle_expanded("infra"));

    session.set_expanded_all(true);
    assert_eq!(session.expansion().expanded().collect::<Vec<_>>(), ["infra"]);
    session.set_expanded_all(false);
    assert_eq!(session.expansion().expanded().count(), 0);
    assert_eq!(session.phase(), SessionPhase::Clean);
}

#[test]
fn filter_receives_modified_paths() {
    #[derive(Default)]
    struct Sink(Vec<(String, Vec<String>)>);
    impl TableFilter for Sink {
        fn set_table_filter(&mut self, column_id: &str, values: Vec<String>) {
            self.0.push((column_id.to_string(), values));
        }
    }

    let mut session = session(&[row(1, &[])]);
    session.toggle_leaf("infra.prod").unwrap();
    let mut sink = Sink::default();
    let values = session.apply_filter(&mut sink);
    assert_eq!(values, vec!["infra.prod".to_string()]);
    assert_eq!(
        sink.0,
        vec![(LABELS_COLUMN.to_string(), vec!["infra.prod".to_string()])]
    );
}
