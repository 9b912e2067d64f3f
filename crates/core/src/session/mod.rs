#![forbid(unsafe_code)]

//! One batch label edit over a fixed multi-selection of resources.
//!
//! Lifecycle: `Clean -> Dirty` on the first effective toggle, `Dirty -> Applying` on
//! [`EditSession::begin_apply`], `Applying -> Clean` on [`EditSession::finish_apply`] when every
//! call succeeded. Calls that failed stay in the diff, so a partially failed apply lands in
//! `Dirty`.

mod error;

pub use error::{CreateLabelError, EditError};

use crate::apply::{
    ApplyPlan, ApplyReport, DEFAULT_MAX_IN_FLIGHT, LabelBackend, MutationFailure, MutationKind,
    RowChange,
};
use crate::catalog::{LabelCatalog, ResourceRow};
use crate::diff::{ModifiedPath, Snapshot, compute_diff, is_modified};
use crate::expansion::Expansion;
use crate::filter::{LABELS_COLUMN, TableFilter};
use crate::ids::ResourceId;
use crate::path::decode;
use crate::tree::{LabelTree, TriState};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on concurrently running mutation calls during an apply.
    pub max_in_flight: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Clean,
    Dirty,
    Applying,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Applying => "applying",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkingSetChange {
    Unchanged,
    /// The selection differs: tree and snapshot were rebuilt and any pending edits discarded.
    Rebuilt { dropped_edits: bool },
}

#[derive(Clone, Debug)]
pub struct EditSession {
    catalog: LabelCatalog,
    tree: LabelTree,
    snapshot: Snapshot,
    expansion: Expansion,
    applying: Option<ApplyPlan>,
    config: SessionConfig,
}

impl EditSession {
    pub fn new(catalog: LabelCatalog, rows: &[ResourceRow]) -> Self {
        Self::with_config(catalog, rows, SessionConfig::default())
    }

    pub fn with_config(catalog: LabelCatalog, rows: &[ResourceRow], config: SessionConfig) -> Self {
        let tree = LabelTree::build(&catalog, rows);
        let snapshot = Snapshot::capture(&tree);
        Self {
            catalog,
            tree,
            snapshot,
            expansion: Expansion::default(),
            applying: None,
            config,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    pub fn tree(&self) -> &LabelTree {
        &self.tree
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    pub fn working_set(&self) -> &BTreeSet<ResourceId> {
        self.tree.working_set()
    }

    pub fn has_selection(&self) -> bool {
        self.tree.has_selection()
    }

    pub fn state(&self, path: &str) -> Option<TriState> {
        self.tree.state(path)
    }

    pub fn phase(&self) -> SessionPhase {
        if self.applying.is_some() {
            SessionPhase::Applying
        } else if self.is_modified() {
            SessionPhase::Dirty
        } else {
            SessionPhase::Clean
        }
    }

    /// Advisory flag for callers that disable editing while an apply is outstanding.
    pub fn applying_labels(&self) -> bool {
        self.applying.is_some()
    }

    pub fn is_modified(&self) -> bool {
        is_modified(&self.tree, &self.snapshot)
    }

    pub fn get_modified_paths(&self) -> Vec<ModifiedPath> {
        compute_diff(&self.tree, &self.snapshot)
    }

    pub fn toggle_leaf(&mut self, path: &str) -> Result<Option<TriState>, EditError> {
        self.ensure_editable()?;
        let path = decode(path)?;
        Ok(self.tree.toggle_leaf(&path))
    }

    pub fn toggle_folder(&mut self, path: &str) -> Result<Option<TriState>, EditError> {
        self.ensure_editable()?;
        let path = decode(path)?;
        Ok(self.tree.toggle_folder(&path))
    }

    /// Creates `label` in the backend catalog, then adds it to the tree carried by every selected
    /// row. Nothing changes locally unless the backend confirmed the creation.
    pub fn create_label<B: LabelBackend + ?Sized>(
        &mut self,
        backend: &B,
        label: &str,
    ) -> Result<(), CreateLabelError> {
        if self.applying.is_some() {
            return Err(CreateLabelError::ApplyInProgress);
        }
        let path = decode(label)?;
        let label = path.to_label();

        if let Err(error) = backend.create_label(&label) {
            tracing::warn!(label = %label, error = %error, "label creation rejected");
            return Err(CreateLabelError::Mutation(MutationFailure {
                kind: MutationKind::Create,
                label,
                resource: None,
                error,
            }));
        }

        self.tree.insert_new_label(&path);
        self.snapshot.register(&label);
        if let Some(group) = path.namespace().group_id() {
            let entries = self.catalog.groups.entry(group.clone()).or_default();
            if !entries.contains(&label) {
                entries.push(label.clone());
            }
        } else if !self.catalog.user.contains(&label) {
            self.catalog.user.push(label.clone());
        }
        tracing::info!(
            label = %label,
            rows = self.tree.working_set().len(),
            "label created"
        );
        Ok(())
    }

    /// Drops every uncommitted toggle by restoring the tree from the snapshot.
    pub fn reset_initial_state(&mut self) -> Result<(), EditError> {
        self.ensure_editable()?;
        self.tree.restore_from(&self.snapshot);
        Ok(())
    }

    /// Freezes the current diff into a plan and enters `Applying`.
    pub fn begin_apply(&mut self) -> Result<ApplyPlan, EditError> {
        self.ensure_editable()?;
        let plan = ApplyPlan::from_diff(&self.get_modified_paths());
        self.applying = Some(plan.clone());
        Ok(plan)
    }

    /// Advances the snapshot for every confirmed call and leaves `Applying`.
    pub fn finish_apply(&mut self, report: &ApplyReport) -> Result<(), EditError> {
        if self.applying.take().is_none() {
            return Err(EditError::NotApplying);
        }
        for mutation in &report.applied {
            match mutation.kind {
                RowChange::Assign => self
                    .snapshot
                    .record_assigned(&mutation.label, &mutation.resource),
                RowChange::Unassign => self
                    .snapshot
                    .record_unassigned(&mutation.label, &mutation.resource),
            }
        }
        if !report.failures.is_empty() {
            tracing::warn!(
                failed = report.failures.len(),
                "some label mutations failed; they stay pending"
            );
        }
        Ok(())
    }

    /// Runs the whole commit: plan, concurrent dispatch, reconciliation. Always returns the
    /// per-call report once every call has settled.
    pub fn apply_labels<B: LabelBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<ApplyReport, EditError> {
        let plan = self.begin_apply()?;
        let report = plan.dispatch(backend, self.config.max_in_flight);
        self.finish_apply(&report)?;
        Ok(report)
    }

    /// Points the session at a new multi-selection. A different set of rows rebuilds everything
    /// from the catalog; edits made for the previous selection are not carried over.
    pub fn set_working_set(&mut self, rows: &[ResourceRow]) -> Result<WorkingSetChange, EditError> {
        self.ensure_editable()?;
        let ids = rows
            .iter()
            .map(|row| row.id.clone())
            .collect::<BTreeSet<_>>();
        if &ids == self.tree.working_set() {
            return Ok(WorkingSetChange::Unchanged);
        }

        let dropped_edits = self.is_modified();
        if dropped_edits {
            tracing::warn!(
                rows = ids.len(),
                "selection changed with uncommitted label edits; discarding them"
            );
        } else {
            tracing::debug!(rows = ids.len(), "selection changed; rebuilding label tree");
        }
        self.rebuild(rows);
        Ok(WorkingSetChange::Rebuilt { dropped_edits })
    }

    /// Full reload with a fresh catalog and fresh row observations.
    pub fn reload(&mut self, catalog: LabelCatalog, rows: &[ResourceRow]) -> Result<(), EditError> {
        self.ensure_editable()?;
        self.catalog = catalog;
        self.rebuild(rows);
        Ok(())
    }

    pub fn toggle_expanded(&mut self, path: &str) -> bool {
        self.expansion.toggle_expanded(path)
    }

    pub fn set_expanded_all(&mut self, expanded: bool) {
        self.expansion.set_expanded_all(&self.tree, expanded);
    }

    /// Pushes the modified label paths into the hosting table's filter and returns them.
    pub fn apply_filter(&self, sink: &mut dyn TableFilter) -> Vec<String> {
        let values = self
            .get_modified_paths()
            .into_iter()
            .map(|modified| modified.path)
            .collect::<Vec<_>>();
        sink.set_table_filter(LABELS_COLUMN, values.clone());
        values
    }

    fn ensure_editable(&self) -> Result<(), EditError> {
        if self.applying.is_some() {
            return Err(EditError::ApplyInProgress);
        }
        Ok(())
    }

    fn rebuild(&mut self, rows: &[ResourceRow]) {
        self.tree = LabelTree::build(&self.catalog, rows);
        self.snapshot = Snapshot::capture(&self.tree);
    }
}

#[cfg(test)]
mod tests;
