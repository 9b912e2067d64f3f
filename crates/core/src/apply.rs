#![forbid(unsafe_code)]

use crate::diff::ModifiedPath;
use crate::ids::ResourceId;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// Remote mutation primitives the session drives. Calls may run concurrently from scoped threads.
pub trait LabelBackend: Sync {
    fn assign_label(&self, resource: &ResourceId, label: &str) -> Result<(), MutationError>;

    fn unassign_label(&self, resource: &ResourceId, label: &str) -> Result<(), MutationError>;

    fn create_label(&self, label: &str) -> Result<(), MutationError>;
}

/// A rejected remote call, as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationError {
    message: String,
}

impl MutationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for MutationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for MutationError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MutationKind {
    Assign,
    Unassign,
    Create,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Unassign => "unassign",
            Self::Create => "create",
        }
    }
}

/// The per-row calls an apply plan is made of. Label creation never goes through a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowChange {
    Assign,
    Unassign,
}

impl From<RowChange> for MutationKind {
    fn from(value: RowChange) -> Self {
        match value {
            RowChange::Assign => Self::Assign,
            RowChange::Unassign => Self::Unassign,
        }
    }
}

/// One assign or unassign call for a single (label, resource) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation {
    pub kind: RowChange,
    pub label: String,
    pub resource: ResourceId,
}

impl Mutation {
    fn run<B: LabelBackend + ?Sized>(&self, backend: &B) -> Result<(), MutationError> {
        match self.kind {
            RowChange::Assign => backend.assign_label(&self.resource, &self.label),
            RowChange::Unassign => backend.unassign_label(&self.resource, &self.label),
        }
    }
}

/// A failed call, kept per row and per path so callers can report each one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationFailure {
    pub kind: MutationKind,
    pub label: String,
    pub resource: Option<ResourceId>,
    pub error: MutationError,
}

impl std::fmt::Display for MutationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.resource {
            Some(resource) => write!(
                f,
                "{} {} on {resource} failed: {}",
                self.kind.as_str(),
                self.label,
                self.error
            ),
            None => write!(
                f,
                "{} {} failed: {}",
                self.kind.as_str(),
                self.label,
                self.error
            ),
        }
    }
}

impl std::error::Error for MutationFailure {}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyPlan {
    mutations: Vec<Mutation>,
}

impl ApplyPlan {
    /// One assign per added row and one unassign per removed row, in diff order.
    pub fn from_diff(diff: &[ModifiedPath]) -> Self {
        let mut mutations = Vec::new();
        for modified in diff {
            mutations.extend(modified.rows_added.iter().map(|resource| Mutation {
                kind: RowChange::Assign,
                label: modified.path.clone(),
                resource: resource.clone(),
            }));
            mutations.extend(modified.rows_removed.iter().map(|resource| Mutation {
                kind: RowChange::Unassign,
                label: modified.path.clone(),
                resource: resource.clone(),
            }));
        }
        Self { mutations }
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Runs every mutation concurrently, at most `max_in_flight` at once, and waits for all of
    /// them. A failed (or panicking) call is recorded and never cancels its siblings.
    pub fn dispatch<B: LabelBackend + ?Sized>(
        &self,
        backend: &B,
        max_in_flight: usize,
    ) -> ApplyReport {
        let width = max_in_flight.max(1);
        let mut report = ApplyReport::default();
        tracing::debug!(mutations = self.mutations.len(), width, "dispatching label mutations");

        for wave in self.mutations.chunks(width) {
            std::thread::scope(|scope| {
                let handles = wave
                    .iter()
                    .map(|mutation| scope.spawn(move || mutation.run(backend)))
                    .collect::<Vec<_>>();
                for (mutation, handle) in wave.iter().zip(handles) {
                    let outcome = handle
                        .join()
                        .unwrap_or_else(|_| Err(MutationError::new("mutation call panicked")));
                    match outcome {
                        Ok(()) => report.applied.push(mutation.clone()),
                        Err(error) => {
                            tracing::warn!(
                                kind = MutationKind::from(mutation.kind).as_str(),
                                label = %mutation.label,
                                resource = %mutation.resource,
                                error = %error,
                                "label mutation failed"
                            );
                            report.failures.push(MutationFailure {
                                kind: mutation.kind.into(),
                                label: mutation.label.clone(),
                                resource: Some(mutation.resource.clone()),
                                error,
                            });
                        }
                    }
                }
            });
        }

        tracing::info!(
            applied = report.applied.len(),
            failed = report.failures.len(),
            "label mutations settled"
        );
        report
    }
}

/// Outcome of one apply: which calls went through and which were rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: Vec<Mutation>,
    pub failures: Vec<MutationFailure>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
