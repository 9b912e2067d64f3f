#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError};
use lt_core::{LabelBackend, MutationError, ResourceId};
use std::sync::{Mutex, MutexGuard};

/// Runs session mutations against a store on behalf of one actor. Every call is resolved against
/// that actor's catalog.
///
/// The connection is not shareable across threads, so concurrent calls from an apply dispatch
/// are serialized on the inner mutex.
#[derive(Debug)]
pub struct StoreBackend<'a> {
    store: Mutex<&'a mut SqliteStore>,
    actor: String,
}

impl<'a> StoreBackend<'a> {
    pub fn new(store: &'a mut SqliteStore, actor: impl Into<String>) -> Self {
        Self {
            store: Mutex::new(store),
            actor: actor.into(),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, &'a mut SqliteStore>, MutationError> {
        self.store
            .lock()
            .map_err(|_| MutationError::new("label store lock poisoned"))
    }
}

impl LabelBackend for StoreBackend<'_> {
    fn assign_label(&self, resource: &ResourceId, label: &str) -> Result<(), MutationError> {
        self.store()?
            .assign_label(&self.actor, resource, label)
            .map_err(mutation_error)
    }

    fn unassign_label(&self, resource: &ResourceId, label: &str) -> Result<(), MutationError> {
        self.store()?
            .unassign_label(&self.actor, resource, label)
            .map_err(mutation_error)
    }

    fn create_label(&self, label: &str) -> Result<(), MutationError> {
        self.store()?
            .create_label(&self.actor, label)
            .map(|_| ())
            .map_err(mutation_error)
    }
}

fn mutation_error(err: StoreError) -> MutationError {
    MutationError::new(format!("{}: {err}", err.code()))
}
