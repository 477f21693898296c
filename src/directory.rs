use std::{collections::BTreeMap, sync::Arc};

use thiserror::Error;

use crate::{
    engine::SyncEngine,
    instrumentation::{EventHub, ResourceType, Target, TargetId},
    workspace::{EntryId, Workspace},
};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("target {target} is already attached")]
    AlreadyAttached { target: TargetId },
}

/// Owns one `SyncEngine` per attached target.
#[derive(Default)]
pub struct TargetDirectory {
    engines: BTreeMap<TargetId, SyncEngine>,
}

impl TargetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a new engine to `target`. An existing engine for the same
    /// target is left alone.
    pub fn create(
        &mut self,
        target: Arc<dyn Target>,
        hub: &mut EventHub,
    ) -> Result<&mut SyncEngine, DirectoryError> {
        let id = target.id().clone();

        if self.engines.contains_key(&id) {
            return Err(DirectoryError::AlreadyAttached { target: id });
        }

        let engine = SyncEngine::attach(target, hub);
        Ok(self.engines.entry(id).or_insert(engine))
    }

    pub fn lookup(&self, target: &TargetId) -> Option<&SyncEngine> {
        self.engines.get(target)
    }

    pub fn lookup_mut(&mut self, target: &TargetId) -> Option<&mut SyncEngine> {
        self.engines.get_mut(target)
    }

    /// Disposes of the target's engine and forgets it. Returns false if the
    /// target wasn't attached.
    pub fn dispose(
        &mut self,
        target: &TargetId,
        hub: &mut EventHub,
        workspace: &mut dyn Workspace,
    ) -> bool {
        match self.engines.remove(target) {
            Some(mut engine) => {
                engine.dispose(hub, workspace);
                true
            }
            None => false,
        }
    }

    /// Pumps every engine's queue, in target order. Returns the total number
    /// of events handled.
    pub fn process_events(&mut self, workspace: &mut dyn Workspace) -> usize {
        self.engines
            .values_mut()
            .map(|engine| engine.process_events(workspace))
            .sum()
    }

    pub fn target_for_entry(&self, entry: EntryId) -> Option<&TargetId> {
        self.engines
            .iter()
            .find(|(_, engine)| engine.registry().entry(entry).is_some())
            .map(|(id, _)| id)
    }

    pub fn content_type_for_entry(&self, entry: EntryId) -> Option<ResourceType> {
        self.engines
            .values()
            .find_map(|engine| engine.registry().content_type_for_entry(entry))
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetId> {
        self.engines.keys()
    }

    pub fn engines(&self) -> impl Iterator<Item = &SyncEngine> {
        self.engines.values()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
