//! Scripted sessions: a JSON description of targets and the events they
//! raise, played back against a real hub, directory and workspace.
//!
//! Scenario files look like this:
//!
//! ```json
//! {
//!   "targets": [{ "id": "page", "name": "Page", "mainFrame": { "url": "http://a.com/" } }],
//!   "steps": [
//!     { "step": "attach", "target": "page" },
//!     { "step": "emit", "target": "page", "event": { "event": "scriptParsed", "data": { "sourceUrl": "http://a.com/app.js" } } },
//!     { "step": "process" }
//!   ]
//! }
//! ```
//!
//! Queued events are only handled on `process` steps and once more after the
//! last step.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    directory::{DirectoryError, TargetDirectory},
    engine::EngineState,
    instrumentation::{
        EventHub, ExecutionContext, Frame, HostTarget, SourceEvent, SuspendState, Target,
        TargetId,
    },
    tree_view::{view_workspace, WorkspaceView},
    workspace::MemoryWorkspace,
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("could not read scenario at path {}", .path.display())]
    Io { source: io::Error, path: PathBuf },

    #[error("malformed scenario file at path {}", .path.display())]
    MalformedScenario {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("malformed scenario JSON")]
    MalformedJson {
        #[from]
        source: serde_json::Error,
    },

    #[error("step {step} refers to unknown target {target}")]
    UnknownTarget { step: usize, target: TargetId },

    #[error("target {target} is declared more than once")]
    DuplicateTarget { target: TargetId },

    #[error(transparent)]
    Directory {
        #[from]
        source: DirectoryError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub targets: Vec<TargetSpec>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_slice(contents: &[u8]) -> Result<Self, ReplayError> {
        Ok(serde_json::from_slice(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let contents = fs::read(path).map_err(|source| ReplayError::Io {
            source,
            path: path.to_owned(),
        })?;

        serde_json::from_slice(&contents).map_err(|source| ReplayError::MalformedScenario {
            source,
            path: path.to_owned(),
        })
    }
}

/// How a scripted target looks before any step runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    pub id: TargetId,
    pub name: String,

    #[serde(default = "default_true")]
    pub page: bool,

    #[serde(default = "default_true")]
    pub script_feed: bool,

    #[serde(default = "default_true")]
    pub style_sheet_feed: bool,

    #[serde(default)]
    pub execution_contexts: Vec<ExecutionContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_frame: Option<Frame>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Attach {
        target: TargetId,
    },
    Detach {
        target: TargetId,
    },
    Emit {
        target: TargetId,
        event: SourceEvent,
    },

    /// Replaces the target's frame tree and announces the navigation.
    #[serde(rename_all = "camelCase")]
    Navigate {
        target: TargetId,

        #[serde(default)]
        main_frame: Option<Frame>,
    },

    SetExecutionContexts {
        target: TargetId,
        contexts: Vec<ExecutionContext>,
    },
    Suspend,
    Resume,
    Process,
}

/// What a scenario left behind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub tree: WorkspaceView,
    pub targets: Vec<TargetReport>,
    pub entry_count: usize,
    pub events_handled: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    pub id: TargetId,

    /// None once the target has been detached, or if it never was attached.
    pub state: Option<EngineState>,
    pub partitions: usize,
    pub entries: usize,
}

/// Everything a scenario runs against.
pub struct ReplaySession {
    hub: EventHub,
    directory: TargetDirectory,
    workspace: MemoryWorkspace,
    targets: BTreeMap<TargetId, Arc<HostTarget>>,
    suspend_state: SuspendState,
    events_handled: usize,
}

impl ReplaySession {
    pub fn new(specs: &[TargetSpec]) -> Result<Self, ReplayError> {
        let suspend_state = SuspendState::new();
        let mut targets = BTreeMap::new();

        for spec in specs {
            let mut target = HostTarget::new(spec.id.clone(), spec.name.clone())
                .with_suspend_state(suspend_state.clone());

            if !spec.page {
                target = target.secondary();
            }
            if !spec.script_feed {
                target = target.without_script_feed();
            }
            if !spec.style_sheet_feed {
                target = target.without_style_sheet_feed();
            }

            target.set_main_frame(spec.main_frame.clone());
            target.set_execution_contexts(spec.execution_contexts.clone());

            if targets.insert(spec.id.clone(), Arc::new(target)).is_some() {
                return Err(ReplayError::DuplicateTarget {
                    target: spec.id.clone(),
                });
            }
        }

        Ok(Self {
            hub: EventHub::new(),
            directory: TargetDirectory::new(),
            workspace: MemoryWorkspace::new(),
            targets,
            suspend_state,
            events_handled: 0,
        })
    }

    /// Runs one step. `index` is only used for error messages.
    pub fn apply(&mut self, index: usize, step: &Step) -> Result<(), ReplayError> {
        log::trace!("Step {}: {:?}", index, step);

        match step {
            Step::Attach { target } => {
                let target = self.target(index, target)?;
                self.directory.create(target, &mut self.hub)?;
            }
            Step::Detach { target } => {
                if !self
                    .directory
                    .dispose(target, &mut self.hub, &mut self.workspace)
                {
                    log::debug!("Target {} was not attached", target);
                }
            }
            Step::Emit { target, event } => {
                self.host_target(index, target)?;
                self.hub.emit(target, event.clone());
            }
            Step::Navigate { target, main_frame } => {
                self.host_target(index, target)?
                    .set_main_frame(main_frame.clone());
                self.hub.emit(target, SourceEvent::MainFrameNavigated);
            }
            Step::SetExecutionContexts { target, contexts } => {
                self.host_target(index, target)?
                    .set_execution_contexts(contexts.clone());
            }
            Step::Suspend => {
                self.suspend_state.suspend();
                self.hub.broadcast(SourceEvent::SuspendStateChanged);
            }
            Step::Resume => {
                self.suspend_state.resume();
                self.hub.broadcast(SourceEvent::SuspendStateChanged);
            }
            Step::Process => self.process(),
        }

        Ok(())
    }

    pub fn process(&mut self) {
        self.events_handled += self.directory.process_events(&mut self.workspace);
    }

    pub fn report(&self) -> ReplayReport {
        let targets = self
            .targets
            .keys()
            .map(|id| match self.directory.lookup(id) {
                Some(engine) => TargetReport {
                    id: id.clone(),
                    state: Some(engine.state()),
                    partitions: engine.registry().len(),
                    entries: engine.registry().entry_count(),
                },
                None => TargetReport {
                    id: id.clone(),
                    state: None,
                    partitions: 0,
                    entries: 0,
                },
            })
            .collect();

        ReplayReport {
            tree: view_workspace(&self.workspace),
            targets,
            entry_count: self.workspace.entry_count(),
            events_handled: self.events_handled,
        }
    }

    fn host_target(&self, index: usize, id: &TargetId) -> Result<&Arc<HostTarget>, ReplayError> {
        self.targets
            .get(id)
            .ok_or_else(|| ReplayError::UnknownTarget {
                step: index,
                target: id.clone(),
            })
    }

    fn target(&self, index: usize, id: &TargetId) -> Result<Arc<dyn Target>, ReplayError> {
        let target = self.host_target(index, id)?;
        Ok(Arc::clone(target) as Arc<dyn Target>)
    }
}

/// Plays a scenario from start to finish.
pub fn run_scenario(scenario: &Scenario) -> Result<ReplayReport, ReplayError> {
    let mut session = ReplaySession::new(&scenario.targets)?;

    for (index, step) in scenario.steps.iter().enumerate() {
        session.apply(index, step)?;
    }

    session.process();

    Ok(session.report())
}
