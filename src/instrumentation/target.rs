use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use serde::{Deserialize, Serialize};

use super::Frame;

/// Opaque identity of an attached target. Stable for the target's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        TargetId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, writer: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(writer, "{}", self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        TargetId::new(id)
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        TargetId(id)
    }
}

/// A JavaScript execution context living in a target, used to give
/// partitions friendly names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub origin: String,
    pub name: String,
}

impl ExecutionContext {
    pub fn new(origin: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            name: name.into(),
        }
    }
}

/// The queries a synchronization engine makes against the target it indexes.
///
/// Events don't flow through this trait; they come in through an
/// [`EventHub`][super::EventHub] subscription.
pub trait Target {
    fn id(&self) -> &TargetId;

    /// Human readable name, used to tell partitions of secondary targets
    /// apart from the page's.
    fn name(&self) -> &str;

    /// Whether this is the primary page target, as opposed to a worker or
    /// other secondary target.
    fn is_page(&self) -> bool;

    /// Live execution contexts, in the order the runtime reports them.
    fn execution_contexts(&self) -> Vec<ExecutionContext>;

    /// A snapshot of the current frame tree, if the target has loaded one.
    fn main_frame(&self) -> Option<Frame>;

    /// Whether the target exposes a script feed.
    fn has_script_feed(&self) -> bool;

    /// Whether the target exposes a stylesheet feed.
    fn has_style_sheet_feed(&self) -> bool;

    /// Whether every target known to the host is currently suspended.
    fn all_targets_suspended(&self) -> bool;
}

/// Host-wide suspension flag, shared by every target of one host.
#[derive(Debug, Clone, Default)]
pub struct SuspendState(Arc<AtomicBool>);

impl SuspendState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suspend(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn all_suspended(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A `Target` whose state is set by hand. Used by scenario replays and
/// tests in place of a live instrumentation backend.
#[derive(Debug)]
pub struct HostTarget {
    id: TargetId,
    name: String,
    is_page: bool,
    has_script_feed: bool,
    has_style_sheet_feed: bool,
    suspend_state: SuspendState,
    state: Mutex<HostTargetState>,
}

#[derive(Debug, Default)]
struct HostTargetState {
    main_frame: Option<Frame>,
    execution_contexts: Vec<ExecutionContext>,
}

impl HostTarget {
    /// Creates a page target with both script and stylesheet feeds.
    pub fn new(id: impl Into<TargetId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_page: true,
            has_script_feed: true,
            has_style_sheet_feed: true,
            suspend_state: SuspendState::new(),
            state: Mutex::new(HostTargetState::default()),
        }
    }

    pub fn secondary(self) -> Self {
        Self {
            is_page: false,
            ..self
        }
    }

    pub fn without_script_feed(self) -> Self {
        Self {
            has_script_feed: false,
            ..self
        }
    }

    pub fn without_style_sheet_feed(self) -> Self {
        Self {
            has_style_sheet_feed: false,
            ..self
        }
    }

    pub fn with_suspend_state(self, suspend_state: SuspendState) -> Self {
        Self {
            suspend_state,
            ..self
        }
    }

    pub fn with_main_frame(self, frame: Frame) -> Self {
        self.set_main_frame(Some(frame));
        self
    }

    pub fn with_execution_context(self, context: ExecutionContext) -> Self {
        self.state.lock().unwrap().execution_contexts.push(context);
        self
    }

    pub fn set_main_frame(&self, frame: Option<Frame>) {
        self.state.lock().unwrap().main_frame = frame;
    }

    pub fn set_execution_contexts(&self, contexts: Vec<ExecutionContext>) {
        self.state.lock().unwrap().execution_contexts = contexts;
    }

    pub fn suspend_state(&self) -> &SuspendState {
        &self.suspend_state
    }
}

impl Target for HostTarget {
    fn id(&self) -> &TargetId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_page(&self) -> bool {
        self.is_page
    }

    fn execution_contexts(&self) -> Vec<ExecutionContext> {
        self.state.lock().unwrap().execution_contexts.clone()
    }

    fn main_frame(&self) -> Option<Frame> {
        self.state.lock().unwrap().main_frame.clone()
    }

    fn has_script_feed(&self) -> bool {
        self.has_script_feed
    }

    fn has_style_sheet_feed(&self) -> bool {
        self.has_style_sheet_feed
    }

    fn all_targets_suspended(&self) -> bool {
        self.suspend_state.all_suspended()
    }
}
