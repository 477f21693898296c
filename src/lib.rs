//! Keeps a partitioned, virtual project tree in sync with the resources a
//! live target loads.
//!
//! Each attached target gets a [`SyncEngine`] that listens to the target's
//! instrumentation feeds through an [`EventHub`](instrumentation::EventHub)
//! and mirrors documents, scripts and stylesheets into a shared
//! [`Workspace`](workspace::Workspace). The [`TargetDirectory`] keeps track
//! of which engine belongs to which target.

pub mod classifier;
pub mod cli;
pub mod content;
pub mod directory;
pub mod engine;
pub mod instrumentation;
pub mod partition;
pub mod replay;
pub mod tree_view;
pub mod url;
pub mod workspace;

mod error;

pub use crate::directory::{DirectoryError, TargetDirectory};
pub use crate::engine::{EngineState, SyncEngine};
pub use crate::error::ErrorDisplay;
