//! The storage side of the project tree.
//!
//! Engines never own the tree they populate. They describe mutations through
//! the `Workspace` trait, and the workspace is also where the URL
//! de-duplication index lives, since every engine shares it.

mod memory;
mod path_map;

use std::fmt;

use serde::Serialize;

use crate::{
    content::ContentSource,
    partition::{Partition, PartitionKey},
};

pub use memory::{MemoryWorkspace, StoredEntry};
pub use path_map::{parent_path, PathMap};

/// Handle to an entry in a workspace. Unique for the workspace's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn new(id: u64) -> Self {
        EntryId(id)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, writer: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(writer, "entry-{}", self.0)
    }
}

pub trait Workspace {
    /// Registers a newly created partition.
    fn add_partition(&mut self, partition: &Partition);

    /// Adds a file-like entry at `parent_path/name` inside a partition.
    fn add_entry(
        &mut self,
        partition: &PartitionKey,
        parent_path: &str,
        name: &str,
        url: &str,
        content: ContentSource,
    ) -> EntryId;

    /// Removes the entry at `path` inside a partition, if there is one.
    fn remove_entry(&mut self, partition: &PartitionKey, path: &str) -> Option<EntryId>;

    /// Removes every entry of a partition and the partition itself.
    fn reset_partition(&mut self, partition: &PartitionKey) -> Vec<EntryId>;

    /// Whether any partition of any target already holds an entry for `url`.
    fn has_entry_for_url(&self, url: &str) -> bool;
}
