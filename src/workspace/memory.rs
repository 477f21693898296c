use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    content::ContentSource,
    partition::{Partition, PartitionKey},
    url::join_path,
};

use super::{parent_path, EntryId, PathMap, Workspace};

/// An entry as the workspace stores it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    pub id: EntryId,
    pub partition: PartitionKey,
    pub path: String,
    pub url: String,
    pub content: ContentSource,
}

/// A node of a partition's tree. Folders are nodes without an entry; a path
/// can be a file and a folder at the same time.
#[derive(Debug, Default)]
struct Node {
    entry: Option<EntryId>,
}

#[derive(Debug)]
struct MemoryPartition {
    /// None if entries were added before the partition was registered.
    info: Option<Partition>,
    nodes: PathMap<Node>,
}

impl MemoryPartition {
    fn new(info: Option<Partition>) -> Self {
        let mut nodes = PathMap::new();
        nodes.insert("", Node::default());

        Self { info, nodes }
    }
}

/// A `Workspace` that keeps the whole project tree in memory.
#[derive(Debug, Default)]
pub struct MemoryWorkspace {
    next_entry_id: u64,
    partitions: BTreeMap<PartitionKey, MemoryPartition>,
    entries: HashMap<EntryId, StoredEntry>,
    url_index: HashMap<String, EntryId>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, id: EntryId) -> Option<&StoredEntry> {
        self.entries.get(&id)
    }

    pub fn entry_for_url(&self, url: &str) -> Option<&StoredEntry> {
        self.url_index.get(url).and_then(|id| self.entries.get(id))
    }

    pub fn entry_at(&self, partition: &PartitionKey, path: &str) -> Option<&StoredEntry> {
        self.partitions
            .get(partition)
            .and_then(|stored| stored.nodes.get(path))
            .and_then(|node| node.entry)
            .and_then(|id| self.entries.get(&id))
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn partition_keys(&self) -> impl Iterator<Item = &PartitionKey> {
        self.partitions.keys()
    }

    pub fn partition(&self, key: &PartitionKey) -> Option<&Partition> {
        self.partitions
            .get(key)
            .and_then(|stored| stored.info.as_ref())
    }

    /// Paths directly below `path` in a partition, sorted.
    pub fn children(&self, partition: &PartitionKey, path: &str) -> Vec<&str> {
        self.partitions
            .get(partition)
            .and_then(|stored| stored.nodes.children(path))
            .unwrap_or_default()
    }

    /// All entries of a partition, sorted by path.
    pub fn entries_in(&self, partition: &PartitionKey) -> Vec<&StoredEntry> {
        let mut entries: Vec<_> = self
            .entries
            .values()
            .filter(|entry| &entry.partition == partition)
            .collect();

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    fn forget(&mut self, id: EntryId) -> Option<StoredEntry> {
        let entry = self.entries.remove(&id)?;

        if self.url_index.get(&entry.url) == Some(&id) {
            self.url_index.remove(&entry.url);
        }

        Some(entry)
    }
}

impl Workspace for MemoryWorkspace {
    fn add_partition(&mut self, partition: &Partition) {
        self.partitions
            .entry(partition.key.clone())
            .or_insert_with(|| MemoryPartition::new(None))
            .info = Some(partition.clone());
    }

    fn add_entry(
        &mut self,
        partition: &PartitionKey,
        parent: &str,
        name: &str,
        url: &str,
        content: ContentSource,
    ) -> EntryId {
        let id = EntryId::new(self.next_entry_id);
        self.next_entry_id += 1;

        let path = join_path(parent, name);

        let stored = self.partitions.entry(partition.clone()).or_insert_with(|| {
            log::warn!("Entry added to unregistered partition {}", partition);
            MemoryPartition::new(None)
        });

        // Make sure every folder on the way down exists so the new node
        // isn't left as an orphan.
        let mut ancestors = Vec::new();
        let mut current = parent_path(&path);
        while let Some(ancestor) = current {
            if stored.nodes.contains_key(ancestor) {
                break;
            }
            ancestors.push(ancestor.to_owned());
            current = parent_path(ancestor);
        }
        for ancestor in ancestors.into_iter().rev() {
            stored.nodes.insert(ancestor, Node::default());
        }

        let displaced = match stored.nodes.get_mut(&path) {
            Some(node) => node.entry.replace(id),
            None => {
                stored.nodes.insert(path.clone(), Node { entry: Some(id) });
                None
            }
        };

        if let Some(displaced) = displaced {
            log::warn!(
                "Replacing entry {} at {} in partition {}",
                displaced,
                path,
                partition
            );
            self.forget(displaced);
        }

        if let Some(previous) = self.url_index.insert(url.to_owned(), id) {
            log::warn!("{} was already mapped to {}", url, previous);
        }

        self.entries.insert(
            id,
            StoredEntry {
                id,
                partition: partition.clone(),
                path,
                url: url.to_owned(),
                content,
            },
        );

        id
    }

    fn remove_entry(&mut self, partition: &PartitionKey, path: &str) -> Option<EntryId> {
        let stored = self.partitions.get_mut(partition)?;
        let id = stored.nodes.get_mut(path)?.entry.take()?;

        // Prune nodes that no longer hold an entry or children, walking up
        // until something is still in use. The root always stays.
        let mut current = Some(path.to_owned());
        while let Some(node_path) = current {
            if node_path.is_empty() {
                break;
            }

            let in_use = stored
                .nodes
                .get(&node_path)
                .map(|node| node.entry.is_some())
                .unwrap_or(false)
                || stored
                    .nodes
                    .children(&node_path)
                    .map(|children| !children.is_empty())
                    .unwrap_or(false);

            if in_use {
                break;
            }

            stored.nodes.remove(&node_path);
            current = parent_path(&node_path).map(str::to_owned);
        }

        self.forget(id);
        Some(id)
    }

    fn reset_partition(&mut self, partition: &PartitionKey) -> Vec<EntryId> {
        if self.partitions.remove(partition).is_none() {
            return Vec::new();
        }

        let mut removed: Vec<EntryId> = self
            .entries
            .values()
            .filter(|entry| &entry.partition == partition)
            .map(|entry| entry.id)
            .collect();
        removed.sort();

        for id in &removed {
            self.forget(*id);
        }

        removed
    }

    fn has_entry_for_url(&self, url: &str) -> bool {
        self.url_index.contains_key(url)
    }
}
