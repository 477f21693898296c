//! Per-target registry of origin-scoped partitions.
//!
//! Every indexed URL belongs to exactly one partition, picked by the URL's
//! origin and whether it came from a content script. Partitions are created
//! the first time something is mapped into them and only ever go away all at
//! once, when the registry is reset.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use serde::Serialize;

use crate::{
    content::ContentSource,
    instrumentation::{ResourceType, Target, TargetId},
    url::{join_path, split_url, ParsedUrl},
    workspace::{EntryId, Workspace},
};

/// Identifies a partition across every target in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, writer: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(writer, "{}", self.0)
    }
}

/// Computes the key of the partition holding `partition_url` for a target.
pub fn partition_key(
    target: &TargetId,
    partition_url: &str,
    is_content_script: bool,
) -> PartitionKey {
    let content_scripts = if is_content_script {
        "contentscripts:"
    } else {
        ""
    };

    PartitionKey(format!("{}:{}{}", target, content_scripts, partition_url))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PartitionKind {
    Network,
    ContentScripts,
}

/// One origin-scoped namespace of the project tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub key: PartitionKey,
    pub url: String,
    pub display_name: String,
    pub kind: PartitionKind,
    pub target: TargetId,
}

impl Partition {
    pub fn target_id(&self) -> &TargetId {
        &self.target
    }
}

/// What the registry remembers about each entry it created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub id: EntryId,
    pub url: String,
    pub partition: PartitionKey,
    pub parent_path: String,
    pub name: String,
    pub content_type: ResourceType,
    pub is_content_script: bool,
}

impl EntryRecord {
    pub fn path(&self) -> String {
        join_path(&self.parent_path, &self.name)
    }
}

pub struct PartitionRegistry {
    target: Arc<dyn Target>,
    partitions: BTreeMap<PartitionKey, Partition>,

    /// Side tables for entries created through this registry. The workspace
    /// owns the entries themselves.
    entries: HashMap<EntryId, EntryRecord>,
    url_to_entry: HashMap<String, EntryId>,
    path_to_entry: HashMap<(PartitionKey, String), EntryId>,
}

impl PartitionRegistry {
    pub fn new(target: Arc<dyn Target>) -> Self {
        Self {
            target,
            partitions: BTreeMap::new(),
            entries: HashMap::new(),
            url_to_entry: HashMap::new(),
            path_to_entry: HashMap::new(),
        }
    }

    pub fn target_id(&self) -> &TargetId {
        self.target.id()
    }

    /// Returns the partition for the given URL and content-script flag,
    /// creating and registering it with the workspace if it doesn't exist.
    pub fn partition_for(
        &mut self,
        partition_url: &str,
        is_content_script: bool,
        workspace: &mut dyn Workspace,
    ) -> &Partition {
        let key = partition_key(self.target.id(), partition_url, is_content_script);

        if !self.partitions.contains_key(&key) {
            let partition = Partition {
                key: key.clone(),
                url: partition_url.to_owned(),
                display_name: display_name_for(self.target.as_ref(), partition_url),
                kind: if is_content_script {
                    PartitionKind::ContentScripts
                } else {
                    PartitionKind::Network
                },
                target: self.target.id().clone(),
            };

            log::debug!(
                "Created partition {} ({:?}, \"{}\")",
                partition.key,
                partition.kind,
                partition.display_name
            );

            workspace.add_partition(&partition);
            self.partitions.insert(key.clone(), partition);
        }

        &self.partitions[&key]
    }

    /// Maps `url` into its partition and creates a workspace entry for it.
    ///
    /// Callers are expected to have already checked that the URL isn't
    /// mapped anywhere in the workspace.
    pub fn add_entry(
        &mut self,
        url: &str,
        content: ContentSource,
        is_content_script: bool,
        content_type: ResourceType,
        workspace: &mut dyn Workspace,
    ) -> EntryId {
        let parts = split_url(url);
        let key = self
            .partition_for(&parts.partition_url, is_content_script, workspace)
            .key
            .clone();

        let path = parts.path();
        let displaced = self.path_to_entry.get(&(key.clone(), path.clone())).copied();

        if let Some(displaced) = displaced {
            log::warn!(
                "{} replaces an existing entry at {} in partition {}",
                url,
                path,
                key
            );
            self.forget_entry(displaced);
        }

        let id = workspace.add_entry(&key, &parts.parent_path, &parts.name, url, content);

        log::trace!("Added entry {} for {} in partition {}", id, url, key);

        if let Some(previous) = self.url_to_entry.insert(url.to_owned(), id) {
            self.forget_entry(previous);
        }
        self.path_to_entry.insert((key.clone(), path), id);

        self.entries.insert(
            id,
            EntryRecord {
                id,
                url: url.to_owned(),
                partition: key,
                parent_path: parts.parent_path,
                name: parts.name,
                content_type,
                is_content_script,
            },
        );

        id
    }

    /// Removes the entry for `url` from its network partition. Does nothing if
    /// that partition doesn't exist or holds nothing at the URL's path.
    pub fn remove_entry_for_url(
        &mut self,
        url: &str,
        workspace: &mut dyn Workspace,
    ) -> Option<EntryId> {
        let parts = split_url(url);
        let key = partition_key(self.target.id(), &parts.partition_url, false);

        if !self.partitions.contains_key(&key) {
            log::trace!("No partition {} to remove {} from", key, url);
            return None;
        }

        let removed = workspace.remove_entry(&key, &parts.path());

        if let Some(id) = removed {
            log::trace!("Removed entry {} for {}", id, url);
            self.forget_entry(id);
        }

        removed
    }

    /// Clears every partition in the workspace and forgets all of them.
    pub fn reset_all(&mut self, workspace: &mut dyn Workspace) {
        for key in self.partitions.keys() {
            let removed = workspace.reset_partition(key);
            log::trace!("Reset partition {} ({} entries)", key, removed.len());
        }

        self.partitions.clear();
        self.entries.clear();
        self.url_to_entry.clear();
        self.path_to_entry.clear();
    }

    pub fn partition(&self, key: &PartitionKey) -> Option<&Partition> {
        self.partitions.get(key)
    }

    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn entry(&self, id: EntryId) -> Option<&EntryRecord> {
        self.entries.get(&id)
    }

    pub fn entry_for_url(&self, url: &str) -> Option<&EntryRecord> {
        self.url_to_entry
            .get(url)
            .and_then(|id| self.entries.get(id))
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn content_type_for_entry(&self, id: EntryId) -> Option<ResourceType> {
        self.entries.get(&id).map(|record| record.content_type)
    }

    fn forget_entry(&mut self, id: EntryId) {
        if let Some(record) = self.entries.remove(&id) {
            if self.url_to_entry.get(&record.url) == Some(&id) {
                self.url_to_entry.remove(&record.url);
            }

            let path_key = (record.partition.clone(), record.path());
            if self.path_to_entry.get(&path_key) == Some(&id) {
                self.path_to_entry.remove(&path_key);
            }
        }
    }
}

/// Picks the label a partition is shown under.
///
/// An execution context whose origin prefixes the URL lends its name.
/// Otherwise the label is the URL's `host[:port]`, or the raw URL if it has
/// none, or "(no domain)" if it's empty. Partitions of secondary targets get
/// the target's name appended.
pub fn display_name_for(target: &dyn Target, partition_url: &str) -> String {
    for context in target.execution_contexts() {
        if !context.origin.is_empty() && partition_url.starts_with(&context.origin) {
            return context.name;
        }
    }

    let target_suffix = if target.is_page() {
        String::new()
    } else {
        format!(" \u{2014} {}", target.name())
    };

    if partition_url.is_empty() {
        return format!("(no domain){}", target_suffix);
    }

    let parsed = ParsedUrl::parse(partition_url);
    let pretty_url = if parsed.is_valid {
        parsed.host_and_port()
    } else {
        String::new()
    };

    if pretty_url.is_empty() {
        format!("{}{}", partition_url, target_suffix)
    } else {
        format!("{}{}", pretty_url, target_suffix)
    }
}
