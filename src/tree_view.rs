//! Utility that turns a workspace into a plain, serializable tree so that it
//! can be printed or compared in tests.
//!
//! Entry IDs depend on the order things were added in, so they are left out.

use serde::Serialize;

use crate::{
    instrumentation::{ResourceType, TargetId},
    partition::{PartitionKey, PartitionKind},
    workspace::MemoryWorkspace,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    pub partitions: Vec<PartitionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionView {
    pub key: PartitionKey,
    pub url: String,
    pub display_name: String,
    pub kind: Option<PartitionKind>,
    pub target: Option<TargetId>,

    /// An entry whose URL has no path, like `http://a.com/`, sits on the
    /// partition root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryView>,

    pub children: Vec<NodeView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryView>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub url: String,
    pub content_type: ResourceType,
}

impl WorkspaceView {
    /// Every indexed URL, in tree order.
    pub fn urls(&self) -> Vec<&str> {
        fn collect<'a>(nodes: &'a [NodeView], urls: &mut Vec<&'a str>) {
            for node in nodes {
                if let Some(entry) = &node.entry {
                    urls.push(&entry.url);
                }
                collect(&node.children, urls);
            }
        }

        let mut urls = Vec::new();
        for partition in &self.partitions {
            if let Some(entry) = &partition.entry {
                urls.push(entry.url.as_str());
            }
            collect(&partition.children, &mut urls);
        }
        urls
    }
}

pub fn view_workspace(workspace: &MemoryWorkspace) -> WorkspaceView {
    let partitions = workspace
        .partition_keys()
        .map(|key| {
            let info = workspace.partition(key);

            PartitionView {
                key: key.clone(),
                url: info.map(|info| info.url.clone()).unwrap_or_default(),
                display_name: info
                    .map(|info| info.display_name.clone())
                    .unwrap_or_default(),
                kind: info.map(|info| info.kind),
                target: info.map(|info| info.target.clone()),
                entry: extract_entry_view(workspace, key, ""),
                children: extract_children(workspace, key, ""),
            }
        })
        .collect();

    WorkspaceView { partitions }
}

fn extract_children(workspace: &MemoryWorkspace, key: &PartitionKey, path: &str) -> Vec<NodeView> {
    workspace
        .children(key, path)
        .into_iter()
        .map(|child| extract_node_view(workspace, key, child))
        .collect()
}

fn extract_node_view(workspace: &MemoryWorkspace, key: &PartitionKey, path: &str) -> NodeView {
    let name = match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    };

    NodeView {
        name: name.to_owned(),
        entry: extract_entry_view(workspace, key, path),
        children: extract_children(workspace, key, path),
    }
}

fn extract_entry_view(
    workspace: &MemoryWorkspace,
    key: &PartitionKey,
    path: &str,
) -> Option<EntryView> {
    workspace.entry_at(key, path).map(|entry| EntryView {
        url: entry.url.clone(),
        content_type: entry.content.content_type(),
    })
}
