use std::collections::{BTreeSet, HashMap};

use log::warn;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PathMapNode<T> {
    value: T,
    children: BTreeSet<String>,
}

/// A map from `/`-separated relative paths to another type, like entry IDs,
/// with a bit of additional data that enables listing and removing a path and
/// all of its child paths quickly.
///
/// The empty string is the root path. `a/b` is the child of `a`, which is the
/// child of the root.
#[derive(Debug, Serialize)]
pub struct PathMap<T> {
    nodes: HashMap<String, PathMapNode<T>>,

    /// Contains the set of all paths whose parent either does not exist, or is
    /// not present in the PathMap.
    ///
    /// Note that these paths may have other _ancestors_ in the tree, but if an
    /// orphan's parent path is ever inserted, it will stop being an orphan.
    orphan_paths: BTreeSet<String>,
}

impl<T> Default for PathMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the parent of a relative path, or None for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }

    match path.rfind('/') {
        Some(index) => Some(&path[..index]),
        None => Some(""),
    }
}

impl<T> PathMap<T> {
    pub fn new() -> PathMap<T> {
        PathMap {
            nodes: HashMap::new(),
            orphan_paths: BTreeSet::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&T> {
        self.nodes.get(path).map(|v| &v.value)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut T> {
        self.nodes.get_mut(path).map(|v| &mut v.value)
    }

    /// Child paths of `path`, sorted.
    pub fn children(&self, path: &str) -> Option<Vec<&str>> {
        self.nodes
            .get(path)
            .map(|v| v.children.iter().map(String::as_str).collect())
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: T) {
        let path = path.into();

        if let Some(node) = self.nodes.get_mut(&path) {
            node.value = value;
            return;
        }

        self.add_to_parent(path.clone());

        // Collect any children that are currently marked as orphaned paths, but
        // are actually children of this new node.
        let mut children = BTreeSet::new();
        for orphan_path in &self.orphan_paths {
            if parent_path(orphan_path) == Some(path.as_str()) {
                children.insert(orphan_path.clone());
            }
        }

        for child in &children {
            self.orphan_paths.remove(child);
        }

        self.nodes.insert(path, PathMapNode { value, children });
    }

    /// Remove the given path and all of its linked descendants, returning all
    /// values stored in the map.
    pub fn remove(&mut self, root_path: &str) -> Vec<(String, T)> {
        self.remove_from_parent(root_path);

        let (root_path, root_node) = match self.nodes.remove_entry(root_path) {
            Some(node) => node,
            None => return Vec::new(),
        };

        let mut removed_entries = vec![(root_path, root_node.value)];
        let mut to_visit: Vec<String> = root_node.children.into_iter().collect();

        while let Some(path) = to_visit.pop() {
            match self.nodes.remove_entry(&path) {
                Some((path, node)) => {
                    removed_entries.push((path, node.value));

                    for child in node.children.into_iter() {
                        to_visit.push(child);
                    }
                }
                None => {
                    warn!(
                        "Consistency issue; tried to remove {} but it was already removed",
                        path
                    );
                }
            }
        }

        removed_entries
    }

    /// Adds the path to its parent if it's present in the tree, or the set of
    /// orphaned paths if it is not.
    fn add_to_parent(&mut self, path: String) {
        if let Some(parent) = parent_path(&path) {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.insert(path);
                return;
            }
        }

        self.orphan_paths.insert(path);
    }

    /// Removes the path from its parent, or from the orphaned paths set if it
    /// has no parent.
    fn remove_from_parent(&mut self, path: &str) {
        if let Some(parent) = parent_path(path) {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.remove(path);
                return;
            }
        }

        self.orphan_paths.remove(path);
    }
}
