//! Node Index - id → position lookups for one document snapshot
//!
//! Built once per published document so that mutations and validation can
//! resolve ids without re-walking the tree. A node's position is its path:
//! the child index taken at each level starting from the root.

use crate::ast::MindmapNode;
use std::collections::HashMap;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Child indices from the root; empty for the root itself
    pub path: Vec<usize>,
    /// Parent node id (`None` for the root)
    pub parent: Option<String>,
    pub depth: usize,
}

/// An id seen again after its first occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    pub id: String,
    pub path: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    entries: HashMap<String, IndexEntry>,
    /// Ids in depth-first pre-order
    order: Vec<String>,
    duplicates: Vec<DuplicateId>,
}

impl NodeIndex {
    /// Index every node below (and including) `root`.
    ///
    /// When an id occurs more than once the first occurrence in pre-order
    /// is indexed and later ones are recorded as duplicates.
    pub fn build(root: &MindmapNode) -> Self {
        let mut index = Self::default();
        let mut stack: Vec<(&MindmapNode, Vec<usize>, Option<&str>)> =
            vec![(root, Vec::new(), None)];

        while let Some((node, path, parent)) = stack.pop() {
            for (i, child) in node.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child.as_ref(), child_path, Some(node.id.as_str())));
            }

            if index.entries.contains_key(&node.id) {
                index.duplicates.push(DuplicateId {
                    id: node.id.clone(),
                    path,
                });
                continue;
            }

            index.order.push(node.id.clone());
            index.entries.insert(
                node.id.clone(),
                IndexEntry {
                    depth: path.len(),
                    path,
                    parent: parent.map(str::to_string),
                },
            );
        }

        tracing::trace!(
            nodes = index.order.len(),
            duplicates = index.duplicates.len(),
            "node index built"
        );
        index
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn path_of(&self, id: &str) -> Option<&[usize]> {
        self.entries.get(id).map(|e| e.path.as_slice())
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.entries.get(id).and_then(|e| e.parent.as_deref())
    }

    /// Resolve an id to the node in `root`'s tree
    pub fn resolve<'a>(&self, root: &'a MindmapNode, id: &str) -> Option<&'a MindmapNode> {
        node_at(root, self.path_of(id)?)
    }

    /// Unique ids in depth-first pre-order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn duplicates(&self) -> &[DuplicateId] {
        &self.duplicates
    }
}

/// Follow `path` from `root`
pub fn node_at<'a>(root: &'a MindmapNode, path: &[usize]) -> Option<&'a MindmapNode> {
    path.iter()
        .try_fold(root, |node, &i| node.children.get(i).map(|c| c.as_ref()))
}

/// Dotted display form of a path: `root.children[2].children[0]`
pub fn display_path(path: &[usize]) -> String {
    let mut out = String::from("root");
    for i in path {
        let _ = write!(out, ".children[{}]", i);
    }
    out
}
