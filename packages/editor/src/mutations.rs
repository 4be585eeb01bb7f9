//! # Tree Mutations
//!
//! Structural edits on a published snapshot. Every operation is a pure
//! function: it takes a [`Snapshot`] and returns a new [`MindmapDocument`],
//! copying only the nodes on the path from the root to the edited node.
//! Everything else is shared with the snapshot through `Arc`.
//!
//! ## Semantics
//!
//! ### AddChild
//! - Appends as the parent's last child
//! - A collapsed parent is expanded so the new child is visible
//!
//! ### AddSibling
//! - Inserts directly after the sibling
//! - The root has no siblings
//!
//! ### UpdateFields / SetCustomField / AddTag / ToggleCollapse
//! - Change the one node and stamp its `updatedAt`
//!
//! ### RemoveTag
//! - An index past the end of the tags is a no-op
//!
//! Created nodes (and their descendants) without an id get a generated one,
//! unique against every id in the tree. A supplied id that is already taken
//! is rejected.

use crate::clock::Clock;
use crate::document::Snapshot;
use mindmap_parser::{IdGenerator, Link, MindmapDocument, MindmapNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Structural edits, in the form hosts send them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Append a node as the last child of `parent_id`
    #[serde(rename_all = "camelCase")]
    AddChild { parent_id: String, node: MindmapNode },

    /// Insert a node directly after `sibling_id`
    #[serde(rename_all = "camelCase")]
    AddSibling { sibling_id: String, node: MindmapNode },

    /// Shallow-merge basic fields
    #[serde(rename_all = "camelCase")]
    UpdateFields { node_id: String, patch: NodePatch },

    #[serde(rename_all = "camelCase")]
    SetCustomField {
        node_id: String,
        name: String,
        value: Value,
    },

    #[serde(rename_all = "camelCase")]
    AddTag { node_id: String, tag: String },

    #[serde(rename_all = "camelCase")]
    RemoveTag { node_id: String, index: usize },

    #[serde(rename_all = "camelCase")]
    ToggleCollapse { node_id: String },
}

/// Fields `UpdateFields` may overwrite.
///
/// Absent fields are left alone. An empty string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Root node cannot have siblings: {0}")]
    RootHasNoSibling(String),

    #[error("Node id already exists: {0}")]
    DuplicateId(String),

    #[error("No document has been published yet")]
    NoDocument,

    #[error("The current text does not parse; fix it before editing the tree")]
    TextHasErrors,
}

impl Mutation {
    /// Id of the node the mutation targets
    pub fn target(&self) -> &str {
        match self {
            Mutation::AddChild { parent_id, .. } => parent_id,
            Mutation::AddSibling { sibling_id, .. } => sibling_id,
            Mutation::UpdateFields { node_id, .. }
            | Mutation::SetCustomField { node_id, .. }
            | Mutation::AddTag { node_id, .. }
            | Mutation::RemoveTag { node_id, .. }
            | Mutation::ToggleCollapse { node_id } => node_id,
        }
    }

    /// Apply to `snapshot`, producing the edited document
    pub fn apply(&self, snapshot: &Snapshot, clock: &dyn Clock) -> Result<MindmapDocument, MutationError> {
        match self {
            Mutation::AddChild { parent_id, node } => add_child(snapshot, parent_id, node.clone(), clock),
            Mutation::AddSibling { sibling_id, node } => {
                add_sibling(snapshot, sibling_id, node.clone(), clock)
            }
            Mutation::UpdateFields { node_id, patch } => update_fields(snapshot, node_id, patch, clock),
            Mutation::SetCustomField {
                node_id,
                name,
                value,
            } => set_custom_field(snapshot, node_id, name, value.clone(), clock),
            Mutation::AddTag { node_id, tag } => add_tag(snapshot, node_id, tag, clock),
            Mutation::RemoveTag { node_id, index } => remove_tag(snapshot, node_id, *index, clock),
            Mutation::ToggleCollapse { node_id } => toggle_collapse(snapshot, node_id, clock),
        }
    }
}

pub fn add_child(
    snapshot: &Snapshot,
    parent_id: &str,
    node: MindmapNode,
    clock: &dyn Clock,
) -> Result<MindmapDocument, MutationError> {
    let parent_path = snapshot
        .index
        .path_of(parent_id)
        .ok_or_else(|| MutationError::NodeNotFound(parent_id.to_string()))?;
    let node = prepare_new_node(snapshot, node, clock)?;

    edit_at(snapshot, parent_path, parent_id, |parent| {
        parent.collapsed = false;
        parent.children.push(Arc::new(node));
    })
}

pub fn add_sibling(
    snapshot: &Snapshot,
    sibling_id: &str,
    node: MindmapNode,
    clock: &dyn Clock,
) -> Result<MindmapDocument, MutationError> {
    let path = snapshot
        .index
        .path_of(sibling_id)
        .ok_or_else(|| MutationError::NodeNotFound(sibling_id.to_string()))?;
    let Some((&position, parent_path)) = path.split_last() else {
        return Err(MutationError::RootHasNoSibling(sibling_id.to_string()));
    };
    let node = prepare_new_node(snapshot, node, clock)?;

    edit_at(snapshot, parent_path, sibling_id, |parent| {
        parent.children.insert(position + 1, Arc::new(node));
    })
}

pub fn update_fields(
    snapshot: &Snapshot,
    node_id: &str,
    patch: &NodePatch,
    clock: &dyn Clock,
) -> Result<MindmapDocument, MutationError> {
    edit_node(snapshot, node_id, clock, |node| {
        if let Some(title) = &patch.title {
            node.title = title.clone();
        }
        merge_optional(&mut node.description, &patch.description);
        merge_optional(&mut node.priority, &patch.priority);
        merge_optional(&mut node.status, &patch.status);
        merge_optional(&mut node.deadline, &patch.deadline);
        if let Some(links) = &patch.links {
            node.links = links.clone();
        }
    })
}

pub fn set_custom_field(
    snapshot: &Snapshot,
    node_id: &str,
    name: &str,
    value: Value,
    clock: &dyn Clock,
) -> Result<MindmapDocument, MutationError> {
    edit_node(snapshot, node_id, clock, |node| {
        node.custom_fields.insert(name.to_string(), value);
    })
}

/// Append a tag; the same tag may be added more than once
pub fn add_tag(
    snapshot: &Snapshot,
    node_id: &str,
    tag: &str,
    clock: &dyn Clock,
) -> Result<MindmapDocument, MutationError> {
    edit_node(snapshot, node_id, clock, |node| node.tags.push(tag.to_string()))
}

pub fn remove_tag(
    snapshot: &Snapshot,
    node_id: &str,
    index: usize,
    clock: &dyn Clock,
) -> Result<MindmapDocument, MutationError> {
    let node = snapshot
        .node(node_id)
        .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
    if index >= node.tags.len() {
        return Ok(snapshot.document.as_ref().clone());
    }

    edit_node(snapshot, node_id, clock, |node| {
        node.tags.remove(index);
    })
}

pub fn toggle_collapse(
    snapshot: &Snapshot,
    node_id: &str,
    clock: &dyn Clock,
) -> Result<MindmapDocument, MutationError> {
    edit_node(snapshot, node_id, clock, |node| node.collapsed = !node.collapsed)
}

fn merge_optional(field: &mut Option<String>, patch: &Option<String>) {
    match patch.as_deref() {
        Some("") => *field = None,
        Some(value) => *field = Some(value.to_string()),
        None => {}
    }
}

/// Edit one node and stamp its `updatedAt`
fn edit_node(
    snapshot: &Snapshot,
    node_id: &str,
    clock: &dyn Clock,
    edit: impl FnOnce(&mut MindmapNode),
) -> Result<MindmapDocument, MutationError> {
    let path = snapshot
        .index
        .path_of(node_id)
        .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
    let stamp = clock.timestamp();

    edit_at(snapshot, path, node_id, |node| {
        edit(node);
        node.updated_at = Some(stamp);
    })
}

/// Copy the nodes along `path` and run `edit` on the last one
fn edit_at(
    snapshot: &Snapshot,
    path: &[usize],
    node_id: &str,
    edit: impl FnOnce(&mut MindmapNode),
) -> Result<MindmapDocument, MutationError> {
    let mut document = snapshot.document.as_ref().clone();
    let node = node_mut(&mut document.root, path)
        .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
    edit(node);
    Ok(document)
}

fn node_mut<'a>(root: &'a mut Arc<MindmapNode>, path: &[usize]) -> Option<&'a mut MindmapNode> {
    path.iter().try_fold(Arc::make_mut(root), |node, &i| {
        node.children.get_mut(i).map(Arc::make_mut)
    })
}

/// Give ids and timestamps to a node about to enter the tree
fn prepare_new_node(
    snapshot: &Snapshot,
    mut node: MindmapNode,
    clock: &dyn Clock,
) -> Result<MindmapNode, MutationError> {
    let mut supplied = HashSet::new();
    collect_supplied_ids(&node, &mut supplied, snapshot)?;

    let document = &snapshot.document;
    let mut ids = IdGenerator::new(&document.title, &document.root.id);
    let stamp = clock.timestamp();
    fill_new_node(&mut node, &mut ids, &mut supplied, snapshot, &stamp);

    Ok(node)
}

fn collect_supplied_ids(
    node: &MindmapNode,
    seen: &mut HashSet<String>,
    snapshot: &Snapshot,
) -> Result<(), MutationError> {
    if !needs_id(node) && (snapshot.index.contains(&node.id) || !seen.insert(node.id.clone())) {
        return Err(MutationError::DuplicateId(node.id.clone()));
    }
    for child in &node.children {
        collect_supplied_ids(child, seen, snapshot)?;
    }
    Ok(())
}

/// Blank ids do not survive a parse, so they count as missing
fn needs_id(node: &MindmapNode) -> bool {
    node.id.trim().is_empty()
}

fn fill_new_node(
    node: &mut MindmapNode,
    ids: &mut IdGenerator,
    taken: &mut HashSet<String>,
    snapshot: &Snapshot,
    stamp: &str,
) {
    if needs_id(node) {
        node.id = ids.next_unique(|candidate| snapshot.index.contains(candidate) || taken.contains(candidate));
        taken.insert(node.id.clone());
    }
    if node.created_at.is_none() {
        node.created_at = Some(stamp.to_string());
    }
    if node.updated_at.is_none() {
        node.updated_at = Some(stamp.to_string());
    }

    for child in node.children.iter_mut() {
        fill_new_node(Arc::make_mut(child), ids, taken, snapshot, stamp);
    }
}
