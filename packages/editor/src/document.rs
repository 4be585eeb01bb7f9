//! # Document Snapshot
//!
//! A published document paired with the index built from it. Snapshots are
//! immutable; mutations produce a new document that shares every untouched
//! subtree with the old one.

use mindmap_parser::{MindmapDocument, MindmapNode, NodeIndex};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub document: Arc<MindmapDocument>,
    pub index: NodeIndex,
}

impl Snapshot {
    pub fn new(document: Arc<MindmapDocument>) -> Self {
        let index = NodeIndex::build(&document.root);
        Self { document, index }
    }

    /// Look a node up by id
    pub fn node(&self, id: &str) -> Option<&MindmapNode> {
        self.index.resolve(&self.document.root, id)
    }
}

impl From<MindmapDocument> for Snapshot {
    fn from(document: MindmapDocument) -> Self {
        Self::new(Arc::new(document))
    }
}
