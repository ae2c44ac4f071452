use std::collections::BTreeMap;

use serde::Serialize;

use crate::parser::names::ObjectRef;

/// Adjacency from a view to the objects its definition references.
///
/// Children keep the order in which the crawler recorded them, which is the
/// extractor's output order for that view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: BTreeMap<ObjectRef, Vec<ObjectRef>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `child` to `parent`'s ordered children.
    pub fn push_edge(&mut self, parent: &ObjectRef, child: ObjectRef) {
        self.edges.entry(parent.clone()).or_default().push(child);
    }

    /// Direct children of `node`; empty for tables and unknown nodes.
    pub fn children(&self, node: &ObjectRef) -> &[ObjectRef] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when `node` has at least one outgoing edge.
    pub fn has_children(&self, node: &ObjectRef) -> bool {
        !self.children(node).is_empty()
    }

    /// Nodes with outgoing edges, in sorted order.
    pub fn parents(&self) -> impl Iterator<Item = &ObjectRef> {
        self.edges.keys()
    }

    /// Total number of recorded edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
