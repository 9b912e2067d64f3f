#![forbid(unsafe_code)]

use crate::ids::ResourceId;
use crate::path::Namespace;
use std::collections::{BTreeMap, BTreeSet};

/// Index of a node in the tree arena.
pub type NodeIndex = usize;

/// One segment of a label path.
///
/// `membership` is only meaningful when `is_label` is set: it holds the rows that carry the
/// full label ending here. Folder-only nodes keep it empty and derive their state from children.
/// Nodes do not store their encoded path; [`LabelTree::path_of`](super::LabelTree::path_of)
/// rebuilds it from the parent chain.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) segment: String,
    pub(crate) parent: Option<NodeIndex>,
    /// Set on namespace roots only.
    pub(crate) namespace: Option<Namespace>,
    pub(crate) children: BTreeMap<String, NodeIndex>,
    pub(crate) membership: BTreeSet<ResourceId>,
    pub(crate) is_label: bool,
}

impl Node {
    pub(crate) fn new(segment: String, parent: NodeIndex) -> Self {
        Self {
            segment,
            parent: Some(parent),
            namespace: None,
            children: BTreeMap::new(),
            membership: BTreeSet::new(),
            is_label: false,
        }
    }

    pub(crate) fn root(namespace: Namespace) -> Self {
        Self {
            segment: String::new(),
            parent: None,
            namespace: Some(namespace),
            children: BTreeMap::new(),
            membership: BTreeSet::new(),
            is_label: false,
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Children in lexicographic segment order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeIndex> + '_ {
        self.children.values().copied()
    }

    pub fn child(&self, segment: &str) -> Option<NodeIndex> {
        self.children.get(segment).copied()
    }

    pub fn membership(&self) -> &BTreeSet<ResourceId> {
        &self.membership
    }

    pub fn is_label(&self) -> bool {
        self.is_label
    }

    pub fn is_folder(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
