#![forbid(unsafe_code)]

//! Arena-backed trie of label segments with per-row membership.
//!
//! Nodes live in one `Vec` and children are keyed by segment in a `BTreeMap`, so traversal is
//! lexicographic and deterministic. Label nodes are also indexed by their canonical label; other
//! paths are found by descending one segment at a time. Nodes keep only their own segment, so
//! building a label of `S` segments costs `O(S)`. One root per namespace. The tri-state of a node is always recomputed from membership on read, without
//! recursion.

mod node;
mod state;

pub use node::{Node, NodeIndex};
pub use state::TriState;

use crate::catalog::{LabelCatalog, ResourceRow};
use crate::diff::Snapshot;
use crate::ids::ResourceId;
use crate::path::{LabelPath, LabelPathError, Namespace, decode, write_label};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    InvalidPath(LabelPathError),
    NamespaceMismatch {
        expected: Namespace,
        actual: Namespace,
    },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(err) => write!(f, "{err}"),
            Self::NamespaceMismatch { expected, actual } => {
                write!(f, "namespace mismatch (expected={expected}, actual={actual})")
            }
        }
    }
}

/// A catalog entry that could not be placed in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedLabel {
    pub label: String,
    pub reason: RejectReason,
}

#[derive(Clone, Debug, Default)]
pub struct LabelTree {
    nodes: Vec<Node>,
    roots: BTreeMap<Namespace, NodeIndex>,
    label_index: HashMap<String, NodeIndex>,
    working_set: BTreeSet<ResourceId>,
    rejected: Vec<RejectedLabel>,
}

/// One node visited by [`LabelTree::walk`]. Roots have depth 0.
#[derive(Clone, Copy, Debug)]
pub struct TreeEntry<'a> {
    pub depth: usize,
    pub index: NodeIndex,
    pub node: &'a Node,
}

/// Pre-order traversal over every namespace root and its descendants.
pub struct Walk<'a> {
    tree: &'a LabelTree,
    stack: Vec<(NodeIndex, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = TreeEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, depth) = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[index];
        self.stack
            .extend(node.children().rev().map(|child| (child, depth + 1)));
        Some(TreeEntry { depth, index, node })
    }
}

impl LabelTree {
    pub fn empty(working_set: impl IntoIterator<Item = ResourceId>) -> Self {
        Self {
            working_set: working_set.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Builds the trie for every catalog label and marks, at each terminal node, the rows of
    /// `rows` that currently carry that exact label.
    pub fn build(catalog: &LabelCatalog, rows: &[ResourceRow]) -> Self {
        let mut tree = Self::empty(rows.iter().map(|row| row.id.clone()));

        let mut carriers: HashMap<&str, Vec<&ResourceId>> = HashMap::new();
        for row in rows {
            for label in &row.current_labels {
                carriers.entry(label.as_str()).or_default().push(&row.id);
            }
        }

        for group in catalog.groups.keys() {
            tree.ensure_root(&Namespace::Group(group.clone()));
        }

        for (expected, label) in catalog.entries() {
            let path = match decode(label) {
                Ok(path) => path,
                Err(err) => {
                    tracing::warn!(label = %label, error = %err, "skipping invalid catalog label");
                    tree.rejected.push(RejectedLabel {
                        label: label.to_string(),
                        reason: RejectReason::InvalidPath(err),
                    });
                    continue;
                }
            };
            if path.namespace() != &expected {
                tracing::warn!(
                    label = %label,
                    expected = %expected,
                    actual = %path.namespace(),
                    "skipping catalog label filed under another namespace"
                );
                tree.rejected.push(RejectedLabel {
                    label: label.to_string(),
                    reason: RejectReason::NamespaceMismatch {
                        expected,
                        actual: path.namespace().clone(),
                    },
                });
                continue;
            }

            let index = tree.ensure_path(&path);
            tree.mark_label(index, path.to_label());
            if let Some(ids) = carriers.get(label) {
                tree.nodes[index]
                    .membership
                    .extend(ids.iter().map(|id| (*id).clone()));
            }
        }

        tracing::debug!(
            labels = tree.label_count(),
            nodes = tree.nodes.len(),
            rows = tree.working_set.len(),
            rejected = tree.rejected.len(),
            "label tree built"
        );
        tree
    }

    pub fn working_set(&self) -> &BTreeSet<ResourceId> {
        &self.working_set
    }

    pub fn has_selection(&self) -> bool {
        !self.working_set.is_empty()
    }

    pub fn rejected(&self) -> &[RejectedLabel] {
        &self.rejected
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn lookup(&self, path: &str) -> Option<NodeIndex> {
        if let Some(index) = self.label_index.get(path) {
            return Some(*index);
        }
        decode(path).ok().and_then(|path| self.lookup_path(&path))
    }

    pub fn lookup_path(&self, path: &LabelPath) -> Option<NodeIndex> {
        let mut current = self.root(path.namespace())?;
        for segment in path.segments() {
            current = self.nodes[current].child(segment)?;
        }
        Some(current)
    }

    /// Encoded label of the node at `index` (the namespace root label for roots).
    pub fn path_of(&self, index: NodeIndex) -> String {
        let mut segments = Vec::new();
        let mut current = &self.nodes[index];
        while let Some(parent) = current.parent {
            segments.push(current.segment.as_str());
            current = &self.nodes[parent];
        }
        segments.reverse();
        match &current.namespace {
            Some(namespace) if segments.is_empty() => namespace.root_label(),
            Some(namespace) => write_label(namespace, &segments),
            None => String::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Node> {
        self.lookup(path).map(|index| &self.nodes[index])
    }

    pub fn root(&self, namespace: &Namespace) -> Option<NodeIndex> {
        self.roots.get(namespace).copied()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> + '_ {
        self.roots.keys()
    }

    pub fn contains_label(&self, path: &str) -> bool {
        self.label_index.contains_key(path)
    }

    pub fn membership(&self, path: &str) -> Option<&BTreeSet<ResourceId>> {
        self.label_index
            .get(path)
            .map(|index| &self.nodes[*index].membership)
    }

    pub fn label_count(&self) -> usize {
        self.label_index.len()
    }

    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: self.roots.values().rev().map(|root| (*root, 0)).collect(),
        }
    }

    /// Label nodes in pre-order, with their encoded paths.
    pub fn labels(&self) -> impl Iterator<Item = (String, &Node)> + '_ {
        self.walk()
            .filter(|entry| entry.node.is_label)
            .map(move |entry| (self.path_of(entry.index), entry.node))
    }

    /// Paths of every non-root node that has children.
    pub fn folder_paths(&self) -> Vec<String> {
        self.walk()
            .filter(|entry| !entry.node.is_root() && entry.node.is_folder())
            .map(|entry| self.path_of(entry.index))
            .collect()
    }

    pub fn state(&self, path: &str) -> Option<TriState> {
        self.lookup(path).map(|index| self.node_state(index))
    }

    pub fn namespace_state(&self, namespace: &Namespace) -> Option<TriState> {
        self.root(namespace).map(|index| self.node_state(index))
    }

    /// Derived tri-state: a label's own membership combined with the states of its children.
    pub fn node_state(&self, index: NodeIndex) -> TriState {
        let mut order = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.nodes[current].children());
        }

        // Children follow their parent in `order`, so a reverse pass sees them first.
        let mut states = HashMap::with_capacity(order.len());
        for &current in order.iter().rev() {
            let state = self.combine(current, |child| {
                states.get(&child).copied().unwrap_or(TriState::None)
            });
            states.insert(current, state);
        }
        states.get(&index).copied().unwrap_or(TriState::None)
    }

    /// States of every node in one pass, indexed by [`NodeIndex`].
    pub fn states(&self) -> Vec<TriState> {
        let order = self.walk().map(|entry| entry.index).collect::<Vec<_>>();
        let mut states = vec![TriState::None; self.nodes.len()];
        for &current in order.iter().rev() {
            let state = self.combine(current, |child| states[child]);
            states[current] = state;
        }
        states
    }

    fn combine(&self, index: NodeIndex, child_state: impl Fn(NodeIndex) -> TriState) -> TriState {
        let node = &self.nodes[index];
        let own = node
            .is_label
            .then(|| self.membership_state(&node.membership));
        TriState::aggregate(own.into_iter().chain(node.children().map(child_state)))
    }

    fn membership_state(&self, membership: &BTreeSet<ResourceId>) -> TriState {
        let members = membership
            .iter()
            .filter(|id| self.working_set.contains(*id))
            .count();
        TriState::of_membership(members, self.working_set.len())
    }

    /// Flips the label at `path` over the working set: `All -> None`, `None | Partial -> All`.
    ///
    /// No-op (returns `None`) when the path is not a label in this tree or nothing is selected.
    pub fn toggle_leaf(&mut self, path: &LabelPath) -> Option<TriState> {
        if self.working_set.is_empty() {
            return None;
        }
        let index = self.lookup_path(path)?;
        if !self.nodes[index].is_label {
            return None;
        }
        let target = self
            .membership_state(&self.nodes[index].membership)
            .toggled();
        self.set_membership(index, target);
        Some(target)
    }

    /// Applies the folder's own transition to every label at or below `path`.
    pub fn toggle_folder(&mut self, path: &LabelPath) -> Option<TriState> {
        if self.working_set.is_empty() {
            return None;
        }
        let index = self.lookup_path(path)?;
        let labels = self.labels_under(index);
        if labels.is_empty() {
            return None;
        }
        let target = self.node_state(index).toggled();
        for label in labels {
            self.set_membership(label, target);
        }
        Some(target)
    }

    /// Adds a label that is not in the catalog yet, carried by the whole working set.
    pub fn insert_new_label(&mut self, path: &LabelPath) -> NodeIndex {
        let index = self.ensure_path(path);
        self.mark_label(index, path.to_label());
        self.set_membership(index, TriState::All);
        index
    }

    /// Resets every label's membership to the snapshot; snapshot paths missing from the tree are
    /// re-created.
    pub(crate) fn restore_from(&mut self, snapshot: &Snapshot) {
        for (path, index) in &self.label_index {
            self.nodes[*index].membership = snapshot.membership(path).cloned().unwrap_or_default();
        }
        for (label, members) in snapshot.iter() {
            if self.contains_label(label) {
                continue;
            }
            let Ok(path) = decode(label) else {
                continue;
            };
            let index = self.ensure_path(&path);
            self.mark_label(index, label.to_string());
            self.nodes[index].membership = members.clone();
        }
    }

    fn mark_label(&mut self, index: NodeIndex, label: String) {
        self.nodes[index].is_label = true;
        self.label_index.insert(label, index);
    }

    fn set_membership(&mut self, index: NodeIndex, target: TriState) {
        let working_set = &self.working_set;
        let node = &mut self.nodes[index];
        match target {
            TriState::All => node.membership.extend(working_set.iter().cloned()),
            TriState::None => node.membership.retain(|id| !working_set.contains(id)),
            TriState::Partial => {}
        }
    }

    fn labels_under(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if node.is_label {
                out.push(current);
            }
            stack.extend(node.children());
        }
        out
    }

    fn ensure_root(&mut self, namespace: &Namespace) -> NodeIndex {
        if let Some(root) = self.roots.get(namespace) {
            return *root;
        }
        let index = self.nodes.len();
        self.nodes.push(Node::root(namespace.clone()));
        self.roots.insert(namespace.clone(), index);
        index
    }

    fn ensure_path(&mut self, path: &LabelPath) -> NodeIndex {
        let mut current = self.ensure_root(path.namespace());
        for segment in path.segments() {
            current = match self.nodes[current].child(segment) {
                Some(child) => child,
                None => {
                    let index = self.nodes.len();
                    self.nodes.push(Node::new(segment.clone(), current));
                    self.nodes[current].children.insert(segment.clone(), index);
                    index
                }
            };
        }
        current
    }
}
