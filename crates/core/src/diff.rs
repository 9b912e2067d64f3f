#![forbid(unsafe_code)]

use crate::ids::ResourceId;
use crate::tree::LabelTree;
use std::collections::{BTreeMap, BTreeSet};

/// Baseline membership of every label path, captured when the working set was established.
///
/// Toggles never touch it; it only moves forward when mutations are confirmed by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    membership: BTreeMap<String, BTreeSet<ResourceId>>,
}

impl Snapshot {
    pub fn capture(tree: &LabelTree) -> Self {
        let membership = tree
            .labels()
            .map(|(path, node)| (path, node.membership().clone()))
            .collect();
        Self { membership }
    }

    pub fn membership(&self, path: &str) -> Option<&BTreeSet<ResourceId>> {
        self.membership.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.membership.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<ResourceId>)> + '_ {
        self.membership
            .iter()
            .map(|(path, members)| (path.as_str(), members))
    }

    pub fn len(&self) -> usize {
        self.membership.len()
    }

    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
    }

    /// Makes `path` a known label with no carriers (a freshly created catalog entry).
    pub(crate) fn register(&mut self, path: &str) {
        self.membership.entry(path.to_string()).or_default();
    }

    pub(crate) fn record_assigned(&mut self, path: &str, resource: &ResourceId) {
        self.membership
            .entry(path.to_string())
            .or_default()
            .insert(resource.clone());
    }

    pub(crate) fn record_unassigned(&mut self, path: &str, resource: &ResourceId) {
        if let Some(members) = self.membership.get_mut(path) {
            members.remove(resource);
        }
    }
}

/// Rows gained and lost by one label path relative to the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModifiedPath {
    pub path: String,
    pub rows_added: BTreeSet<ResourceId>,
    pub rows_removed: BTreeSet<ResourceId>,
}

impl ModifiedPath {
    fn between(
        path: &str,
        current: &BTreeSet<ResourceId>,
        baseline: &BTreeSet<ResourceId>,
    ) -> Option<Self> {
        let rows_added = current
            .difference(baseline)
            .cloned()
            .collect::<BTreeSet<_>>();
        let rows_removed = baseline
            .difference(current)
            .cloned()
            .collect::<BTreeSet<_>>();
        if rows_added.is_empty() && rows_removed.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_string(),
            rows_added,
            rows_removed,
        })
    }
}

/// Every label path whose membership differs from the snapshot: tree pre-order first, then
/// snapshot-only paths in lexicographic order. Folder-only nodes are never reported.
pub fn compute_diff(tree: &LabelTree, snapshot: &Snapshot) -> Vec<ModifiedPath> {
    let empty = BTreeSet::new();
    let mut out = Vec::new();
    for (path, node) in tree.labels() {
        let baseline = snapshot.membership(&path).unwrap_or(&empty);
        out.extend(ModifiedPath::between(&path, node.membership(), baseline));
    }
    for (path, baseline) in snapshot.iter() {
        if tree.contains_label(path) {
            continue;
        }
        out.extend(ModifiedPath::between(path, &empty, baseline));
    }
    out
}

/// Whether any label differs from the snapshot. Recomputed on every call.
pub fn is_modified(tree: &LabelTree, snapshot: &Snapshot) -> bool {
    let empty = BTreeSet::new();
    let tree_side = tree.labels().any(|(path, node)| {
        node.membership() != snapshot.membership(&path).unwrap_or(&empty)
    });
    tree_side
        || snapshot
            .iter()
            .any(|(path, baseline)| !tree.contains_label(path) && !baseline.is_empty())
}
