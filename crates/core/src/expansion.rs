#![forbid(unsafe_code)]

use crate::tree::LabelTree;
use std::collections::BTreeSet;

/// Expanded/collapsed folders of the rendered tree. Has no effect on selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
    expanded: BTreeSet<String>,
}

impl Expansion {
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// Returns the new expanded flag of `path`.
    pub fn toggle_expanded(&mut self, path: &str) -> bool {
        if self.expanded.remove(path) {
            return false;
        }
        self.expanded.insert(path.to_string());
        true
    }

    pub fn set_expanded_all(&mut self, tree: &LabelTree, expanded: bool) {
        self.expanded.clear();
        if expanded {
            self.expanded.extend(tree.folder_paths());
        }
    }

    pub fn expanded(&self) -> impl Iterator<Item = &str> + '_ {
        self.expanded.iter().map(String::as_str)
    }
}
