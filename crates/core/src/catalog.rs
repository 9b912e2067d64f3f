#![forbid(unsafe_code)]

use crate::ids::{GroupId, ResourceId};
use crate::path::Namespace;
use std::collections::BTreeMap;

/// Every label visible to one actor: user labels plus the labels of each group the actor belongs
/// to. Entries are full encoded labels (`infra.prod`, `$ops.infra.prod`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelCatalog {
    pub user: Vec<String>,
    pub groups: BTreeMap<GroupId, Vec<String>>,
}

impl LabelCatalog {
    pub fn new(user: Vec<String>) -> Self {
        Self {
            user,
            groups: BTreeMap::new(),
        }
    }

    pub fn with_group(mut self, group: GroupId, labels: Vec<String>) -> Self {
        self.groups.entry(group).or_default().extend(labels);
        self
    }

    /// Every entry paired with the namespace its partition expects.
    pub fn entries(&self) -> impl Iterator<Item = (Namespace, &str)> + '_ {
        let user = self
            .user
            .iter()
            .map(|label| (Namespace::User, label.as_str()));
        let groups = self.groups.iter().flat_map(|(group, labels)| {
            labels
                .iter()
                .map(move |label| (Namespace::Group(group.clone()), label.as_str()))
        });
        user.chain(groups)
    }

    pub fn len(&self) -> usize {
        self.user.len() + self.groups.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A selected resource as observed when the editing session started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRow {
    pub id: ResourceId,
    pub current_labels: Vec<String>,
}

impl ResourceRow {
    pub fn new(id: ResourceId, current_labels: Vec<String>) -> Self {
        Self { id, current_labels }
    }

    pub fn carries(&self, label: &str) -> bool {
        self.current_labels.iter().any(|current| current == label)
    }
}
