#![forbid(unsafe_code)]

//! Nested label tree engine: namespaced label paths, a tri-state selection trie over a
//! multi-selection of resources, a diff against the session snapshot, and the batch apply
//! protocol that turns that diff into backend mutations.

pub mod apply;
pub mod catalog;
pub mod diff;
pub mod expansion;
pub mod filter;
pub mod ids;
pub mod path;
pub mod session;
pub mod tree;

pub use apply::{
    ApplyPlan, ApplyReport, DEFAULT_MAX_IN_FLIGHT, LabelBackend, Mutation, MutationError,
    MutationFailure, MutationKind, RowChange,
};
pub use catalog::{LabelCatalog, ResourceRow};
pub use diff::{ModifiedPath, Snapshot, compute_diff, is_modified};
pub use expansion::Expansion;
pub use filter::{LABELS_COLUMN, TableFilter};
pub use ids::{GroupId, GroupIdError, ResourceId, ResourceIdError};
pub use path::{LabelPath, LabelPathError, Namespace, decode, encode};
pub use session::{
    CreateLabelError, EditError, EditSession, SessionConfig, SessionPhase, WorkingSetChange,
};
pub use tree::{LabelTree, Node, NodeIndex, RejectReason, RejectedLabel, TreeEntry, TriState};
