#![forbid(unsafe_code)]

use lt_core::{ApplyReport, EditSession, ModifiedPath, MutationFailure, RejectedLabel, TriState};
use serde_json::{Value, json};

pub(super) fn state_str(state: Option<TriState>) -> Value {
    match state {
        Some(state) => Value::String(state.as_str().to_string()),
        None => Value::Null,
    }
}

/// Pre-order node list. A node is visible when every folder above it is expanded; namespace
/// roots are always visible and always show their children.
pub(super) fn tree_nodes(session: &EditSession) -> Vec<Value> {
    let tree = session.tree();
    let expansion = session.expansion();
    let mut open: Vec<bool> = Vec::new();
    let mut nodes = Vec::new();
    let states = tree.states();

    for entry in tree.walk() {
        let node = entry.node;
        let path = tree.path_of(entry.index);
        let visible = entry.depth == 0 || open.get(entry.depth - 1).copied().unwrap_or(false);
        let expanded = node.is_root() || expansion.is_expanded(&path);
        open.truncate(entry.depth);
        open.push(visible && expanded);

        nodes.push(json!({
            "path": path,
            "segment": node.segment(),
            "depth": entry.depth,
            "state": states[entry.index].as_str(),
            "is_label": node.is_label(),
            "is_folder": node.is_folder(),
            "is_root": node.is_root(),
            "expanded": expanded,
            "visible": visible,
        }));
    }
    nodes
}

pub(super) fn modified_paths(diff: &[ModifiedPath]) -> Vec<Value> {
    diff.iter()
        .map(|modified| {
            json!({
                "path": modified.path,
                "rows_added": modified.rows_added.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                "rows_removed": modified.rows_removed.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect()
}

pub(super) fn failure(failure: &MutationFailure) -> Value {
    json!({
        "kind": failure.kind.as_str(),
        "label": failure.label,
        "resource": failure.resource.as_ref().map(|id| id.as_str()),
        "error": failure.error.message(),
    })
}

pub(super) fn apply_report(report: &ApplyReport) -> Value {
    json!({
        "applied": report.applied.len(),
        "failed": report.failures.len(),
        "failures": report.failures.iter().map(failure).collect::<Vec<_>>(),
    })
}

pub(super) fn rejected(rejected: &[RejectedLabel]) -> Vec<Value> {
    rejected
        .iter()
        .map(|entry| json!({ "label": entry.label, "reason": entry.reason.to_string() }))
        .collect()
}
