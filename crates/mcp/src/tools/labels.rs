#![forbid(unsafe_code)]

use super::render;
use super::{
    Args, ToggleTarget, ToolResult, optional_bool, require_bool, require_str, require_str_array,
    store_error,
};
use crate::{McpServer, ai_error, ai_error_with, ai_ok, ai_ok_with_warnings, warning};
use lt_core::{
    CreateLabelError, EditError, EditSession, ResourceId, SessionConfig, WorkingSetChange,
};
use lt_storage::StoreBackend;
use serde_json::json;

fn session_mut(server: &mut McpServer) -> Result<&mut EditSession, serde_json::Value> {
    server.session.as_mut().ok_or_else(no_session)
}

fn session_ref(server: &McpServer) -> Result<&EditSession, serde_json::Value> {
    server.session.as_ref().ok_or_else(no_session)
}

fn no_session() -> serde_json::Value {
    ai_error_with(
        "NO_SESSION",
        "no label session is open",
        Some("call labels.open with the selected resource_ids first"),
    )
}

fn edit_error(err: EditError) -> serde_json::Value {
    match err {
        EditError::InvalidPath(path_err) => ai_error("INVALID_LABEL_PATH", &path_err.to_string()),
        EditError::ApplyInProgress => ai_error("APPLY_IN_PROGRESS", &err.to_string()),
        EditError::NotApplying => ai_error("NOT_APPLYING", &err.to_string()),
    }
}

pub(super) fn open(server: &mut McpServer, args: &Args) -> ToolResult {
    let raw_ids = require_str_array(args, "resource_ids")?;
    let ids = raw_ids
        .into_iter()
        .map(|raw| {
            ResourceId::try_new(raw)
                .map_err(|err| ai_error("INVALID_INPUT", &format!("resource_ids: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let reload = optional_bool(args, "reload")?.unwrap_or(false);

    let catalog = server.store.label_catalog(&server.actor).map_err(store_error)?;
    let rows = server.store.resource_rows(&server.actor, &ids).map_err(store_error)?;

    let mut warnings = Vec::new();
    let (rebuilt, dropped_edits) = match server.session.as_mut() {
        None => {
            let config = SessionConfig {
                max_in_flight: server.max_in_flight,
            };
            server.session = Some(EditSession::with_config(catalog, &rows, config));
            (true, false)
        }
        Some(session) => match session.set_working_set(&rows).map_err(edit_error)? {
            WorkingSetChange::Unchanged if reload => {
                let dropped_edits = session.is_modified();
                session.reload(catalog, &rows).map_err(edit_error)?;
                (true, dropped_edits)
            }
            WorkingSetChange::Unchanged => (false, false),
            WorkingSetChange::Rebuilt { dropped_edits } => {
                session.reload(catalog, &rows).map_err(edit_error)?;
                (true, dropped_edits)
            }
        },
    };
    if rebuilt {
        server.table_filter.clear();
    }
    if dropped_edits {
        warnings.push(warning(
            "STALE_WORKING_SET",
            "the label view was rebuilt; uncommitted label edits were discarded",
        ));
    }

    let session = session_ref(server)?;
    Ok(ai_ok_with_warnings(
        "labels.open",
        json!({
            "rows": session.working_set().iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            "labels": session.tree().label_count(),
            "rebuilt": rebuilt,
            "dropped_edits": dropped_edits,
            "rejected": render::rejected(session.tree().rejected()),
            "phase": session.phase().as_str(),
        }),
        warnings,
    ))
}

pub(super) fn state(server: &mut McpServer) -> ToolResult {
    let session = session_ref(server)?;
    Ok(ai_ok(
        "labels.state",
        json!({
            "phase": session.phase().as_str(),
            "modified": session.is_modified(),
            "applying": session.applying_labels(),
            "rows": session.working_set().iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            "nodes": render::tree_nodes(session),
            "table_filter": server.table_filter.to_json(),
        }),
    ))
}

pub(super) fn toggle(server: &mut McpServer, args: &Args, target: ToggleTarget) -> ToolResult {
    let path = require_str(args, "path")?;
    let session = session_mut(server)?;
    let result = match target {
        ToggleTarget::Leaf => session.toggle_leaf(path),
        ToggleTarget::Folder => session.toggle_folder(path),
    };
    let new_state = result.map_err(edit_error)?;
    Ok(ai_ok(
        match target {
            ToggleTarget::Leaf => "labels.toggle",
            ToggleTarget::Folder => "labels.toggle_folder",
        },
        json!({
            "path": path,
            "changed": new_state.is_some(),
            "state": render::state_str(new_state),
            "phase": session.phase().as_str(),
        }),
    ))
}

pub(super) fn create(server: &mut McpServer, args: &Args) -> ToolResult {
    let label = require_str(args, "label")?;
    let session = server.session.as_mut().ok_or_else(no_session)?;
    let backend = StoreBackend::new(&mut server.store, server.actor.as_str());

    match session.create_label(&backend, label) {
        Ok(()) => Ok(ai_ok(
            "labels.create",
            json!({
                "label": label,
                "state": render::state_str(session.state(label)),
                "phase": session.phase().as_str(),
            }),
        )),
        Err(CreateLabelError::InvalidPath(err)) => {
            Err(ai_error("INVALID_LABEL_PATH", &err.to_string()))
        }
        Err(CreateLabelError::ApplyInProgress) => Err(ai_error(
            "APPLY_IN_PROGRESS",
            "labels are being applied",
        )),
        Err(CreateLabelError::Mutation(failure)) => Err(ai_error(
            "MUTATION_FAILED",
            &failure.to_string(),
        )),
    }
}

pub(super) fn modified(server: &mut McpServer) -> ToolResult {
    let session = session_ref(server)?;
    let diff = session.get_modified_paths();
    Ok(ai_ok(
        "labels.modified",
        json!({
            "modified": !diff.is_empty(),
            "paths": render::modified_paths(&diff),
        }),
    ))
}

pub(super) fn apply(server: &mut McpServer) -> ToolResult {
    let session = server.session.as_mut().ok_or_else(no_session)?;
    let backend = StoreBackend::new(&mut server.store, server.actor.as_str());
    let report = session.apply_labels(&backend).map_err(edit_error)?;

    let mut warnings = Vec::new();
    if !report.is_success() {
        warnings.push(warning(
            "PARTIAL_APPLY",
            "some label changes were rejected and remain pending",
        ));
    }
    let mut result = render::apply_report(&report);
    result["phase"] = json!(session.phase().as_str());
    result["modified"] = json!(session.is_modified());
    Ok(ai_ok_with_warnings("labels.apply", result, warnings))
}

pub(super) fn reset(server: &mut McpServer) -> ToolResult {
    let session = session_mut(server)?;
    session.reset_initial_state().map_err(edit_error)?;
    Ok(ai_ok(
        "labels.reset",
        json!({ "phase": session.phase().as_str() }),
    ))
}

pub(super) fn expand(server: &mut McpServer, args: &Args) -> ToolResult {
    let path = require_str(args, "path")?;
    let session = session_mut(server)?;
    let expanded = session.toggle_expanded(path);
    Ok(ai_ok(
        "labels.expand",
        json!({ "path": path, "expanded": expanded }),
    ))
}

pub(super) fn expand_all(server: &mut McpServer, args: &Args) -> ToolResult {
    let expanded = require_bool(args, "expanded")?;
    let session = session_mut(server)?;
    session.set_expanded_all(expanded);
    Ok(ai_ok(
        "labels.expand_all",
        json!({
            "expanded": expanded,
            "folders": session.expansion().expanded().collect::<Vec<_>>(),
        }),
    ))
}

pub(super) fn filter(server: &mut McpServer) -> ToolResult {
    let session = server.session.as_ref().ok_or_else(no_session)?;
    let values = session.apply_filter(&mut server.table_filter);
    Ok(ai_ok(
        "labels.filter",
        json!({ "column": lt_core::LABELS_COLUMN, "values": values }),
    ))
}
