#![forbid(unsafe_code)]

use super::{Args, ToolResult, require_str, store_error};
use crate::{McpServer, ai_error, ai_ok};
use lt_core::{GroupId, ResourceId};
use serde_json::json;

pub(super) fn register(server: &mut McpServer, args: &Args) -> ToolResult {
    let id = ResourceId::try_new(require_str(args, "id")?)
        .map_err(|err| ai_error("INVALID_INPUT", &format!("id: {err}")))?;
    let created = server.store.register_resource(&id).map_err(store_error)?;
    Ok(ai_ok(
        "resources.register",
        json!({ "id": id.as_str(), "created": created }),
    ))
}

pub(super) fn join_group(server: &mut McpServer, args: &Args) -> ToolResult {
    let group = GroupId::try_new(require_str(args, "group")?)
        .map_err(|err| ai_error("INVALID_INPUT", &format!("group: {err}")))?;
    let joined = server
        .store
        .join_group(&server.actor, &group)
        .map_err(store_error)?;
    tracing::info!(actor = %server.actor, group = %group, joined, "group membership");
    Ok(ai_ok(
        "groups.join",
        json!({ "group": group.as_str(), "actor": server.actor, "joined": joined }),
    ))
}
