#![forbid(unsafe_code)]

mod definitions;
mod labels;
mod render;
mod resources;

pub(crate) use definitions::tool_definitions;

use crate::{McpServer, ai_error};
use serde_json::Value;

pub(crate) fn dispatch_tool(server: &mut McpServer, name: &str, args: Value) -> Option<Value> {
    let Some(args) = args.as_object().cloned() else {
        return Some(ai_error("INVALID_INPUT", "arguments must be an object"));
    };
    let resp = match name {
        "labels.open" => labels::open(server, &args),
        "labels.state" => labels::state(server),
        "labels.toggle" => labels::toggle(server, &args, ToggleTarget::Leaf),
        "labels.toggle_folder" => labels::toggle(server, &args, ToggleTarget::Folder),
        "labels.create" => labels::create(server, &args),
        "labels.modified" => labels::modified(server),
        "labels.apply" => labels::apply(server),
        "labels.reset" => labels::reset(server),
        "labels.expand" => labels::expand(server, &args),
        "labels.expand_all" => labels::expand_all(server, &args),
        "labels.filter" => labels::filter(server),
        "resources.register" => resources::register(server, &args),
        "groups.join" => resources::join_group(server, &args),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|err| err))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToggleTarget {
    Leaf,
    Folder,
}

type Args = serde_json::Map<String, Value>;

/// Handlers return the error payload on `Err` so they can use `?` on argument checks.
type ToolResult = Result<Value, Value>;

fn require_str<'a>(args: &'a Args, key: &str) -> Result<&'a str, Value> {
    match args.get(key) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a string"),
        )),
        None => Err(ai_error("INVALID_INPUT", &format!("{key} is required"))),
    }
}

fn require_bool(args: &Args, key: &str) -> Result<bool, Value> {
    match args.get(key) {
        Some(Value::Bool(value)) => Ok(*value),
        Some(_) => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a boolean"),
        )),
        None => Err(ai_error("INVALID_INPUT", &format!("{key} is required"))),
    }
}

fn optional_bool(args: &Args, key: &str) -> Result<Option<bool>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a boolean"),
        )),
    }
}

fn require_str_array(args: &Args, key: &str) -> Result<Vec<String>, Value> {
    let Some(value) = args.get(key) else {
        return Err(ai_error("INVALID_INPUT", &format!("{key} is required")));
    };
    let Some(items) = value.as_array() else {
        return Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be an array of strings"),
        ));
    };
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ai_error(
                    "INVALID_INPUT",
                    &format!("{key} must be an array of strings"),
                )
            })
        })
        .collect()
}

fn store_error(err: lt_storage::StoreError) -> Value {
    ai_error(err.code(), &err.to_string())
}
