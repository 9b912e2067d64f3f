#![forbid(unsafe_code)]

use serde_json::{Value, json};

fn no_args(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": { "type": "object", "properties": {}, "required": [] }
    })
}

fn path_arg(name: &str, description: &str, key: &str) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": { key: { "type": "string" } },
            "required": [key]
        }
    })
}

pub(crate) fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "labels.open",
            "description": "Open a label editing session over the selected resources. With reload=true the catalog and rows are fetched again even when the selection is unchanged.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "resource_ids": { "type": "array", "items": { "type": "string" } },
                    "reload": { "type": "boolean" }
                },
                "required": ["resource_ids"]
            }
        }),
        no_args(
            "labels.state",
            "Label tree with tri-state, expansion and visibility per node.",
        ),
        path_arg(
            "labels.toggle",
            "Toggle one label across the selection.",
            "path",
        ),
        path_arg(
            "labels.toggle_folder",
            "Toggle every label under a folder.",
            "path",
        ),
        path_arg(
            "labels.create",
            "Create a label and select it on every row.",
            "label",
        ),
        no_args("labels.modified", "Pending per-label row changes."),
        no_args("labels.apply", "Commit pending changes to the store."),
        no_args("labels.reset", "Discard pending changes."),
        path_arg("labels.expand", "Toggle a folder's expansion.", "path"),
        json!({
            "name": "labels.expand_all",
            "description": "Expand or collapse every folder.",
            "inputSchema": {
                "type": "object",
                "properties": { "expanded": { "type": "boolean" } },
                "required": ["expanded"]
            }
        }),
        no_args(
            "labels.filter",
            "Filter the resource table by the modified labels.",
        ),
        path_arg("resources.register", "Register a resource id.", "id"),
        path_arg("groups.join", "Add the actor to a label group.", "group"),
    ]
}
