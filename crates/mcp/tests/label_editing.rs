#![forbid(unsafe_code)]

mod support;
use support::*;

use serde_json::{Value, json};

fn seed(server: &mut Server, labels: &[&str]) {
    for id in ["1", "2"] {
        server.tool_ok("resources.register", json!({ "id": id }));
    }
    for label in labels {
        server.tool_ok("labels.open", json!({ "resource_ids": ["1", "2"] }));
        server.tool_ok("labels.create", json!({ "label": label }));
        server.tool_ok("labels.reset", json!({}));
    }
}

fn state(server: &mut Server) -> Value {
    server.tool_ok("labels.state", json!({}))
}

#[test]
fn toggle_apply_and_reopen() {
    let mut server = Server::start_initialized("toggle_apply_and_reopen");
    seed(&mut server, &["infra.prod", "infra.dev"]);

    let opened = server.tool_ok("labels.open", json!({ "resource_ids": ["1", "2"] }));
    assert_eq!(opened["labels"], json!(2));
    assert_eq!(opened["phase"], json!("clean"));

    let toggled = server.tool_ok("labels.toggle", json!({ "path": "infra.prod" }));
    assert_eq!(toggled["state"], json!("all"));
    assert_eq!(toggled["phase"], json!("dirty"));

    let view = state(&mut server);
    assert_eq!(node(&view, "infra")["state"], json!("partial"));
    assert_eq!(node(&view, "infra.dev")["state"], json!("none"));

    let modified = server.tool_ok("labels.modified", json!({}));
    assert_eq!(
        modified["paths"],
        json!([{ "path": "infra.prod", "rows_added": ["1", "2"], "rows_removed": [] }])
    );

    let applied = server.tool_ok("labels.apply", json!({}));
    assert_eq!(applied["applied"], json!(2));
    assert_eq!(applied["failed"], json!(0));
    assert_eq!(applied["phase"], json!("clean"));

    // Reopening the same selection keeps the session; a new selection rebuilds it.
    let reopened = server.tool_ok("labels.open", json!({ "resource_ids": ["2", "1"] }));
    assert_eq!(reopened["rebuilt"], json!(false));
    let single = server.tool_ok("labels.open", json!({ "resource_ids": ["2"] }));
    assert_eq!(single["rebuilt"], json!(true));
    assert_eq!(node(&state(&mut server), "infra.prod")["state"], json!("all"));
}

#[test]
fn selection_change_discards_pending_edits_with_warning() {
    let mut server = Server::start_initialized("selection_change_discards_pending_edits");
    seed(&mut server, &["env"]);
    server.tool_ok("labels.open", json!({ "resource_ids": ["1", "2"] }));
    server.tool_ok("labels.toggle", json!({ "path": "env" }));

    let payload = server.tool("labels.open", json!({ "resource_ids": ["1"] }));
    assert_eq!(payload["result"]["dropped_edits"], json!(true));
    assert_eq!(payload["warnings"][0]["code"], json!("STALE_WORKING_SET"));
    assert_eq!(state(&mut server)["phase"], json!("clean"));
}

#[test]
fn folder_toggle_and_expansion() {
    let mut server = Server::start_initialized("folder_toggle_and_expansion");
    seed(&mut server, &["net.a", "net.b", "net.sub.c"]);
    server.tool_ok("labels.open", json!({ "resource_ids": ["1", "2"] }));

    let view = state(&mut server);
    assert_eq!(node(&view, "net")["visible"], json!(true));
    assert_eq!(node(&view, "net.a")["visible"], json!(false));

    let expanded = server.tool_ok("labels.expand", json!({ "path": "net" }));
    assert_eq!(expanded["expanded"], json!(true));
    let view = state(&mut server);
    assert_eq!(node(&view, "net.a")["visible"], json!(true));
    assert_eq!(node(&view, "net.sub.c")["visible"], json!(false));

    let all = server.tool_ok("labels.expand_all", json!({ "expanded": true }));
    assert_eq!(all["folders"], json!(["net", "net.sub"]));
    assert_eq!(node(&state(&mut server), "net.sub.c")["visible"], json!(true));

    let toggled = server.tool_ok("labels.toggle_folder", json!({ "path": "net" }));
    assert_eq!(toggled["state"], json!("all"));
    let view = state(&mut server);
    for path in ["net.a", "net.b", "net.sub.c"] {
        assert_eq!(node(&view, path)["state"], json!("all"), "{path}");
    }
    // Expansion is not an edit.
    server.tool_ok("labels.expand_all", json!({ "expanded": false }));
    server.tool_ok("labels.reset", json!({}));
    assert_eq!(state(&mut server)["phase"], json!("clean"));
}

#[test]
fn create_validates_and_requires_group_membership() {
    let mut server = Server::start_initialized("create_validates_and_requires_group_membership");
    seed(&mut server, &[]);
    server.tool_ok("labels.open", json!({ "resource_ids": ["1", "2"] }));

    let payload = server.tool("labels.create", json!({ "label": "bad..label" }));
    assert_eq!(payload["error"]["code"], json!("INVALID_LABEL_PATH"));

    let payload = server.tool("labels.create", json!({ "label": "$ops.k8s" }));
    assert_eq!(payload["error"]["code"], json!("MUTATION_FAILED"));
    assert!(
        state(&mut server)["nodes"]
            .as_array()
            .expect("nodes")
            .iter()
            .all(|node| node["path"] != "$ops.k8s")
    );

    server.tool_ok("groups.join", json!({ "group": "ops" }));
    // The new group only shows up in the catalog after a reload.
    let reopened = server.tool_ok("labels.open", json!({ "resource_ids": ["1", "2"] }));
    assert_eq!(reopened["rebuilt"], json!(false));
    let reloaded = server.tool_ok(
        "labels.open",
        json!({ "resource_ids": ["1", "2"], "reload": true }),
    );
    assert_eq!(reloaded["rebuilt"], json!(true));
    let created = server.tool_ok("labels.create", json!({ "label": "$ops.k8s" }));
    assert_eq!(created["state"], json!("all"));
    assert_eq!(node(&state(&mut server), "$ops")["is_root"], json!(true));

    let applied = server.tool_ok("labels.apply", json!({}));
    assert_eq!(applied["applied"], json!(2));
}

#[test]
fn filter_pushes_modified_paths_into_table_state() {
    let mut server = Server::start_initialized("filter_pushes_modified_paths");
    seed(&mut server, &["infra.prod", "infra.dev"]);
    server.tool_ok("labels.open", json!({ "resource_ids": ["1", "2"] }));
    server.tool_ok("labels.toggle", json!({ "path": "infra.dev" }));

    let filtered = server.tool_ok("labels.filter", json!({}));
    assert_eq!(filtered["column"], json!("labels"));
    assert_eq!(filtered["values"], json!(["infra.dev"]));
    assert_eq!(
        state(&mut server)["table_filter"],
        json!([{ "column": "labels", "values": ["infra.dev"] }])
    );

    server.tool_ok("labels.reset", json!({}));
    server.tool_ok("labels.filter", json!({}));
    assert_eq!(state(&mut server)["table_filter"], json!([]));
}

#[test]
fn reload_refreshes_an_unchanged_selection() {
    let mut server = Server::start_initialized("reload_refreshes_an_unchanged_selection");
    seed(&mut server, &["env"]);
    server.tool_ok("labels.open", json!({ "resource_ids": ["1", "2"] }));
    server.tool_ok("labels.toggle", json!({ "path": "env" }));
    server.tool_ok("groups.join", json!({ "group": "ops" }));

    let payload = server.tool(
        "labels.open",
        json!({ "resource_ids": ["2", "1"], "reload": true }),
    );
    assert_eq!(payload["success"], json!(true), "{payload}");
    assert_eq!(payload["result"]["rebuilt"], json!(true));
    assert_eq!(payload["result"]["dropped_edits"], json!(true));
    assert_eq!(payload["warnings"][0]["code"], json!("STALE_WORKING_SET"));

    let view = state(&mut server);
    assert_eq!(view["phase"], json!("clean"));
    assert_eq!(node(&view, "env")["state"], json!("none"));
    assert_eq!(node(&view, "$ops")["is_root"], json!(true));

    let payload = server.tool(
        "labels.open",
        json!({ "resource_ids": ["1", "2"], "reload": "yes" }),
    );
    assert_eq!(payload["error"]["code"], json!("INVALID_INPUT"));
}
