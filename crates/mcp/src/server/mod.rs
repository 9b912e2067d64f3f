#![forbid(unsafe_code)]

use crate::{
    JsonRpcRequest, McpServer, McpServerConfig, RpcErrorCode, TableFilterState, ToolCallParams,
    json_rpc_error, json_rpc_response, tool_text_content,
};
use lt_storage::SqliteStore;
use serde_json::{Value, json};

type RpcFailure = (RpcErrorCode, String);

impl McpServer {
    pub(crate) fn new(store: SqliteStore, cfg: McpServerConfig) -> Self {
        Self {
            initialized: false,
            store,
            actor: cfg.actor,
            max_in_flight: cfg.max_in_flight,
            session: None,
            table_filter: TableFilterState::default(),
        }
    }

    pub(crate) fn handle(&mut self, request: JsonRpcRequest) -> Option<Value> {
        let notification = request.is_notification();
        match request.method.as_str() {
            "initialize" => {
                let result = self.initialize_result(request.params.as_ref());
                return Some(json_rpc_response(request.id, result));
            }
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                return None;
            }
            method if !self.initialized => {
                // A client that skips the handshake is initialized by its first real request.
                if !matches!(method, "tools/call" | "tools/list" | "ping") {
                    return (!notification).then(|| {
                        json_rpc_error(
                            request.id,
                            RpcErrorCode::NotInitialized,
                            "server not initialized",
                        )
                    });
                }
                tracing::debug!(method, "implicit initialize");
                self.initialized = true;
            }
            _ => {}
        }

        let outcome = match request.method.as_str() {
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": crate::tools::tool_definitions() })),
            "tools/call" => self.tools_call(request.params),
            method => Err((
                RpcErrorCode::MethodNotFound,
                format!("method not found: {method}"),
            )),
        };
        match outcome {
            Ok(result) => Some(json_rpc_response(request.id, result)),
            Err(_) if notification => None,
            Err((code, message)) => Some(json_rpc_error(request.id, code, &message)),
        }
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        // Echo the client's protocol version when it sends one.
        let protocol_version = params
            .and_then(|v| v.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(crate::MCP_VERSION);
        json!({
            "protocolVersion": protocol_version,
            "serverInfo": {
                "name": crate::SERVER_NAME,
                "version": crate::SERVER_VERSION
            },
            "capabilities": { "tools": {} }
        })
    }

    fn tools_call(&mut self, params: Option<Value>) -> Result<Value, RpcFailure> {
        let params = params.unwrap_or(Value::Null);
        if !params.is_object() {
            return Err((
                RpcErrorCode::InvalidParams,
                "params must be an object".to_string(),
            ));
        }
        let call: ToolCallParams = serde_json::from_value(params).map_err(|err| {
            (
                RpcErrorCode::InvalidParams,
                format!("invalid tools/call params: {err}"),
            )
        })?;
        let args = call.arguments.unwrap_or_else(|| json!({}));
        let payload = self.call_tool(&call.name, args);
        let is_error = payload.get("success").and_then(Value::as_bool) != Some(true);
        Ok(json!({
            "content": [tool_text_content(&payload)],
            "isError": is_error
        }))
    }

    pub(crate) fn call_tool(&mut self, name: &str, args: Value) -> Value {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            crate::tools::dispatch_tool(self, name, args)
                .unwrap_or_else(|| crate::ai_error("UNKNOWN_TOOL", &format!("Unknown tool: {name}")))
        }));

        match result {
            Ok(resp) => resp,
            Err(_) => {
                tracing::error!(tool = name, "tool handler panicked");
                crate::ai_error("INTERNAL_ERROR", &format!("tool {name} panicked"))
            }
        }
    }
}
