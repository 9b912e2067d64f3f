#![forbid(unsafe_code)]

use crate::{JsonRpcRequest, McpServer, RpcErrorCode, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};

fn write_newline_json(
    stdout: &mut std::io::StdoutLock<'_>,
    resp: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(stdout, "{}", serde_json::to_string(resp)?)?;
    stdout.flush()?;
    Ok(())
}

/// One JSON-RPC message per line until stdin closes.
pub(crate) fn run_stdio(server: &mut McpServer) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();

    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        if let Some(resp) = handle_newline_request(server, raw) {
            write_newline_json(&mut stdout, &resp)?;
        }
    }

    tracing::debug!("stdin closed");
    Ok(())
}

fn handle_newline_request(server: &mut McpServer, raw: &str) -> Option<Value> {
    let data: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return Some(json_rpc_error(None, RpcErrorCode::ParseError, &format!("parse error: {e}"))),
    };

    let (id, has_method) = match data.as_object() {
        Some(obj) => (obj.get("id").cloned(), obj.contains_key("method")),
        None => return Some(json_rpc_error(None, RpcErrorCode::InvalidRequest, "request must be an object")),
    };
    if !has_method {
        return Some(json_rpc_error(id, RpcErrorCode::InvalidRequest, "request has no method"));
    }

    let request: JsonRpcRequest = match serde_json::from_value(data) {
        Ok(v) => v,
        Err(e) => {
            return Some(json_rpc_error(
                id,
                RpcErrorCode::InvalidRequest,
                &format!("invalid request: {e}"),
            ));
        }
    };

    server.handle(request)
}
