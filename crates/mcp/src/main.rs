#![forbid(unsafe_code)]

mod entry;
mod server;
mod support;
mod tools;

pub(crate) use support::*;

use lt_core::EditSession;
use lt_storage::SqliteStore;

const MCP_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "labeltree-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) struct McpServer {
    initialized: bool,
    store: SqliteStore,
    actor: String,
    max_in_flight: usize,
    session: Option<EditSession>,
    table_filter: TableFilterState,
}

pub(crate) struct McpServerConfig {
    actor: String,
    max_in_flight: usize,
}

fn usage() -> &'static str {
    "lt_mcp - nested label tree editor (JSON-RPC over stdio)\n\n\
USAGE:\n\
  lt_mcp [--storage-dir DIR] [--actor NAME] [--max-in-flight N]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version/build and exit\n\
\n\
ENV:\n\
  LT_STORAGE_DIR, LT_ACTOR, LT_MAX_IN_FLIGHT  Defaults for the flags above\n\
  LT_LOG                                       Log filter (stderr), default: warn\n"
}

fn version_line() -> String {
    let profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };
    format!("lt_mcp {SERVER_VERSION} build={profile}")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    init_tracing();

    let storage_dir = parse_storage_dir();
    let actor = parse_actor();
    let max_in_flight = parse_max_in_flight();
    let store = SqliteStore::open(&storage_dir)?;
    tracing::info!(
        storage_dir = %storage_dir.display(),
        actor = %actor,
        max_in_flight,
        "label tree server starting"
    );

    let mut server = McpServer::new(
        store,
        McpServerConfig {
            actor,
            max_in_flight,
        },
    );
    let result = entry::run_stdio(&mut server);
    if let Err(err) = &result {
        tracing::error!(error = %err, "stdio transport failed");
    }
    result
}
