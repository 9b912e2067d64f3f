#![forbid(unsafe_code)]

use lt_core::DEFAULT_MAX_IN_FLIGHT;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_STORAGE_DIR: &str = ".labeltree";
const DEFAULT_ACTOR: &str = "admin";
const MAX_IN_FLIGHT_CEILING: usize = 256;

/// Logs go to stderr; stdout carries the protocol.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_env("LT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();
}

fn flag_value(name: &str) -> Option<String> {
    let mut args = std::env::args().skip(1);
    let mut value: Option<String> = None;
    while let Some(arg) = args.next() {
        if arg.as_str() == name
            && let Some(next) = args.next()
        {
            value = Some(next);
        } else if let Some(inline) = arg.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')) {
            value = Some(inline.to_string());
        }
    }
    value
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn parse_storage_dir() -> PathBuf {
    flag_value("--storage-dir")
        .or_else(|| env_value("LT_STORAGE_DIR"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
}

pub(crate) fn parse_actor() -> String {
    flag_value("--actor")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| env_value("LT_ACTOR"))
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string())
}

pub(crate) fn parse_max_in_flight() -> usize {
    let raw = flag_value("--max-in-flight").or_else(|| env_value("LT_MAX_IN_FLIGHT"));
    let Some(raw) = raw else {
        return DEFAULT_MAX_IN_FLIGHT;
    };
    match raw.trim().parse::<usize>() {
        Ok(value) => value.clamp(1, MAX_IN_FLIGHT_CEILING),
        Err(_) => {
            tracing::warn!(value = %raw, "ignoring invalid max-in-flight");
            DEFAULT_MAX_IN_FLIGHT
        }
    }
}
