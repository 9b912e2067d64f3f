#![forbid(unsafe_code)]

mod ai;
mod filter;
mod jsonrpc;
mod runtime;

pub(crate) use ai::*;
pub(crate) use filter::*;
pub(crate) use jsonrpc::*;
pub(crate) use runtime::*;
