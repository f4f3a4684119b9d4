//! MCP JSON-RPC envelope, tool catalogue and resource URIs.
//!
//! This crate has no runtime state of its own — it is the shared
//! vocabulary `gasoline-server` and `gasoline-bridge` both speak.

pub mod jsonrpc;
pub mod resources;
pub mod tool_error;
pub mod tools;

pub use jsonrpc::{
    Incoming, JsonRpcError, JsonRpcErrorCode, JsonRpcPayload, JsonRpcResponse, RequestId,
    ResponseId,
};
pub use tool_error::ToolError;
pub use tools::{catalogue, Tool};
