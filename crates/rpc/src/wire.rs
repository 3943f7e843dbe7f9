// Path: crates/rpc/src/wire.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON-RPC 1.0 request object: positional `params`, a numeric `id`, no
/// `jsonrpc` version field (that field is a 2.0-ism).
#[derive(Debug, Serialize)]
pub struct RpcRequest {
    pub method: &'static str,
    pub params: Vec<Value>,
    pub id: u64,
}

/// The daemon's response envelope. `error` is `null` on success; a non-null
/// error object is an `rpc_application` fault, never a transport fault.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<Value>,
    pub error: Option<RpcErrorObject>,
    #[allow(dead_code)]
    pub id: Value,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

impl std::fmt::Display for RpcErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) {}", self.code, self.message)
    }
}
