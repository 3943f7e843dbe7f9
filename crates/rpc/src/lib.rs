// Path: crates/rpc/src/lib.rs
//! # Federation Block Signer RPC Crate Lints
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # Federation Block Signer RPC Client
//!
//! A synchronous JSON-RPC 1.0 client over HTTP with basic authentication,
//! implementing [`fedsign_api::ChainRpc`] against the local chain daemon
//! (§4.1). This is the only crate in the workspace that knows the wire
//! shape of a JSON-RPC request/response.

pub mod client;
mod wire;

pub use client::{ChainDaemonClient, RpcEndpoint};

#[cfg(test)]
mod tests {
    #[test]
    fn test_rpc_canary() {}
}
