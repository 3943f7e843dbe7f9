// Path: crates/api/src/lib.rs
//! # Federation Block Signer API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # Federation Block Signer API
//!
//! Trait definitions and the shared error type that bind the RPC client,
//! signer, and messenger implementations to the round coordinator. Nothing
//! in this crate talks to a socket or a process; it only describes shapes.

pub mod error;
pub mod messenger;
pub mod rpc;
pub mod signer;

pub use error::{FedError, FedErrorKind};
pub use messenger::Messenger;
pub use rpc::ChainRpc;
pub use signer::BlockSigner;

#[cfg(test)]
mod tests {
    #[test]
    fn test_api_canary() {}
}
