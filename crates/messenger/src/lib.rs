// Path: crates/messenger/src/lib.rs
//! # Federation Block Signer Messenger Crate Lints
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # Federation Block Signer Messenger
//!
//! Two implementations of [`fedsign_api::Messenger`]: the default ZeroMQ
//! publish/subscribe fabric ([`pubsub::ZmqMessenger`]) and the legacy
//! log-bus variant ([`logbus::LogBusMessenger`]) that only frames/parses an
//! externally-connected transport.

pub mod logbus;
pub mod pubsub;
pub mod wire;

pub use logbus::{LogBusMessenger, LogBusTransport};
pub use pubsub::ZmqMessenger;

#[cfg(test)]
mod tests {
    #[test]
    fn test_messenger_canary() {}
}
