// Path: crates/types/src/lib.rs
//! # Federation Block Signer Types Crate Lints
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # Federation Block Signer Data Model
//!
//! Pure data types shared by every crate in the workspace: the federation's
//! static configuration, per-round state, wire messages, and the inflation
//! policy's configuration. Nothing here performs I/O.

pub mod config;
pub mod inflation;
pub mod messages;
pub mod round;

pub use config::FederationConfig;
pub use inflation::InflationConfig;
pub use messages::{NewBlockMessage, NewSigMessage};
pub use round::{NodeRole, RoundState};

#[cfg(test)]
mod tests {
    #[test]
    fn test_types_canary() {}
}
