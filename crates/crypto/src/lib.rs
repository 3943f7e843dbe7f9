// Path: crates/crypto/src/lib.rs
//! # Federation Block Signer Crypto Crate Lints
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # Federation Block Signer Crypto
//!
//! The hardware signer (PKCS#11), the redeem-script pubkey parser, and the
//! ECDSA verification routine the proposer runs against every incoming
//! partial signature before accepting it (the "strengthening" noted in the
//! design: `combineblocksigs` is not trusted blindly).

pub mod blockhash;
pub mod hsm;
pub mod redeem_script;
pub mod verify;

pub use blockhash::header_hash;
pub use hsm::HsmSigner;

#[cfg(test)]
mod tests {
    #[test]
    fn test_crypto_canary() {}
}
