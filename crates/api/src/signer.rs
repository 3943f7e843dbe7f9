// Path: crates/api/src/signer.rs
use crate::error::FedResult;

/// The capability set a block signer exposes to the round coordinator
/// (§4.2). The software path has no implementor of this trait at all — the
/// coordinator calls [`crate::ChainRpc::sign_block`] directly and branches
/// on `Option<Box<dyn BlockSigner>>` being `None`.
pub trait BlockSigner: Send + Sync {
    /// The public key corresponding to this signer's private key, as used
    /// to locate its position in the redeem script. Cached at construction.
    fn get_pubkey(&self) -> FedResult<Vec<u8>>;

    /// Produce a DER-encoded ECDSA signature over `block_hash` (32 bytes).
    fn sign(&self, block_hash: &[u8; 32]) -> FedResult<Vec<u8>>;
}
