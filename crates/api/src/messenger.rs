// Path: crates/api/src/messenger.rs
use crate::error::FedResult;
use fedsign_types::messages::ReceivedSig;

/// The capability set a messenger exposes to the round coordinator (§4.4).
///
/// Implementations are polymorphic over the transport (pub-sub socket vs.
/// log-bus); the coordinator only ever sees this trait.
pub trait Messenger: Send + Sync {
    /// Broadcast a proposed block at `height`.
    fn produce_block(&self, height: u64, block_hex: &str) -> FedResult<()>;

    /// Broadcast a partial signature at `height`.
    fn produce_sig(&self, height: u64, sig_hex: &str) -> FedResult<()>;

    /// Drain all pending `new_block` messages across every subscriber and
    /// return the one whose height equals `height`, if any. Messages at
    /// other heights are discarded (stale or from a round we have already
    /// abandoned).
    fn consume_block(&self, height: u64) -> FedResult<Option<String>>;

    /// Drain all pending `new_sig` messages and return every one whose
    /// height equals `height`, tagged with the contributing peer.
    fn consume_sigs(&self, height: u64) -> FedResult<Vec<ReceivedSig>>;

    /// Drop all subscribers and recreate them. Recovers from long-lived
    /// broken connections that the transport's own reconnect logic did not
    /// heal; never fatal.
    fn reconnect(&self) -> FedResult<()>;
}
