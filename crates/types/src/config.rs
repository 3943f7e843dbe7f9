// Path: crates/types/src/config.rs
use crate::inflation::InflationConfig;
use std::time::Duration;

/// Which messenger transport a node is configured to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessengerKind {
    /// The default ZeroMQ-style publish/subscribe fabric.
    PubSub,
    /// The legacy variant: connectivity is established externally, the
    /// messenger only frames/parses messages over an injected transport.
    LogBus,
}

/// One federation peer's network address, used by the pub-sub messenger to
/// find the publisher endpoint of every other node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEndpoint {
    pub host: String,
    pub port: u16,
}

impl PeerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Immutable federation configuration, constructed once at process start and
/// shared (by reference) across every round.
#[derive(Debug, Clone)]
pub struct FederationConfig {
    /// Total number of block-signing members, `n`.
    pub num_nodes: u32,
    /// Signature threshold, `m`, with `1 <= m <= n`.
    pub threshold: u32,
    /// This process's position in the federation, `i`, with `0 <= i < n`.
    pub node_index: u32,
    /// Ordered list of exactly `n` peer endpoints (own entry included, at
    /// position `node_index`; the messenger skips binding a subscriber to
    /// itself).
    pub peers: Vec<PeerEndpoint>,
    /// Target time between blocks.
    pub block_interval: Duration,
    /// The m-of-n redeem script, hex encoded, whose hash addresses the
    /// block-signing funds.
    pub redeem_script_hex: String,
    /// Messenger transport selection.
    pub messenger_kind: MessengerKind,
    /// Wallet passphrase; empty string means the wallet is unencrypted.
    pub wallet_passphrase: String,
    /// Whether partial signatures are produced by a PKCS#11 hardware module
    /// rather than the daemon's own `signblock`.
    pub use_hsm: bool,
    /// Scheduled reissuance policy; `None` disables inflation entirely.
    pub inflation: Option<InflationConfig>,
}

impl FederationConfig {
    /// The height at which `node_index` is the proposer, round-robin by
    /// height: `height mod n == i`. Exactly one node satisfies this for any
    /// given height (property test in `fedsign-coordinator`).
    pub fn is_proposer_at(&self, height: u64) -> bool {
        height % u64::from(self.num_nodes) == u64::from(self.node_index)
    }

    /// `max(60, 2 * block_interval)` seconds, the wallet unlock duration.
    /// Widened past a flat 60s for deployments whose block interval exceeds
    /// that, per the decision recorded in DESIGN.md.
    pub fn wallet_unlock_seconds(&self) -> u64 {
        let double_interval = self.block_interval.as_secs().saturating_mul(2);
        double_interval.max(60)
    }

    /// Validates the structural invariants a `FederationConfig` must hold
    /// before it can be handed to the coordinator. Called once at startup.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_nodes == 0 {
            return Err("num_nodes must be at least 1".to_string());
        }
        if self.threshold == 0 || self.threshold > self.num_nodes {
            return Err(format!(
                "threshold {} must be in [1, {}]",
                self.threshold, self.num_nodes
            ));
        }
        if self.node_index >= self.num_nodes {
            return Err(format!(
                "node_index {} must be < num_nodes {}",
                self.node_index, self.num_nodes
            ));
        }
        if self.messenger_kind == MessengerKind::PubSub
            && !self.peers.is_empty()
            && self.peers.len() != self.num_nodes as usize
        {
            return Err(format!(
                "peers list has {} entries, expected {}",
                self.peers.len(),
                self.num_nodes
            ));
        }
        if self.redeem_script_hex.is_empty() {
            return Err("redeemscript must not be empty".to_string());
        }
        Ok(())
    }
}
