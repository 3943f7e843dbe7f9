// Path: crates/coordinator/src/round.rs
//! The state machine from §4.5: one call to [`RoundCoordinator::run_round`]
//! advances exactly one height, either as proposer (propose → collect →
//! submit) or as signer (validate → sign → wait), and never holds state
//! across calls — the next call re-reads the tip from the daemon.

use fedsign_api::error::{FedError, FedResult};
use fedsign_api::messenger::Messenger;
use fedsign_api::rpc::ChainRpc;
use fedsign_api::signer::BlockSigner;
use fedsign_types::config::FederationConfig;
use fedsign_types::round::{NodeRole, RoundState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Poll granularity while waiting for quorum or a candidate block.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct RoundCoordinator {
    rpc: Arc<dyn ChainRpc>,
    signer: Option<Arc<dyn BlockSigner>>,
    messenger: Arc<dyn Messenger>,
    config: FederationConfig,
    /// Federation member public keys, ordered by node index, parsed once
    /// from `config.redeem_script_hex` at construction.
    pubkeys: Vec<Vec<u8>>,
}

impl RoundCoordinator {
    /// Parses the redeem script once so every round verifies against the
    /// same pubkey list without re-parsing it per signature.
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        signer: Option<Arc<dyn BlockSigner>>,
        messenger: Arc<dyn Messenger>,
        config: FederationConfig,
    ) -> FedResult<Self> {
        let redeem_script = hex::decode(&config.redeem_script_hex)
            .map_err(|e| FedError::protocol_invalid(format!("bad redeem script hex: {e}")))?;
        let pubkeys = fedsign_crypto::redeem_script::extract_pubkeys(&redeem_script)
            .map_err(FedError::protocol_invalid)?;
        Ok(Self {
            rpc,
            signer,
            messenger,
            config,
            pubkeys,
        })
    }

    /// Advances exactly one height: reads the current tip, derives `height
    /// = tip + 1`, and runs the proposer or signer branch depending on
    /// `height mod n == i`.
    pub fn run_round(&self, stop: &AtomicBool) -> FedResult<()> {
        let _timer = fedsign_telemetry::time::Timer::new("round");
        let tip = self.rpc.get_block_count()?;
        let height = tip + 1;
        self.unlock_wallet_if_configured()?;

        fedsign_telemetry::metrics::COUNTERS.inc_rounds_started();
        if self.config.is_proposer_at(height) {
            self.run_as_proposer(height, stop)
        } else {
            self.run_as_signer(height, stop)
        }
    }

    fn unlock_wallet_if_configured(&self) -> FedResult<()> {
        if self.config.wallet_passphrase.is_empty() {
            return Ok(());
        }
        self.rpc
            .wallet_passphrase(&self.config.wallet_passphrase, self.config.wallet_unlock_seconds())
    }

    /// Software path calls the daemon's `signblock` directly; the hardware
    /// path goes through the configured [`BlockSigner`]. Either way the
    /// signature returned is over [`fedsign_crypto::header_hash`] of the
    /// candidate.
    fn sign_candidate(&self, candidate_hex: &str) -> FedResult<Vec<u8>> {
        match &self.signer {
            Some(signer) => {
                let hash = fedsign_crypto::header_hash(candidate_hex)
                    .map_err(FedError::protocol_invalid)?;
                signer.sign(&hash)
            }
            None => {
                let sig_hex = self.rpc.sign_block(candidate_hex)?;
                hex::decode(sig_hex)
                    .map_err(|e| FedError::rpc_application(format!("signblock: malformed hex: {e}")))
            }
        }
    }

    fn run_as_proposer(&self, height: u64, stop: &AtomicBool) -> FedResult<()> {
        let mut candidate_hex = self.rpc.get_new_block_hex()?;
        candidate_hex = self.apply_inflation_if_due(height, candidate_hex);

        self.messenger.produce_block(height, &candidate_hex)?;
        self.rpc.test_proposed_block(&candidate_hex)?;

        let hash =
            fedsign_crypto::header_hash(&candidate_hex).map_err(FedError::protocol_invalid)?;
        let own_sig = self.sign_candidate(&candidate_hex)?;

        let deadline = Instant::now() + self.config.block_interval;
        let mut round = RoundState::new(height, NodeRole::Proposer, deadline);
        round.candidate_hex = Some(candidate_hex.clone());
        round.insert_sig(self.config.node_index, own_sig);

        while !round.has_quorum(self.config.threshold) && !round.is_expired(Instant::now()) {
            if stop.load(Ordering::Relaxed) {
                return Err(FedError::stop_requested());
            }
            for received in self.messenger.consume_sigs(height)? {
                self.try_accept_sig(&mut round, &hash, received.from, &received.message.sig_hex);
            }
            thread::sleep(POLL_INTERVAL);
        }

        if round.has_quorum(self.config.threshold) {
            let picked = round.lowest_indexed_sigs(self.config.threshold);
            let sigs_hex: Vec<String> = picked.iter().map(|(_, sig)| hex::encode(sig)).collect();
            let combined = self.rpc.combine_block_sigs(
                &candidate_hex,
                &sigs_hex,
                &self.config.redeem_script_hex,
            )?;
            self.rpc.submit_block(&combined)?;
            fedsign_telemetry::metrics::COUNTERS.inc_rounds_committed();
            tracing::info!(target: "coordinator", event = "round_committed", height, signers = sigs_hex.len());
        } else {
            fedsign_telemetry::metrics::COUNTERS.inc_rounds_abandoned();
            tracing::warn!(target: "coordinator", event = "round_abandoned", height, collected = round.partial_sigs.len(), "deadline passed without quorum");
        }
        Ok(())
    }

    /// Verifies an incoming signature against the candidate hash and the
    /// sender's federation pubkey before inserting it; malformed hex or a
    /// failed verification is `protocol_invalid`, not round-fatal.
    fn try_accept_sig(&self, round: &mut RoundState, hash: &[u8; 32], from: u32, sig_hex: &str) {
        let pubkey = match self.pubkeys.get(from as usize) {
            Some(pk) => pk,
            None => {
                fedsign_telemetry::metrics::COUNTERS.inc_protocol_invalid();
                tracing::warn!(target: "coordinator", event = "protocol_invalid", from, "signer index out of range for redeem script");
                return;
            }
        };
        let sig_bytes = match hex::decode(sig_hex) {
            Ok(b) => b,
            Err(_) => {
                fedsign_telemetry::metrics::COUNTERS.inc_protocol_invalid();
                tracing::warn!(target: "coordinator", event = "protocol_invalid", from, "malformed signature hex");
                return;
            }
        };
        match fedsign_crypto::verify::verify_partial_signature(hash, &sig_bytes, pubkey) {
            Ok(()) => {
                round.insert_sig(from, sig_bytes);
            }
            Err(_) => {
                fedsign_telemetry::metrics::COUNTERS.inc_protocol_invalid();
                tracing::warn!(target: "coordinator", event = "protocol_invalid", from, "signature failed verification against candidate block");
            }
        }
    }

    /// If inflation is due at `height`, builds and broadcasts the
    /// reissuance transaction and refreshes the block template so it is
    /// included. A build or broadcast failure is logged and the original
    /// template is kept — liveness of ordinary blocks outranks forcing the
    /// inflation event (§4.3).
    fn apply_inflation_if_due(&self, height: u64, candidate_hex: String) -> String {
        let inflation_cfg = match &self.config.inflation {
            Some(cfg) if fedsign_inflation::fires(height, cfg) => cfg,
            _ => return candidate_hex,
        };

        match fedsign_inflation::build_reissuance_tx(self.rpc.as_ref(), inflation_cfg) {
            Ok(signed_tx) => match self.rpc.send_raw_transaction(&signed_tx) {
                Ok(_) => match self.rpc.get_new_block_hex() {
                    Ok(refreshed) => refreshed,
                    Err(e) => {
                        tracing::warn!(target: "coordinator", event = "inflation_template_refresh_failed", height, error = %e);
                        candidate_hex
                    }
                },
                Err(e) => {
                    tracing::warn!(target: "coordinator", event = "inflation_broadcast_failed", height, error = %e);
                    candidate_hex
                }
            },
            Err(e) => {
                tracing::warn!(target: "coordinator", event = "inflation_build_failed", height, error = %e);
                candidate_hex
            }
        }
    }

    fn run_as_signer(&self, height: u64, stop: &AtomicBool) -> FedResult<()> {
        let deadline = Instant::now() + self.config.block_interval / 2;
        let mut candidate_hex = None;

        while Instant::now() < deadline {
            if stop.load(Ordering::Relaxed) {
                return Err(FedError::stop_requested());
            }
            if let Some(block_hex) = self.messenger.consume_block(height)? {
                candidate_hex = Some(block_hex);
                break;
            }
            thread::sleep(POLL_INTERVAL);
        }

        let candidate_hex = match candidate_hex {
            Some(c) => c,
            None => {
                tracing::warn!(target: "coordinator", event = "signer_timeout", height, "no candidate received before deadline, reconnecting");
                self.messenger.reconnect()?;
                fedsign_telemetry::metrics::COUNTERS.inc_reconnect_attempts();
                fedsign_telemetry::metrics::COUNTERS.inc_rounds_abandoned();
                return Ok(());
            }
        };

        if self.rpc.test_proposed_block(&candidate_hex).is_err() {
            fedsign_telemetry::metrics::COUNTERS.inc_protocol_invalid();
            tracing::warn!(target: "coordinator", event = "protocol_invalid", height, "candidate block failed validation, refusing to sign");
            return Ok(());
        }

        let sig = self.sign_candidate(&candidate_hex)?;
        self.messenger.produce_sig(height, &hex::encode(sig))?;
        fedsign_telemetry::metrics::COUNTERS.inc_rounds_committed();
        Ok(())
    }
}
