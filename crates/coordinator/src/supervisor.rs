// Path: crates/coordinator/src/supervisor.rs
//! Owns the background thread the coordinator runs on, mirroring
//! `original_source/federation/federation.py`'s
//! `BlockSigning.start()/stopped()/stop()/join()`: `start` spawns the loop,
//! `stopped` lets the caller notice an unhandled fault, `stop` requests an
//! orderly exit, `join` waits for the thread to actually finish.

use crate::round::RoundCoordinator;
use fedsign_api::error::FedErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// §7: `rpc_transport` is retried round over round, but escalates to
/// process-fatal once it has persisted for more than this many consecutive
/// round intervals.
const MAX_CONSECUTIVE_RPC_TRANSPORT_FAULTS: u32 = 5;

/// Runs [`RoundCoordinator::run_round`] in a loop on a dedicated OS thread
/// until told to stop or until a process-fatal error is returned.
pub struct Supervisor {
    stop_flag: Arc<AtomicBool>,
    faulted: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Supervisor {
    /// Spawns the coordinator loop. The main thread stays free to wait on
    /// an interrupt signal (§5: "this does not introduce concurrency
    /// *within* the round logic").
    pub fn start(coordinator: RoundCoordinator) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let faulted = Arc::new(AtomicBool::new(false));

        let loop_stop = stop_flag.clone();
        let loop_faulted = faulted.clone();
        let handle = thread::spawn(move || {
            let mut consecutive_rpc_transport_faults: u32 = 0;
            loop {
                if loop_stop.load(Ordering::Relaxed) {
                    tracing::info!(target: "supervisor", event = "stop_acknowledged");
                    break;
                }
                match coordinator.run_round(&loop_stop) {
                    Ok(()) => {
                        consecutive_rpc_transport_faults = 0;
                    }
                    Err(e) if e.kind() == FedErrorKind::StopRequested => {
                        tracing::info!(target: "supervisor", event = "stop_acknowledged");
                        break;
                    }
                    Err(e) if e.kind().is_fatal() => {
                        tracing::error!(target: "supervisor", event = "fatal", error = %e);
                        loop_faulted.store(true, Ordering::Relaxed);
                        break;
                    }
                    Err(e) if e.kind() == FedErrorKind::RpcTransport => {
                        consecutive_rpc_transport_faults += 1;
                        tracing::warn!(
                            target: "supervisor",
                            event = "round_error",
                            error = %e,
                            consecutive = consecutive_rpc_transport_faults,
                        );
                        if consecutive_rpc_transport_faults > MAX_CONSECUTIVE_RPC_TRANSPORT_FAULTS {
                            tracing::error!(
                                target: "supervisor",
                                event = "fatal",
                                error = %e,
                                "rpc_transport persisted past the round-interval budget"
                            );
                            loop_faulted.store(true, Ordering::Relaxed);
                            break;
                        }
                    }
                    Err(e) => {
                        consecutive_rpc_transport_faults = 0;
                        tracing::warn!(target: "supervisor", event = "round_error", error = %e);
                    }
                }
            }
        });

        Self {
            stop_flag,
            faulted,
            handle: Some(handle),
        }
    }

    /// `true` if the coordinator thread has exited on its own due to an
    /// unhandled fault (rather than an orderly stop), mirroring
    /// `BlockSigning.stopped()`.
    pub fn stopped(&self) -> bool {
        self.faulted.load(Ordering::Relaxed)
    }

    /// Requests an orderly stop. The coordinator finishes its current
    /// round before observing the flag and exiting.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Waits for the coordinator thread to exit. Returns an error if the
    /// thread panicked (never expected, since the coordinator crates deny
    /// `unwrap`/`expect`/`panic` outside tests).
    pub fn join(&mut self) -> Result<(), String> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| "coordinator thread panicked".to_string())?;
        }
        Ok(())
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::RoundCoordinator;
    use fedsign_api::error::{FedError, FedResult};
    use fedsign_api::messenger::Messenger;
    use fedsign_api::rpc::{ChainRpc, Unspent};
    use fedsign_types::config::{FederationConfig, MessengerKind};
    use fedsign_types::messages::ReceivedSig;
    use rust_decimal::Decimal;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;

    struct CountingRpc {
        calls: AtomicU64,
    }

    impl ChainRpc for CountingRpc {
        fn get_block_count(&self) -> FedResult<u64> {
            Ok(self.calls.fetch_add(1, Ordering::Relaxed))
        }
        fn get_new_block_hex(&self) -> FedResult<String> {
            Ok(hex::encode([0u8; 80]))
        }
        fn test_proposed_block(&self, _block_hex: &str) -> FedResult<()> {
            Ok(())
        }
        fn sign_block(&self, _block_hex: &str) -> FedResult<String> {
            Err(FedError::rpc_application("no signer configured in this test"))
        }
        fn combine_block_sigs(
            &self,
            _block_hex: &str,
            _sigs_hex: &[String],
            _redeem_script_hex: &str,
        ) -> FedResult<String> {
            Ok(String::new())
        }
        fn submit_block(&self, _signed_block_hex: &str) -> FedResult<()> {
            Ok(())
        }
        fn send_raw_transaction(&self, tx_hex: &str) -> FedResult<String> {
            Ok(tx_hex.to_string())
        }
        fn wallet_passphrase(&self, _passphrase: &str, _seconds: u64) -> FedResult<()> {
            Ok(())
        }
        fn list_unspent_for_script(&self, _script_pub_key_hex: &str) -> FedResult<Vec<Unspent>> {
            Ok(vec![])
        }
        fn create_raw_transaction(
            &self,
            _inputs: &[Unspent],
            _destination_address: &str,
            _amount: Decimal,
        ) -> FedResult<String> {
            Ok(String::new())
        }
        fn sign_raw_transaction_with_key(&self, _tx_hex: &str, _privkey: &str) -> FedResult<String> {
            Ok(String::new())
        }
        fn current_supply(&self) -> FedResult<Decimal> {
            Ok(Decimal::ZERO)
        }
    }

    struct SilentMessenger;

    impl Messenger for SilentMessenger {
        fn produce_block(&self, _height: u64, _block_hex: &str) -> FedResult<()> {
            Ok(())
        }
        fn produce_sig(&self, _height: u64, _sig_hex: &str) -> FedResult<()> {
            Ok(())
        }
        fn consume_block(&self, _height: u64) -> FedResult<Option<String>> {
            Ok(None)
        }
        fn consume_sigs(&self, _height: u64) -> FedResult<Vec<ReceivedSig>> {
            Ok(vec![])
        }
        fn reconnect(&self) -> FedResult<()> {
            Ok(())
        }
    }

    #[test]
    fn stop_causes_the_background_thread_to_exit_promptly() {
        let pubkeys = vec![vec![0x02; 33], vec![0x02; 33], vec![0x02; 33]];
        let script = fedsign_crypto::redeem_script::build_multisig_script(2, &pubkeys);
        let config = FederationConfig {
            num_nodes: 3,
            threshold: 2,
            node_index: 0,
            peers: vec![],
            block_interval: Duration::from_millis(30),
            redeem_script_hex: hex::encode(script),
            messenger_kind: MessengerKind::LogBus,
            wallet_passphrase: String::new(),
            use_hsm: false,
            inflation: None,
        };
        let rpc = Arc::new(CountingRpc {
            calls: AtomicU64::new(0),
        });
        let messenger = Arc::new(SilentMessenger);
        let coordinator =
            RoundCoordinator::new(rpc, None, messenger, config).expect("should build coordinator");

        let mut supervisor = Supervisor::start(coordinator);
        thread::sleep(Duration::from_millis(50));
        supervisor.stop();
        supervisor.join().expect("thread should not panic");
        assert!(!supervisor.stopped(), "an orderly stop is not a fault");
    }

    struct AlwaysUnreachableRpc;

    impl ChainRpc for AlwaysUnreachableRpc {
        fn get_block_count(&self) -> FedResult<u64> {
            Err(FedError::rpc_transport("connection refused"))
        }
        fn get_new_block_hex(&self) -> FedResult<String> {
            unreachable!("never called: get_block_count fails first")
        }
        fn test_proposed_block(&self, _block_hex: &str) -> FedResult<()> {
            Ok(())
        }
        fn sign_block(&self, _block_hex: &str) -> FedResult<String> {
            Ok(String::new())
        }
        fn combine_block_sigs(
            &self,
            _block_hex: &str,
            _sigs_hex: &[String],
            _redeem_script_hex: &str,
        ) -> FedResult<String> {
            Ok(String::new())
        }
        fn submit_block(&self, _signed_block_hex: &str) -> FedResult<()> {
            Ok(())
        }
        fn send_raw_transaction(&self, tx_hex: &str) -> FedResult<String> {
            Ok(tx_hex.to_string())
        }
        fn wallet_passphrase(&self, _passphrase: &str, _seconds: u64) -> FedResult<()> {
            Ok(())
        }
        fn list_unspent_for_script(&self, _script_pub_key_hex: &str) -> FedResult<Vec<Unspent>> {
            Ok(vec![])
        }
        fn create_raw_transaction(
            &self,
            _inputs: &[Unspent],
            _destination_address: &str,
            _amount: Decimal,
        ) -> FedResult<String> {
            Ok(String::new())
        }
        fn sign_raw_transaction_with_key(&self, _tx_hex: &str, _privkey: &str) -> FedResult<String> {
            Ok(String::new())
        }
        fn current_supply(&self) -> FedResult<Decimal> {
            Ok(Decimal::ZERO)
        }
    }

    #[test]
    fn persistent_rpc_transport_faults_escalate_to_fatal() {
        let pubkeys = vec![vec![0x02; 33], vec![0x02; 33], vec![0x02; 33]];
        let script = fedsign_crypto::redeem_script::build_multisig_script(2, &pubkeys);
        let config = FederationConfig {
            num_nodes: 3,
            threshold: 2,
            node_index: 0,
            peers: vec![],
            block_interval: Duration::from_millis(5),
            redeem_script_hex: hex::encode(script),
            messenger_kind: MessengerKind::LogBus,
            wallet_passphrase: String::new(),
            use_hsm: false,
            inflation: None,
        };
        let rpc = Arc::new(AlwaysUnreachableRpc);
        let messenger = Arc::new(SilentMessenger);
        let coordinator =
            RoundCoordinator::new(rpc, None, messenger, config).expect("should build coordinator");

        let mut supervisor = Supervisor::start(coordinator);
        thread::sleep(Duration::from_millis(200));
        supervisor
            .join()
            .expect("thread should not panic, it should exit via the fatal path");
        assert!(
            supervisor.stopped(),
            "persistent rpc_transport must eventually surface as a fatal fault"
        );
    }
}
