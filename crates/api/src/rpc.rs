// Path: crates/api/src/rpc.rs
use crate::error::FedResult;

/// One unspent output as reported by `listunspent`, the minimum shape the
/// inflation engine needs to fund a reissuance transaction.
#[derive(Debug, Clone)]
pub struct Unspent {
    pub txid: String,
    pub vout: u32,
    pub amount: rust_decimal::Decimal,
    pub script_pub_key_hex: String,
}

/// Synchronous, typed client to the local chain daemon (§4.1).
///
/// Every method is idempotent at the protocol level and may be retried by
/// the caller after a [`crate::FedErrorKind::RpcTransport`]. A
/// [`crate::FedErrorKind::RpcApplication`] means the daemon understood the
/// request and rejected it; retrying the same request is not expected to
/// help.
pub trait ChainRpc: Send + Sync {
    /// Current chain height.
    fn get_block_count(&self) -> FedResult<u64>;

    /// Ask the daemon to assemble an unsigned block template.
    fn get_new_block_hex(&self) -> FedResult<String>;

    /// Validate a received candidate without adding it to the chain.
    fn test_proposed_block(&self, block_hex: &str) -> FedResult<()>;

    /// Produce this node's partial signature over `block_hex` (software
    /// signer path only; the hardware path never calls this).
    fn sign_block(&self, block_hex: &str) -> FedResult<String>;

    /// Assemble the final block from `m` partial signatures, in the order
    /// given, against `redeem_script_hex`.
    fn combine_block_sigs(
        &self,
        block_hex: &str,
        sigs_hex: &[String],
        redeem_script_hex: &str,
    ) -> FedResult<String>;

    /// Submit a fully signed block.
    fn submit_block(&self, signed_block_hex: &str) -> FedResult<()>;

    /// Broadcast a raw transaction (used for the reissuance transaction).
    fn send_raw_transaction(&self, tx_hex: &str) -> FedResult<String>;

    /// Unlock the wallet for `seconds`, if it is encrypted. A no-op on an
    /// unencrypted wallet is still expected to succeed.
    fn wallet_passphrase(&self, passphrase: &str, seconds: u64) -> FedResult<()>;

    /// List unspent outputs controlled by `script_pub_key_hex`, used to
    /// fund the reissuance transaction.
    fn list_unspent_for_script(&self, script_pub_key_hex: &str) -> FedResult<Vec<Unspent>>;

    /// Build an unsigned raw transaction sending `amount` of the reissuance
    /// asset to `destination_address`, spending `inputs`.
    fn create_raw_transaction(
        &self,
        inputs: &[Unspent],
        destination_address: &str,
        amount: rust_decimal::Decimal,
    ) -> FedResult<String>;

    /// Sign `tx_hex` with `privkey`.
    fn sign_raw_transaction_with_key(&self, tx_hex: &str, privkey: &str) -> FedResult<String>;

    /// Current circulating supply of the reissuance asset, used by the
    /// inflation engine to compute `round_down(current_supply * rate)`.
    fn current_supply(&self) -> FedResult<rust_decimal::Decimal>;
}
