// Path: crates/inflation/src/tx_builder.rs
//! Builds and signs the reissuance transaction for a height at which
//! [`crate::policy::fires`] returned `true`. Talks to the chain daemon only
//! through [`ChainRpc`]; never touches the network itself.

use fedsign_api::error::{FedError, FedResult};
use fedsign_api::rpc::ChainRpc;
use fedsign_types::inflation::InflationConfig;
use rust_decimal::{Decimal, RoundingStrategy};

/// Fixed-point precision of reissuance amounts: 8 fractional digits.
const AMOUNT_SCALE: u32 = 8;

/// `round_down(current_supply * rate)` at 8 decimal places, rounding toward
/// zero (never rounding an inflation amount up).
pub fn compute_amount(current_supply: Decimal, rate: Decimal) -> Decimal {
    (current_supply * rate).round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero)
}

/// Builds, funds and signs the reissuance transaction described by
/// `config`, returning the signed raw transaction hex ready for
/// `sendrawtransaction`.
///
/// Errors here are always [`fedsign_api::FedErrorKind::RpcApplication`] or
/// [`fedsign_api::FedErrorKind::RpcTransport`] — the caller (the round
/// coordinator) treats a failure here as non-fatal to the round: it logs
/// and proceeds without the inflation output (§4.3).
pub fn build_reissuance_tx(rpc: &dyn ChainRpc, config: &InflationConfig) -> FedResult<String> {
    let current_supply = rpc.current_supply()?;
    let amount = compute_amount(current_supply, config.rate);

    let inputs = rpc.list_unspent_for_script(&config.reissuance_script_hex)?;
    if inputs.is_empty() {
        return Err(FedError::rpc_application(
            "no unspent outputs available to fund the reissuance transaction",
        ));
    }

    let raw_hex = rpc.create_raw_transaction(&inputs, &config.destination_address, amount)?;
    rpc.sign_raw_transaction_with_key(&raw_hex, &config.reissuance_privkey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedsign_api::rpc::Unspent;
    use std::cell::RefCell;
    use std::str::FromStr;

    #[test]
    fn compute_amount_matches_the_worked_example() {
        // rate 1%, supply 1,000,000 -> 10,000.00000000
        let supply = Decimal::from_str("1000000").expect("valid decimal");
        let rate = Decimal::from_str("0.01").expect("valid decimal");
        let amount = compute_amount(supply, rate);
        assert_eq!(amount, Decimal::from_str("10000.00000000").expect("valid decimal"));
    }

    #[test]
    fn compute_amount_truncates_rather_than_rounds() {
        // 0.333... at 8dp should truncate down, never round up.
        let supply = Decimal::from_str("1").expect("valid decimal");
        let rate = Decimal::from_str("0.333333335").expect("valid decimal");
        let amount = compute_amount(supply, rate);
        assert_eq!(amount, Decimal::from_str("0.33333333").expect("valid decimal"));
    }

    struct StubRpc {
        supply: Decimal,
        unspent: Vec<Unspent>,
        created: RefCell<Option<(String, Decimal)>>,
    }

    impl ChainRpc for StubRpc {
        fn get_block_count(&self) -> FedResult<u64> {
            Ok(0)
        }
        fn get_new_block_hex(&self) -> FedResult<String> {
            Ok(String::new())
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
        fn send_raw_transaction(&self, _tx_hex: &str) -> FedResult<String> {
            Ok(String::new())
        }
        fn wallet_passphrase(&self, _passphrase: &str, _seconds: u64) -> FedResult<()> {
            Ok(())
        }
        fn list_unspent_for_script(&self, _script_pub_key_hex: &str) -> FedResult<Vec<Unspent>> {
            Ok(self.unspent.clone())
        }
        fn create_raw_transaction(
            &self,
            _inputs: &[Unspent],
            destination_address: &str,
            amount: Decimal,
        ) -> FedResult<String> {
            *self.created.borrow_mut() = Some((destination_address.to_string(), amount));
            Ok("raw".to_string())
        }
        fn sign_raw_transaction_with_key(&self, tx_hex: &str, _privkey: &str) -> FedResult<String> {
            Ok(format!("signed:{tx_hex}"))
        }
        fn current_supply(&self) -> FedResult<Decimal> {
            Ok(self.supply)
        }
    }

    fn config() -> InflationConfig {
        InflationConfig::from_cli(
            Decimal::from_str("0.01").expect("valid decimal"),
            10,
            "destination".into(),
            "51".into(),
            "key".into(),
        )
        .expect("nonzero rate and period")
    }

    #[test]
    fn build_reissuance_tx_signs_the_created_transaction() {
        let rpc = StubRpc {
            supply: Decimal::from_str("1000000").expect("valid decimal"),
            unspent: vec![Unspent {
                txid: "a".repeat(64),
                vout: 0,
                amount: Decimal::from_str("500000").expect("valid decimal"),
                script_pub_key_hex: "51".into(),
            }],
            created: RefCell::new(None),
        };
        let signed = build_reissuance_tx(&rpc, &config()).expect("should build");
        assert_eq!(signed, "signed:raw");
        let created = rpc.created.borrow();
        let (destination, amount) = created.as_ref().expect("create_raw_transaction was called");
        assert_eq!(destination, "destination");
        assert_eq!(*amount, Decimal::from_str("10000.00000000").expect("valid decimal"));
    }

    #[test]
    fn build_reissuance_tx_fails_without_funding_utxos() {
        let rpc = StubRpc {
            supply: Decimal::from_str("1000000").expect("valid decimal"),
            unspent: vec![],
            created: RefCell::new(None),
        };
        assert!(build_reissuance_tx(&rpc, &config()).is_err());
    }
}
