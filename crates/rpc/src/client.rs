// Path: crates/rpc/src/client.rs
use crate::wire::{RpcRequest, RpcResponse};
use fedsign_api::error::{FedError, FedResult};
use fedsign_api::rpc::{ChainRpc, Unspent};
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Host/port/credentials for the local chain daemon's JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcEndpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Synchronous JSON-RPC 1.0 client, one HTTP connection reused across every
/// call (via `reqwest`'s connection pooling), matching the "RPC connection
/// owned exclusively by the coordinator" resource rule (§5).
pub struct ChainDaemonClient {
    endpoint: RpcEndpoint,
    http: Client,
    next_id: AtomicU64,
}

impl ChainDaemonClient {
    pub fn new(endpoint: RpcEndpoint) -> FedResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FedError::rpc_transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    fn call(&self, method: &'static str, params: Vec<Value>) -> FedResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest { method, params, id };
        let url = format!("http://{}:{}/", self.endpoint.host, self.endpoint.port);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.endpoint.user, Some(&self.endpoint.password))
            .json(&request)
            .send()
            .map_err(|e| FedError::rpc_transport(format!("{method}: {e}")))?;

        if !response.status().is_success() && response.status().as_u16() != 500 {
            // The daemon uses HTTP 500 to carry JSON-RPC application errors,
            // same as Bitcoin Core; anything else is a transport problem.
            return Err(FedError::rpc_transport(format!(
                "{method}: unexpected HTTP status {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .map_err(|e| FedError::rpc_transport(format!("{method}: malformed response: {e}")))?;

        if let Some(error) = body.error {
            return Err(FedError::rpc_application(format!("{method}: {error}")));
        }
        body.result
            .ok_or_else(|| FedError::rpc_application(format!("{method}: empty result")))
    }

    fn call_string(&self, method: &'static str, params: Vec<Value>) -> FedResult<String> {
        let value = self.call(method, params)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FedError::rpc_application(format!("{method}: expected a string result")))
    }
}

impl ChainRpc for ChainDaemonClient {
    fn get_block_count(&self) -> FedResult<u64> {
        let value = self.call("getblockcount", vec![])?;
        value
            .as_u64()
            .ok_or_else(|| FedError::rpc_application("getblockcount: expected an integer"))
    }

    fn get_new_block_hex(&self) -> FedResult<String> {
        self.call_string("getnewblockhex", vec![])
    }

    fn test_proposed_block(&self, block_hex: &str) -> FedResult<()> {
        self.call("testproposedblock", vec![json!(block_hex)])?;
        Ok(())
    }

    fn sign_block(&self, block_hex: &str) -> FedResult<String> {
        self.call_string("signblock", vec![json!(block_hex)])
    }

    fn combine_block_sigs(
        &self,
        block_hex: &str,
        sigs_hex: &[String],
        redeem_script_hex: &str,
    ) -> FedResult<String> {
        self.call_string(
            "combineblocksigs",
            vec![json!(block_hex), json!(sigs_hex), json!(redeem_script_hex)],
        )
    }

    fn submit_block(&self, signed_block_hex: &str) -> FedResult<()> {
        self.call("submitblock", vec![json!(signed_block_hex)])?;
        Ok(())
    }

    fn send_raw_transaction(&self, tx_hex: &str) -> FedResult<String> {
        self.call_string("sendrawtransaction", vec![json!(tx_hex)])
    }

    fn wallet_passphrase(&self, passphrase: &str, seconds: u64) -> FedResult<()> {
        self.call("walletpassphrase", vec![json!(passphrase), json!(seconds)])?;
        Ok(())
    }

    fn list_unspent_for_script(&self, script_pub_key_hex: &str) -> FedResult<Vec<Unspent>> {
        let value = self.call(
            "listunspent",
            vec![json!(0), json!(9_999_999), json!([script_pub_key_hex])],
        )?;
        let entries = value
            .as_array()
            .ok_or_else(|| FedError::rpc_application("listunspent: expected an array"))?;
        entries.iter().map(parse_unspent).collect()
    }

    fn create_raw_transaction(
        &self,
        inputs: &[Unspent],
        destination_address: &str,
        amount: Decimal,
    ) -> FedResult<String> {
        let inputs_json: Vec<Value> = inputs
            .iter()
            .map(|u| json!({ "txid": u.txid, "vout": u.vout }))
            .collect();
        let outputs_json = json!({ destination_address: amount.to_string() });
        self.call_string(
            "createrawtransaction",
            vec![json!(inputs_json), outputs_json],
        )
    }

    fn sign_raw_transaction_with_key(&self, tx_hex: &str, privkey: &str) -> FedResult<String> {
        let value = self.call(
            "signrawtransactionwithkey",
            vec![json!(tx_hex), json!([privkey])],
        )?;
        let signed_hex = value
            .get("hex")
            .and_then(Value::as_str)
            .ok_or_else(|| FedError::rpc_application("signrawtransactionwithkey: missing hex"))?;
        let complete = value
            .get("complete")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !complete {
            return Err(FedError::rpc_application(
                "signrawtransactionwithkey: signing incomplete",
            ));
        }
        Ok(signed_hex.to_string())
    }

    fn current_supply(&self) -> FedResult<Decimal> {
        let value = self.call("getsupplyinfo", vec![])?;
        let supply_str = value
            .get("total")
            .and_then(Value::as_str)
            .ok_or_else(|| FedError::rpc_application("getsupplyinfo: missing total"))?;
        Decimal::from_str(supply_str)
            .map_err(|e| FedError::rpc_application(format!("getsupplyinfo: bad amount: {e}")))
    }
}

fn parse_unspent(value: &Value) -> FedResult<Unspent> {
    let txid = value
        .get("txid")
        .and_then(Value::as_str)
        .ok_or_else(|| FedError::rpc_application("listunspent: entry missing txid"))?
        .to_string();
    let vout = value
        .get("vout")
        .and_then(Value::as_u64)
        .ok_or_else(|| FedError::rpc_application("listunspent: entry missing vout"))? as u32;
    let amount_str = value
        .get("amount")
        .and_then(Value::as_str)
        .ok_or_else(|| FedError::rpc_application("listunspent: entry missing amount"))?;
    let amount = Decimal::from_str(amount_str)
        .map_err(|e| FedError::rpc_application(format!("listunspent: bad amount: {e}")))?;
    let script_pub_key_hex = value
        .get("scriptPubKey")
        .and_then(Value::as_str)
        .ok_or_else(|| FedError::rpc_application("listunspent: entry missing scriptPubKey"))?
        .to_string();
    Ok(Unspent {
        txid,
        vout,
        amount,
        script_pub_key_hex,
    })
}
