// Path: crates/node/src/main.rs
//! Wires the RPC client, signer, messenger, inflation engine, round
//! coordinator and supervisor together into a runnable federation
//! block-signing node, and translates an operator interrupt into the
//! supervisor's orderly stop/join.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use fedsign_coordinator::{RoundCoordinator, Supervisor};
use fedsign_crypto::HsmSigner;
use fedsign_messenger::ZmqMessenger;
use fedsign_rpc::{ChainDaemonClient, RpcEndpoint};
use fedsign_types::config::{FederationConfig, MessengerKind, PeerEndpoint};
use fedsign_types::inflation::InflationConfig;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NUM_NODES_DEFAULT: u32 = 9;
const THRESHOLD_DEFAULT: u32 = 6;
const BLOCK_INTERVAL_DEFAULT_SECS: u64 = 60;

/// Command-line configuration for one federation block-signing node.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct NodeOpts {
    /// Chain daemon RPC host.
    #[arg(long, env = "RPC_CONNECT")]
    rpc_connect: String,
    /// Chain daemon RPC port.
    #[arg(long, env = "RPC_PORT")]
    rpc_port: u16,
    /// Chain daemon RPC username.
    #[arg(long, env = "RPC_USER")]
    rpc_user: String,
    /// Chain daemon RPC password.
    #[arg(long, env = "RPC_PASSWORD")]
    rpc_password: String,

    /// This node's position in the federation, `i`.
    #[arg(long)]
    id: u32,

    /// Total number of block-signing members, `n`.
    #[arg(long, default_value_t = NUM_NODES_DEFAULT)]
    nnodes: u32,
    /// Signature threshold, `m`.
    #[arg(long, default_value_t = THRESHOLD_DEFAULT)]
    nsigs: u32,
    /// Target time between blocks, in seconds.
    #[arg(long, default_value_t = BLOCK_INTERVAL_DEFAULT_SECS)]
    blocktime: u64,
    /// The m-of-n block-signing redeem script, hex encoded.
    #[arg(long)]
    redeemscript: String,

    /// Messenger transport: `pub-sub` (default) or `log-bus`.
    #[arg(long, default_value = "pub-sub")]
    msgtype: String,
    /// Peer endpoints for the pub-sub messenger, `host:port,host:port,...`,
    /// in node-index order, own entry included.
    #[arg(long, default_value = "")]
    nodes: String,

    /// Wallet passphrase; empty if the wallet is unencrypted.
    #[arg(long, default_value = "")]
    walletpassphrase: String,

    /// Inflation rate `r`, e.g. `0.01` for 1%. Zero disables inflation.
    #[arg(long, default_value = "0")]
    inflationrate: String,
    /// Inflation period in blocks. Zero disables inflation.
    #[arg(long, default_value_t = 0)]
    inflationperiod: u64,
    /// Destination address for inflation payments.
    #[arg(long, default_value = "")]
    inflationaddress: String,
    /// Reissuance token script, hex encoded.
    #[arg(long, default_value = "")]
    reissuancescript: String,
    /// Reissuance private key.
    #[arg(long, default_value = "")]
    reissuanceprivkey: String,

    /// Use a PKCS#11 hardware module to sign blocks instead of the
    /// daemon's own wallet. Requires `KEY_LABEL` and `PKCS11_MODULE_PATH`.
    #[arg(long, default_value_t = false)]
    hsm: bool,
}

fn parse_peers(nodes: &str) -> Result<Vec<PeerEndpoint>> {
    if nodes.is_empty() {
        return Ok(vec![]);
    }
    nodes
        .split(',')
        .map(|entry| {
            let (host, port) = entry
                .rsplit_once(':')
                .ok_or_else(|| anyhow!("peer entry {entry:?} is not in host:port form"))?;
            let port: u16 = port
                .parse()
                .with_context(|| format!("peer entry {entry:?} has an invalid port"))?;
            Ok(PeerEndpoint::new(host, port))
        })
        .collect()
}

fn build_config(opts: &NodeOpts) -> Result<FederationConfig> {
    let messenger_kind = match opts.msgtype.as_str() {
        "pub-sub" => MessengerKind::PubSub,
        "log-bus" => MessengerKind::LogBus,
        other => bail!("unknown --msgtype {other:?}, expected pub-sub or log-bus"),
    };

    let rate = Decimal::from_str(&opts.inflationrate)
        .with_context(|| format!("invalid --inflationrate {:?}", opts.inflationrate))?;
    let inflation = InflationConfig::from_cli(
        rate,
        opts.inflationperiod,
        opts.inflationaddress.clone(),
        opts.reissuancescript.clone(),
        opts.reissuanceprivkey.clone(),
    );

    let config = FederationConfig {
        num_nodes: opts.nnodes,
        threshold: opts.nsigs,
        node_index: opts.id,
        peers: parse_peers(&opts.nodes)?,
        block_interval: Duration::from_secs(opts.blocktime),
        redeem_script_hex: opts.redeemscript.clone(),
        messenger_kind,
        wallet_passphrase: opts.walletpassphrase.clone(),
        use_hsm: opts.hsm,
        inflation,
    };
    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

fn main() -> Result<()> {
    fedsign_telemetry::logging::init();
    let opts = NodeOpts::parse();
    let config = build_config(&opts)?;

    let rpc = Arc::new(ChainDaemonClient::new(RpcEndpoint {
        host: opts.rpc_connect.clone(),
        port: opts.rpc_port,
        user: opts.rpc_user.clone(),
        password: opts.rpc_password.clone(),
    })?);

    let signer = if opts.hsm {
        Some(Arc::new(HsmSigner::new()?) as Arc<dyn fedsign_api::signer::BlockSigner>)
    } else {
        None
    };

    let messenger: Arc<dyn fedsign_api::messenger::Messenger> = match config.messenger_kind {
        MessengerKind::PubSub => {
            let context = zmq::Context::new();
            Arc::new(ZmqMessenger::new(context, config.peers.clone(), config.node_index)?)
        }
        MessengerKind::LogBus => {
            bail!(
                "--msgtype log-bus requires an externally-connected transport; \
                 embed fedsign-coordinator directly and construct a LogBusMessenger instead"
            )
        }
    };

    let coordinator = RoundCoordinator::new(rpc, signer, messenger, config)?;
    let mut supervisor = Supervisor::start(coordinator);

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_handler = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_handler.store(true, Ordering::Relaxed);
    })
    .context("failed to install signal handler")?;

    loop {
        if interrupted.load(Ordering::Relaxed) {
            tracing::info!(target: "node", event = "shutdown_requested");
            supervisor.stop();
            supervisor
                .join()
                .map_err(|e| anyhow!("coordinator thread panicked: {e}"))?;
            return Ok(());
        }
        if supervisor.stopped() {
            supervisor
                .join()
                .map_err(|e| anyhow!("coordinator thread panicked: {e}"))?;
            bail!("coordinator thread stopped unexpectedly on a fatal error");
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
