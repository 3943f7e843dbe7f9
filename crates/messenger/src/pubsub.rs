// Path: crates/messenger/src/pubsub.rs
//! The default messenger transport: one ZeroMQ `PUB` socket bound to this
//! node's own endpoint, and one `SUB` socket per peer. Reimplements
//! `original_source/federation/zmqmessenger.py`'s `ZmqProducer`/
//! `ZmqConsumer`/`ZmqMessenger` with the `zmq` crate.

use crate::wire::{decode_new_block, decode_new_sig};
use fedsign_api::error::{FedError, FedResult};
use fedsign_api::messenger::Messenger;
use fedsign_types::config::PeerEndpoint;
use fedsign_types::messages::{NewBlockMessage, NewSigMessage, ReceivedSig, TOPIC_NEW_BLOCK, TOPIC_NEW_SIG};
use parking_lot::Mutex;
use std::net::TcpStream;
use std::time::Duration;

/// Lower bound of the ZeroMQ socket's own reconnect backoff.
const RECONNECT_IVL_MS: i32 = 500;
/// Upper bound (cap) of the same backoff.
const RECONNECT_IVL_MAX_MS: i32 = 10_000;

/// One subscriber socket paired with the peer it is connected to, so
/// [`ZmqMessenger::reconnect`] can log per-peer outcomes and
/// [`ZmqMessenger::consume_sigs`] can tag a message with its source index.
struct Subscriber {
    peer_index: u32,
    endpoint: PeerEndpoint,
    socket: zmq::Socket,
}

pub struct ZmqMessenger {
    context: zmq::Context,
    /// ZeroMQ sockets are not safe to share across threads without external
    /// synchronization; mirrors `consumers` below.
    publisher: Mutex<zmq::Socket>,
    consumers: Mutex<Vec<Subscriber>>,
    peers: Vec<PeerEndpoint>,
    my_id: u32,
}

impl ZmqMessenger {
    /// Binds the publisher to `peers[my_id]` and connects one subscriber to
    /// every other entry in `peers`. `context` is owned by the supervisor
    /// and passed in explicitly (§9: no module-level mutable socket state).
    pub fn new(context: zmq::Context, peers: Vec<PeerEndpoint>, my_id: u32) -> FedResult<Self> {
        let own = peers
            .get(my_id as usize)
            .ok_or_else(|| FedError::messenger_transport("my_id out of range for peers list"))?;

        let publisher = context
            .socket(zmq::PUB)
            .map_err(|e| FedError::messenger_transport(format!("failed to create PUB socket: {e}")))?;
        publisher
            .bind(&format!("tcp://*:{}", own.port))
            .map_err(|e| FedError::messenger_transport(format!("failed to bind publisher: {e}")))?;

        let consumers = connect_all_consumers(&context, &peers, my_id)?;

        Ok(Self {
            context,
            publisher: Mutex::new(publisher),
            consumers: Mutex::new(consumers),
            peers,
            my_id,
        })
    }

    fn produce(&self, topic: &str, payload_json: &str) -> FedResult<()> {
        let frame = crate::wire::mogrify(topic, payload_json);
        self.publisher
            .lock()
            .send(frame.as_bytes(), 0)
            .map_err(|e| FedError::messenger_transport(format!("publish failed: {e}")))
    }

    fn drain_subscriber(socket: &zmq::Socket) -> Vec<String> {
        let mut frames = Vec::new();
        loop {
            match socket.recv_string(zmq::DONTWAIT) {
                Ok(Ok(text)) => frames.push(text),
                Ok(Err(_bytes)) => {
                    tracing::warn!(target: "messenger", event = "protocol_invalid", "non-UTF8 frame dropped");
                }
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => {
                    tracing::warn!(target: "messenger", event = "messenger_transport", error = %e);
                    break;
                }
            }
        }
        frames
    }
}

impl Messenger for ZmqMessenger {
    fn produce_block(&self, height: u64, block_hex: &str) -> FedResult<()> {
        let msg = NewBlockMessage {
            height,
            block_hex: block_hex.to_string(),
        };
        let json = serde_json::to_string(&msg)
            .map_err(|e| FedError::messenger_transport(format!("encode failed: {e}")))?;
        self.produce(TOPIC_NEW_BLOCK, &json)
    }

    fn produce_sig(&self, height: u64, sig_hex: &str) -> FedResult<()> {
        let msg = NewSigMessage {
            height,
            sig_hex: sig_hex.to_string(),
        };
        let json = serde_json::to_string(&msg)
            .map_err(|e| FedError::messenger_transport(format!("encode failed: {e}")))?;
        self.produce(TOPIC_NEW_SIG, &json)
    }

    fn consume_block(&self, height: u64) -> FedResult<Option<String>> {
        let consumers = self.consumers.lock();
        for sub in consumers.iter() {
            for raw in Self::drain_subscriber(&sub.socket) {
                match decode_new_block(&raw) {
                    Ok(Some(msg)) if msg.height == height => return Ok(Some(msg.block_hex)),
                    Ok(_) => {} // different topic or stale/future height
                    Err(e) => tracing::warn!(target: "messenger", event = "protocol_invalid", error = %e),
                }
            }
        }
        Ok(None)
    }

    fn consume_sigs(&self, height: u64) -> FedResult<Vec<ReceivedSig>> {
        let consumers = self.consumers.lock();
        let mut out = Vec::new();
        for sub in consumers.iter() {
            for raw in Self::drain_subscriber(&sub.socket) {
                match decode_new_sig(&raw) {
                    Ok(Some(msg)) if msg.height == height => out.push(ReceivedSig {
                        from: sub.peer_index,
                        message: msg,
                    }),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(target: "messenger", event = "protocol_invalid", error = %e),
                }
            }
        }
        Ok(out)
    }

    fn reconnect(&self) -> FedResult<()> {
        tracing::info!(target: "messenger", event = "reconnect", "reconnecting consumers...");
        let fresh = connect_all_consumers(&self.context, &self.peers, self.my_id)?;
        for sub in &fresh {
            let probe = TcpStream::connect_timeout(
                &format!("{}:{}", sub.endpoint.host, sub.endpoint.port)
                    .parse()
                    .map_err(|e| FedError::messenger_transport(format!("bad peer address: {e}")))?,
                Duration::from_millis(500),
            );
            match probe {
                Ok(_) => tracing::info!(target: "messenger", event = "reconnect_probe", peer = sub.peer_index, result = "succeeded"),
                Err(e) => tracing::info!(target: "messenger", event = "reconnect_probe", peer = sub.peer_index, result = "failed", error = %e),
            }
        }
        *self.consumers.lock() = fresh;
        Ok(())
    }
}

fn connect_all_consumers(
    context: &zmq::Context,
    peers: &[PeerEndpoint],
    my_id: u32,
) -> FedResult<Vec<Subscriber>> {
    let mut consumers = Vec::new();
    for (idx, peer) in peers.iter().enumerate() {
        if idx as u32 == my_id {
            continue; // a node does not subscribe to its own publisher
        }
        let socket = context
            .socket(zmq::SUB)
            .map_err(|e| FedError::messenger_transport(format!("failed to create SUB socket: {e}")))?;
        socket
            .set_reconnect_ivl(RECONNECT_IVL_MS)
            .map_err(|e| FedError::messenger_transport(format!("set_reconnect_ivl: {e}")))?;
        socket
            .set_reconnect_ivl_max(RECONNECT_IVL_MAX_MS)
            .map_err(|e| FedError::messenger_transport(format!("set_reconnect_ivl_max: {e}")))?;
        socket
            .connect(&format!("tcp://{}:{}", peer.host, peer.port))
            .map_err(|e| FedError::messenger_transport(format!("connect failed: {e}")))?;
        socket
            .set_subscribe(TOPIC_NEW_BLOCK.as_bytes())
            .map_err(|e| FedError::messenger_transport(format!("subscribe failed: {e}")))?;
        socket
            .set_subscribe(TOPIC_NEW_SIG.as_bytes())
            .map_err(|e| FedError::messenger_transport(format!("subscribe failed: {e}")))?;
        consumers.push(Subscriber {
            peer_index: idx as u32,
            endpoint: peer.clone(),
            socket,
        });
    }
    Ok(consumers)
}
