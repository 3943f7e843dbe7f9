// Path: crates/messenger/src/logbus.rs
//! The legacy "log bus" messenger variant: connectivity is established by
//! whatever owns the [`LogBusTransport`] (a serial link, a Unix socket, a
//! test harness), and this module only frames/parses messages over it using
//! the same `mogrify`/`demogrify` wire format as [`crate::pubsub`].
//!
//! Grounded in `original_source/federation/zmqmessenger.py`'s observation
//! that the framing and the transport are separable concerns; this variant
//! keeps the former and lets the latter be anything byte-oriented.

use crate::wire::{decode_new_block, decode_new_sig, mogrify};
use fedsign_api::error::{FedError, FedResult};
use fedsign_api::messenger::Messenger;
use fedsign_types::messages::{NewBlockMessage, NewSigMessage, ReceivedSig, TOPIC_NEW_BLOCK, TOPIC_NEW_SIG};
use parking_lot::Mutex;

/// A bidirectional, line-oriented byte transport. One frame per line;
/// `recv_line` returns `Ok(None)` when no frame is currently available
/// (non-blocking, matching the pub-sub messenger's polling style).
pub trait LogBusTransport: Send {
    fn send_line(&mut self, line: &str) -> Result<(), String>;
    fn recv_line(&mut self) -> Result<Option<String>, String>;
}

/// Tags every inbound frame with the peer index that [`LogBusMessenger`]'s
/// owner is expected to have wired the transport to. A log bus carries
/// frames from exactly one counterparty per instance, unlike the pub-sub
/// fabric's many-subscribers fan-in.
pub struct LogBusMessenger {
    transport: Mutex<Box<dyn LogBusTransport>>,
    peer_index: u32,
}

impl LogBusMessenger {
    pub fn new(transport: Box<dyn LogBusTransport>, peer_index: u32) -> Self {
        Self {
            transport: Mutex::new(transport),
            peer_index,
        }
    }

    fn drain(&self) -> FedResult<Vec<String>> {
        let mut transport = self.transport.lock();
        let mut lines = Vec::new();
        loop {
            match transport.recv_line() {
                Ok(Some(line)) => lines.push(line),
                Ok(None) => break,
                Err(e) => return Err(FedError::messenger_transport(e)),
            }
        }
        Ok(lines)
    }
}

impl Messenger for LogBusMessenger {
    fn produce_block(&self, height: u64, block_hex: &str) -> FedResult<()> {
        let msg = NewBlockMessage {
            height,
            block_hex: block_hex.to_string(),
        };
        let json = serde_json::to_string(&msg)
            .map_err(|e| FedError::messenger_transport(format!("encode failed: {e}")))?;
        self.transport
            .lock()
            .send_line(&mogrify(TOPIC_NEW_BLOCK, &json))
            .map_err(FedError::messenger_transport)
    }

    fn produce_sig(&self, height: u64, sig_hex: &str) -> FedResult<()> {
        let msg = NewSigMessage {
            height,
            sig_hex: sig_hex.to_string(),
        };
        let json = serde_json::to_string(&msg)
            .map_err(|e| FedError::messenger_transport(format!("encode failed: {e}")))?;
        self.transport
            .lock()
            .send_line(&mogrify(TOPIC_NEW_SIG, &json))
            .map_err(FedError::messenger_transport)
    }

    fn consume_block(&self, height: u64) -> FedResult<Option<String>> {
        for raw in self.drain()? {
            match decode_new_block(&raw) {
                Ok(Some(msg)) if msg.height == height => return Ok(Some(msg.block_hex)),
                Ok(_) => {}
                Err(e) => tracing::warn!(target: "messenger", event = "protocol_invalid", error = %e),
            }
        }
        Ok(None)
    }

    fn consume_sigs(&self, height: u64) -> FedResult<Vec<ReceivedSig>> {
        let mut out = Vec::new();
        for raw in self.drain()? {
            match decode_new_sig(&raw) {
                Ok(Some(msg)) if msg.height == height => out.push(ReceivedSig {
                    from: self.peer_index,
                    message: msg,
                }),
                Ok(_) => {}
                Err(e) => tracing::warn!(target: "messenger", event = "protocol_invalid", error = %e),
            }
        }
        Ok(out)
    }

    fn reconnect(&self) -> FedResult<()> {
        // Connectivity is out of this messenger's hands; nothing to do.
        Ok(())
    }
}
