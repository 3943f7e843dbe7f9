// Path: crates/types/src/messages.rs
use serde::{Deserialize, Serialize};

/// Topic id for a proposed block, per the wire format in the design (§6).
pub const TOPIC_NEW_BLOCK: &str = "10";
/// Topic id for a partial signature.
pub const TOPIC_NEW_SIG: &str = "20";

/// `new_block{height, block_hex}` — a proposed serialized block.
///
/// `#[serde(default)]` on every field plus `#[serde(skip_serializing_if)]`
/// for extras is deliberately absent: unknown fields are ignored by
/// `serde_json` during deserialization without any attribute (extra object
/// keys are simply not matched against struct fields), which is exactly the
/// forward-compatibility behavior the wire format requires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBlockMessage {
    pub height: u64,
    #[serde(rename = "block")]
    pub block_hex: String,
}

/// `new_sig{height, sig_hex}` — a partial signature contributed at `height`.
///
/// The contributing node's index (`from`) is not part of the JSON payload;
/// over the pub-sub transport it is implicit in which subscriber delivered
/// the frame, so the messenger attaches it out-of-band when handing the
/// message to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSigMessage {
    pub height: u64,
    #[serde(rename = "sig")]
    pub sig_hex: String,
}

/// A [`NewSigMessage`] annotated with the peer it arrived from, as consumed
/// by the round coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedSig {
    pub from: u32,
    pub message: NewSigMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_message_ignores_unknown_fields() {
        let json = r#"{"height": 5, "block": "aa", "future_field": 42}"#;
        let msg: NewBlockMessage = serde_json::from_str(json).expect("should parse");
        assert_eq!(msg.height, 5);
        assert_eq!(msg.block_hex, "aa");
    }

    #[test]
    fn new_sig_message_round_trips() {
        let msg = NewSigMessage {
            height: 9,
            sig_hex: "deadbeef".to_string(),
        };
        let json = serde_json::to_string(&msg).expect("should serialize");
        let back: NewSigMessage = serde_json::from_str(&json).expect("should parse");
        assert_eq!(msg, back);
    }
}
