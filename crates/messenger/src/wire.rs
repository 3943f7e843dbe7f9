// Path: crates/messenger/src/wire.rs
//! The exact `mogrify`/`demogrify` framing from
//! `original_source/federation/zmqmessenger.py`, reimplemented in Rust: a
//! frame is `"<topic> " + json`, and the reader splits at the first `{`
//! rather than at the first space, so topic ids never need escaping.

use fedsign_types::messages::{NewBlockMessage, NewSigMessage, TOPIC_NEW_BLOCK, TOPIC_NEW_SIG};

/// A decoded frame: the topic id plus its still-unparsed JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub topic: String,
    pub payload: String,
}

/// Encodes `payload_json` under `topic` as `"<topic> <json>"`.
pub fn mogrify(topic: &str, payload_json: &str) -> String {
    format!("{topic} {payload_json}")
}

/// Splits a raw frame at the first `{`, matching the Python reference's
/// `topicmsg.find('{')`. Returns `None` if there is no `{` at all (not a
/// frame this messenger understands).
pub fn demogrify(raw: &str) -> Option<Frame> {
    let brace_pos = raw.find('{')?;
    let topic = raw[..brace_pos].trim().to_string();
    let payload = raw[brace_pos..].to_string();
    Some(Frame { topic, payload })
}

/// Encodes a `new_block` message as a complete wire frame.
pub fn encode_new_block(msg: &NewBlockMessage) -> Result<String, String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    Ok(mogrify(TOPIC_NEW_BLOCK, &json))
}

/// Encodes a `new_sig` message as a complete wire frame.
pub fn encode_new_sig(msg: &NewSigMessage) -> Result<String, String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    Ok(mogrify(TOPIC_NEW_SIG, &json))
}

/// Attempts to decode a raw frame as a `new_block` message. Returns `Ok(None)`
/// if the frame is for a different topic (not an error); returns `Err` only
/// for a frame that claims the `new_block` topic but fails to parse as JSON,
/// which the caller treats as `protocol_invalid`.
pub fn decode_new_block(raw: &str) -> Result<Option<NewBlockMessage>, String> {
    let frame = match demogrify(raw) {
        Some(f) => f,
        None => return Ok(None),
    };
    if frame.topic != TOPIC_NEW_BLOCK {
        return Ok(None);
    }
    serde_json::from_str(&frame.payload)
        .map(Some)
        .map_err(|e| format!("malformed new_block frame: {e}"))
}

/// Attempts to decode a raw frame as a `new_sig` message. Same `Ok(None)` vs
/// `Err` convention as [`decode_new_block`].
pub fn decode_new_sig(raw: &str) -> Result<Option<NewSigMessage>, String> {
    let frame = match demogrify(raw) {
        Some(f) => f,
        None => return Ok(None),
    };
    if frame.topic != TOPIC_NEW_SIG {
        return Ok(None);
    }
    serde_json::from_str(&frame.payload)
        .map(Some)
        .map_err(|e| format!("malformed new_sig frame: {e}"))
}
