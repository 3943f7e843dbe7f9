// Path: crates/crypto/src/redeem_script.rs
//! Parsing of the m-of-n `OP_CHECKMULTISIG` redeem script into the ordered
//! list of member public keys, so the proposer can map a signer's node
//! index to the public key it must verify against.

/// A standard compressed-pubkey push is a single length byte (`0x21` = 33)
/// followed by the 33-byte SEC1-compressed point.
const COMPRESSED_PUBKEY_PUSH: u8 = 0x21;

/// Extracts the ordered list of compressed public keys embedded in an
/// `OP_m <pubkey>... OP_n OP_CHECKMULTISIG` redeem script.
///
/// The position of a member's key in this list is its node index, per the
/// invariant in §3 ("a partial signature is accepted only if it verifies
/// ... under the redeem script's position-i public key").
pub fn extract_pubkeys(redeem_script: &[u8]) -> Result<Vec<Vec<u8>>, String> {
    let mut pubkeys = Vec::new();
    let mut i = 0usize;
    while i < redeem_script.len() {
        let opcode = redeem_script[i];
        if opcode == COMPRESSED_PUBKEY_PUSH {
            let start = i + 1;
            let end = start + 33;
            if end > redeem_script.len() {
                return Err("truncated pubkey push in redeem script".to_string());
            }
            pubkeys.push(redeem_script[start..end].to_vec());
            i = end;
        } else {
            i += 1;
        }
    }
    if pubkeys.is_empty() {
        return Err("no compressed pubkeys found in redeem script".to_string());
    }
    Ok(pubkeys)
}

/// Builds a minimal `OP_m <pubkeys...> OP_n OP_CHECKMULTISIG` script for a
/// federation, used by tests and by the CLI's script-generation helper.
pub fn build_multisig_script(threshold: u32, pubkeys: &[Vec<u8>]) -> Vec<u8> {
    let mut script = Vec::new();
    script.push(0x50 + threshold as u8); // OP_m
    for pk in pubkeys {
        script.push(COMPRESSED_PUBKEY_PUSH);
        script.extend_from_slice(pk);
    }
    script.push(0x50 + pubkeys.len() as u8); // OP_n
    script.push(0xae); // OP_CHECKMULTISIG
    script
}
