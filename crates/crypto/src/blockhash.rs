// Path: crates/crypto/src/blockhash.rs
//! Computes the digest that every partial signature is taken over.
//!
//! The chain daemon returns a block as a hex-encoded serialized block; the
//! federation signs the double-SHA256 of its 80-byte header, matching the
//! Bitcoin/Elements header-hashing convention the sidechain daemon itself
//! uses to identify blocks.
use sha2::{Digest, Sha256};

const HEADER_LEN: usize = 80;

/// Double-SHA256 of the first 80 bytes of `block_hex` once decoded.
pub fn header_hash(block_hex: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(block_hex).map_err(|e| format!("invalid block hex: {e}"))?;
    if bytes.len() < HEADER_LEN {
        return Err(format!(
            "block too short to contain an {HEADER_LEN}-byte header: {} bytes",
            bytes.len()
        ));
    }
    let header = bytes
        .get(..HEADER_LEN)
        .ok_or_else(|| "block too short to contain a header".to_string())?;
    let first = Sha256::digest(header);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_hex() {
        assert!(header_hash("not hex").is_err());
    }

    #[test]
    fn rejects_blocks_shorter_than_a_header() {
        let short = hex::encode([0u8; 40]);
        assert!(header_hash(&short).is_err());
    }

    #[test]
    fn hashes_only_the_header_and_ignores_trailing_bytes() {
        let mut bytes = vec![0x11; HEADER_LEN];
        bytes.extend_from_slice(&[0x22; 200]);
        let block_hex = hex::encode(&bytes);

        let mut bytes_with_different_body = vec![0x11; HEADER_LEN];
        bytes_with_different_body.extend_from_slice(&[0x33; 500]);
        let other_hex = hex::encode(&bytes_with_different_body);

        assert_eq!(
            header_hash(&block_hex).expect("should hash"),
            header_hash(&other_hex).expect("should hash")
        );
    }

    #[test]
    fn different_headers_hash_differently() {
        let a = hex::encode(vec![0x11; HEADER_LEN]);
        let b = hex::encode(vec![0x12; HEADER_LEN]);
        assert_ne!(header_hash(&a).expect("should hash"), header_hash(&b).expect("should hash"));
    }
}
