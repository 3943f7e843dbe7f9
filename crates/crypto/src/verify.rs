// Path: crates/crypto/src/verify.rs
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1};

/// Converts the raw 64-byte `r || s` signature a PKCS#11 `CKM_ECDSA`
/// mechanism returns into the DER encoding the chain daemon's
/// `combineblocksigs`/`testproposedblock` expect.
pub fn der_from_raw_compact(raw: &[u8]) -> Result<Vec<u8>, String> {
    let signature = Signature::from_compact(raw).map_err(|e| e.to_string())?;
    Ok(signature.serialize_der().to_vec())
}

/// Verifies `sig_der` as a valid ECDSA signature over `block_hash` under
/// `pubkey`. This is the local strengthening noted in the design: the
/// proposer does not trust `combineblocksigs` to silently drop bad
/// signatures, it rejects them before they ever reach that call.
pub fn verify_partial_signature(
    block_hash: &[u8; 32],
    sig_der: &[u8],
    pubkey: &[u8],
) -> Result<(), String> {
    let secp = Secp256k1::verification_only();
    let message = Message::from_digest_slice(block_hash).map_err(|e| e.to_string())?;
    let signature = Signature::from_der(sig_der).map_err(|e| e.to_string())?;
    let public_key = PublicKey::from_slice(pubkey).map_err(|e| e.to_string())?;
    secp.verify_ecdsa(&message, &signature, &public_key)
        .map_err(|_| "signature does not verify against candidate block hash".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::SecretKey;

    fn sample_hash() -> [u8; 32] {
        [0x42; 32]
    }

    #[test]
    fn accepts_a_genuine_signature() {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&[0xAB; 32]).expect("valid key");
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let hash = sample_hash();
        let message = Message::from_digest_slice(&hash).expect("valid digest");
        let sig = secp.sign_ecdsa(&message, &secret_key);
        let result = verify_partial_signature(&hash, &sig.serialize_der(), &public_key.serialize());
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_signature_from_wrong_key() {
        let secp = Secp256k1::new();
        let signing_key = SecretKey::from_slice(&[0xAB; 32]).expect("valid key");
        let other_key = SecretKey::from_slice(&[0xCD; 32]).expect("valid key");
        let other_pubkey = PublicKey::from_secret_key(&secp, &other_key);
        let hash = sample_hash();
        let message = Message::from_digest_slice(&hash).expect("valid digest");
        let sig = secp.sign_ecdsa(&message, &signing_key);
        let result =
            verify_partial_signature(&hash, &sig.serialize_der(), &other_pubkey.serialize());
        assert!(result.is_err());
    }

    #[test]
    fn rejects_adversarial_random_bytes_as_signature() {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&[0xAB; 32]).expect("valid key");
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let garbage = vec![0u8; 70];
        let result = verify_partial_signature(&sample_hash(), &garbage, &public_key.serialize());
        assert!(result.is_err());
    }

    #[test]
    fn der_from_raw_compact_round_trips_into_a_verifiable_signature() {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&[0xAB; 32]).expect("valid key");
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let hash = sample_hash();
        let message = Message::from_digest_slice(&hash).expect("valid digest");
        let sig = secp.sign_ecdsa(&message, &secret_key);
        let der = der_from_raw_compact(&sig.serialize_compact()).expect("should convert");
        assert!(verify_partial_signature(&hash, &der, &public_key.serialize()).is_ok());
    }

    proptest::proptest! {
        /// Testable property 2 (design §8), adversarial half (scenario E5):
        /// arbitrary byte strings never verify as a signature over a fixed
        /// hash under a genuine federation key.
        #[test]
        fn arbitrary_bytes_never_verify_as_a_signature(
            garbage in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..96),
        ) {
            let secp = Secp256k1::new();
            let secret_key = SecretKey::from_slice(&[0x7A; 32]).expect("valid key");
            let public_key = PublicKey::from_secret_key(&secp, &secret_key);
            let result = verify_partial_signature(&sample_hash(), &garbage, &public_key.serialize());
            proptest::prop_assert!(result.is_err());
        }
    }
}
