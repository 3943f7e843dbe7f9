// Path: crates/crypto/src/hsm.rs
use crate::verify::der_from_raw_compact;
use cryptoki::context::{CInitializeArgs, Pkcs11};
use cryptoki::mechanism::Mechanism;
use cryptoki::object::{Attribute, AttributeType, ObjectHandle};
use cryptoki::session::Session;
use cryptoki::slot::Slot;
use fedsign_api::error::{FedError, FedResult};
use fedsign_api::signer::BlockSigner;
use std::env;
use std::sync::Mutex;

/// Environment variable carrying the PKCS#11 key label, required whenever
/// the `--hsm` CLI flag is set.
pub const KEY_LABEL_ENV: &str = "KEY_LABEL";

/// Environment variable carrying the path to the vendor's PKCS#11 module
/// (`.so`/`.dylib`/`.dll`). A PKCS#11 session cannot be opened without
/// knowing which module to load, so this is required alongside
/// [`KEY_LABEL_ENV`] to make the hardware path constructible.
pub const MODULE_PATH_ENV: &str = "PKCS11_MODULE_PATH";

/// Hardware-backed signer wrapping a PKCS#11 session, held for the process
/// lifetime (§4.2). `sign` retries once after reopening the session before
/// surfacing `signer_fault`.
pub struct HsmSigner {
    /// The loaded PKCS#11 module. Not documented as `Sync` by `cryptoki`, so
    /// it is held behind a mutex the same way `session` is, rather than
    /// assumed safe to share across threads.
    pkcs11: Mutex<Pkcs11>,
    slot: Slot,
    key_label: String,
    session: Mutex<Session>,
    cached_pubkey: Vec<u8>,
}

impl HsmSigner {
    /// Opens a session, finds the private key by `KEY_LABEL`, and caches
    /// its public key. Fails fast if the module, slot, or key cannot be
    /// located — there is no lazy fallback to the software path once `--hsm`
    /// has been requested.
    pub fn new() -> FedResult<Self> {
        let key_label = env::var(KEY_LABEL_ENV)
            .map_err(|_| FedError::signer_fault(format!("{KEY_LABEL_ENV} is not set")))?;
        let module_path = env::var(MODULE_PATH_ENV)
            .map_err(|_| FedError::signer_fault(format!("{MODULE_PATH_ENV} is not set")))?;

        let pkcs11 = Pkcs11::new(&module_path)
            .map_err(|e| FedError::signer_fault(format!("failed to load PKCS#11 module: {e}")))?;
        pkcs11
            .initialize(CInitializeArgs::OsThreads)
            .map_err(|e| FedError::signer_fault(format!("PKCS#11 initialize failed: {e}")))?;

        let slot = first_token_slot(&pkcs11)?;
        let session = open_session(&pkcs11, slot)?;
        let (key_handle, cached_pubkey) = find_key_and_pubkey(&session, &key_label)?;
        let _ = key_handle;

        Ok(Self {
            pkcs11: Mutex::new(pkcs11),
            slot,
            key_label,
            session: Mutex::new(session),
            cached_pubkey,
        })
    }

    fn reopen_session(&self) -> FedResult<()> {
        let pkcs11 = self
            .pkcs11
            .lock()
            .map_err(|_| FedError::signer_fault("HSM module lock poisoned"))?;
        let fresh = open_session(&pkcs11, self.slot)?;
        let mut guard = self
            .session
            .lock()
            .map_err(|_| FedError::signer_fault("HSM session lock poisoned"))?;
        *guard = fresh;
        Ok(())
    }

    fn sign_once(&self, block_hash: &[u8; 32]) -> FedResult<Vec<u8>> {
        let guard = self
            .session
            .lock()
            .map_err(|_| FedError::signer_fault("HSM session lock poisoned"))?;
        let (key_handle, _) = find_key_and_pubkey(&guard, &self.key_label)?;
        let raw = guard
            .sign(&Mechanism::Ecdsa, key_handle, block_hash)
            .map_err(|e| FedError::signer_fault(format!("HSM sign failed: {e}")))?;
        der_from_raw_compact(&raw).map_err(FedError::signer_fault)
    }
}

impl BlockSigner for HsmSigner {
    fn get_pubkey(&self) -> FedResult<Vec<u8>> {
        Ok(self.cached_pubkey.clone())
    }

    fn sign(&self, block_hash: &[u8; 32]) -> FedResult<Vec<u8>> {
        match self.sign_once(block_hash) {
            Ok(sig) => Ok(sig),
            Err(first_err) => {
                tracing::warn!(
                    target: "signer",
                    event = "signer_fault",
                    error = %first_err,
                    "HSM sign failed, reopening session and retrying once"
                );
                self.reopen_session()?;
                self.sign_once(block_hash).map_err(|second_err| {
                    FedError::signer_fault(format!(
                        "HSM sign failed after session reopen: {second_err}"
                    ))
                })
            }
        }
    }
}

fn first_token_slot(pkcs11: &Pkcs11) -> FedResult<Slot> {
    let slots = pkcs11
        .get_slots_with_token()
        .map_err(|e| FedError::signer_fault(format!("failed to enumerate PKCS#11 slots: {e}")))?;
    slots
        .into_iter()
        .next()
        .ok_or_else(|| FedError::signer_fault("no PKCS#11 slot with a token present"))
}

fn open_session(pkcs11: &Pkcs11, slot: Slot) -> FedResult<Session> {
    pkcs11
        .open_ro_session(slot)
        .map_err(|e| FedError::signer_fault(format!("failed to open PKCS#11 session: {e}")))
}

fn find_key_and_pubkey(session: &Session, key_label: &str) -> FedResult<(ObjectHandle, Vec<u8>)> {
    let template = vec![Attribute::Label(key_label.as_bytes().to_vec())];
    let handles = session
        .find_objects(&template)
        .map_err(|e| FedError::signer_fault(format!("PKCS#11 find_objects failed: {e}")))?;
    let handle = handles
        .into_iter()
        .next()
        .ok_or_else(|| FedError::signer_fault(format!("no PKCS#11 object labeled {key_label}")))?;

    let attrs = session
        .get_attributes(handle, &[AttributeType::EcPoint])
        .map_err(|e| FedError::signer_fault(format!("PKCS#11 get_attributes failed: {e}")))?;
    let pubkey = attrs
        .into_iter()
        .find_map(|attr| match attr {
            Attribute::EcPoint(bytes) => Some(bytes),
            _ => None,
        })
        .ok_or_else(|| FedError::signer_fault("PKCS#11 key object has no EC_POINT attribute"))?;

    Ok((handle, pubkey))
}
