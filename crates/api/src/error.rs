// Path: crates/api/src/error.rs
use std::fmt;

/// The classification of a fault, independent of the specific message.
///
/// `kind()` on [`FedError`] lets call sites match on a stable tag instead of
/// downcasting or string-matching `Display` output; the round coordinator's
/// propagation policy (§7 of the design) is entirely driven by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FedErrorKind {
    /// Connection/auth failure to the chain daemon. Retried by the next loop
    /// iteration; persistent failure escalates to process-fatal.
    RpcTransport,
    /// The daemon rejected a well-formed request (JSON-RPC error object).
    /// Round-fatal: the coordinator abandons the round and advances.
    RpcApplication,
    /// The hardware signer failed to produce a signature after one retry.
    SignerFault,
    /// A messenger socket failed. Never fatal alone; triggers reconnect.
    MessengerTransport,
    /// A malformed peer message or an invalid candidate block. The item is
    /// dropped and a metric is incremented; never fatal.
    ProtocolInvalid,
    /// Orderly shutdown was requested. Terminal.
    StopRequested,
}

impl FedErrorKind {
    /// Whether this kind, left unhandled, should terminate the process.
    pub fn is_fatal(self) -> bool {
        matches!(self, FedErrorKind::StopRequested)
    }

    /// Whether this kind should cause the *current round* to be abandoned
    /// without necessarily being process-fatal.
    pub fn is_round_fatal(self) -> bool {
        matches!(
            self,
            FedErrorKind::RpcApplication | FedErrorKind::SignerFault
        )
    }
}

impl fmt::Display for FedErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FedErrorKind::RpcTransport => "rpc_transport",
            FedErrorKind::RpcApplication => "rpc_application",
            FedErrorKind::SignerFault => "signer_fault",
            FedErrorKind::MessengerTransport => "messenger_transport",
            FedErrorKind::ProtocolInvalid => "protocol_invalid",
            FedErrorKind::StopRequested => "stop_requested",
        };
        f.write_str(s)
    }
}

/// The single error type returned by every fallible operation in the core.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FedError {
    kind: FedErrorKind,
    message: String,
}

impl FedError {
    pub fn new(kind: FedErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rpc_transport(message: impl Into<String>) -> Self {
        Self::new(FedErrorKind::RpcTransport, message)
    }

    pub fn rpc_application(message: impl Into<String>) -> Self {
        Self::new(FedErrorKind::RpcApplication, message)
    }

    pub fn signer_fault(message: impl Into<String>) -> Self {
        Self::new(FedErrorKind::SignerFault, message)
    }

    pub fn messenger_transport(message: impl Into<String>) -> Self {
        Self::new(FedErrorKind::MessengerTransport, message)
    }

    pub fn protocol_invalid(message: impl Into<String>) -> Self {
        Self::new(FedErrorKind::ProtocolInvalid, message)
    }

    pub fn stop_requested() -> Self {
        Self::new(FedErrorKind::StopRequested, "stop requested")
    }

    pub fn kind(&self) -> FedErrorKind {
        self.kind
    }
}

pub type FedResult<T> = Result<T, FedError>;
