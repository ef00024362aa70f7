use std::fmt;

/// Reason a transaction or block was rejected.
///
/// Bad proof-of-work and a mismatched `previous_hash` are validation
/// failures too, but the engine folds both into `BlockOutcome::Rejected`
/// rather than an `Err` (see `add_block`), so there is no variant for them
/// here: every variant below corresponds to a failure the engine actually
/// returns as `Err`.
#[derive(Debug)]
pub enum ValidationError {
    /// Sender's balance does not cover the transfer amount.
    InsufficientFunds,
    /// Signature did not verify against the claimed sender public key.
    InvalidSignature,
    /// A prior broadcast was rejected by a peer; resolution must run
    /// before mining can continue.
    ResolvePending,
}

/// High-level errors that can occur in the blockchain engine.
///
/// Persistence failures are logged and otherwise swallowed (the in-memory
/// state stays authoritative until the next successful write) and peer
/// broadcast failures are swallowed per-peer, so neither surfaces as an
/// `Err` variant here.
#[derive(Debug)]
pub enum EngineError {
    /// Underlying validation failure.
    Validation(ValidationError),
}

impl From<ValidationError> for EngineError {
    fn from(e: ValidationError) -> Self {
        EngineError::Validation(e)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InsufficientFunds => write!(f, "sender has insufficient funds"),
            ValidationError::InvalidSignature => write!(f, "invalid transaction signature"),
            ValidationError::ResolvePending => write!(f, "resolution pending, mining is blocked"),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ValidationError {}
impl std::error::Error for EngineError {}

/// Outcome of submitting a block received from a peer to [`super::engine::BlockchainEngine::add_block`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlockOutcome {
    /// Block extended the local chain.
    Appended,
    /// Block is ahead of the local tip by more than one block; resolution
    /// was flagged and the block was not applied.
    Deferred,
    /// Block failed validation or is behind the local tip.
    Rejected,
}
