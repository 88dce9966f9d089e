use carchain_crypto::{ChainError, LinkError};
use carchain_store::StoreError;
use carchain_types::TypeError;

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("append rejected: {0}")]
    Rejected(#[from] LinkError),

    #[error("append rejected: only the root block may carry a genesis payload")]
    UnexpectedGenesis,

    #[error("invalid telemetry record: {0}")]
    InvalidRecord(#[from] TypeError),

    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("ledger has no blocks")]
    EmptyChain,

    #[error("no persisted ledger at {0}")]
    NotPersisted(String),

    #[error("persisted ledger rejected: {reason}")]
    Corrupted { reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

/// Why a block sequence is not a valid ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("sequence is empty")]
    Empty,

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("root block does not carry the genesis marker")]
    MissingGenesisPayload,

    #[error("block {index} carries a genesis payload")]
    MisplacedGenesisPayload { index: u64 },
}
