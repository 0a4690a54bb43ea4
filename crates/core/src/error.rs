use thiserror::Error;
use uuid::Uuid;

pub type LoyaltyResult<T> = Result<T, LoyaltyError>;

#[derive(Error, Debug)]
pub enum LoyaltyError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown client: {0}")]
    UnknownClient(Uuid),

    #[error("Transaction store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Balance overflow while aggregating client {0}")]
    BalanceOverflow(Uuid),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LoyaltyError {
    /// Whether the caller may safely retry the whole operation.
    /// Appends are all-or-nothing, so a retry can never double-apply
    /// a partially written transaction.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoyaltyError::StoreUnavailable(_))
    }
}
