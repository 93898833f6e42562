use thiserror::Error;
use tronscan_client::TronscanError;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Explorer request failed: {0}")]
    Explorer(#[from] TronscanError),

    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Token metadata not found for TRC10 token {token_id}")]
    MetadataNotFound { token_id: String },

    #[error("Invalid amount '{amount}' in transaction {transaction_hash}")]
    InvalidAmount {
        amount: String,
        transaction_hash: String,
    },

    #[error("Dataset at {endpoint} did not stabilize after {attempts} attempts")]
    DatasetUnstable { endpoint: String, attempts: u32 },

    #[error("Invalid account address: '{0}'")]
    InvalidAddress(String),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HistoryError>;
