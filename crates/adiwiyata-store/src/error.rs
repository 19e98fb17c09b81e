use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to document store failed: {0}")]
    Request(String),

    #[error("document store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode document: {0}")]
    Decode(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no async runtime available: {0}")]
    Runtime(String),

    #[error("store config error: {0}")]
    Config(String),
}
