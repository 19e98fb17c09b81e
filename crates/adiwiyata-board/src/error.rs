use adiwiyata_store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("unsupported attachment type: {0}")]
    UnsupportedAttachment(String),

    #[error("attachment is empty")]
    EmptyAttachment,
}
