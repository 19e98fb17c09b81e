use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("invalid UTC offset: {0}")]
    InvalidOffset(String),
}
