use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("completion client config error: {0}")]
    Config(String),
}
