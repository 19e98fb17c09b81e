use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::chat::{InlineData, Part};

/// A file the user attached to a chat message, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub mime_type: String,
    pub data: String,
}

impl Attachment {
    /// Encode raw file bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Parse a `data:{mime};base64,{payload}` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, CoreError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| CoreError::InvalidDataUri("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidDataUri("missing payload separator".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| CoreError::InvalidDataUri("only base64 payloads are supported".to_string()))?;

        // Reject garbage up front rather than at render time.
        STANDARD.decode(payload)?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>, CoreError> {
        Ok(STANDARD.decode(&self.data)?)
    }

    /// Inline part carrying this attachment in a transcript turn.
    pub fn to_part(&self) -> Part {
        Part::InlineData {
            inline_data: InlineData {
                data: self.data.clone(),
                mime_type: self.mime_type.clone(),
            },
        }
    }
}
