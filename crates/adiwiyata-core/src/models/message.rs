use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::attachment::Attachment;

/// Shown to the user when a relay round fails for any reason.
pub const FALLBACK_REPLY: &str = "Maaf, terjadi kesalahan. Silakan coba lagi nanti.";

/// Who a chat bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// A chat bubble as rendered in the message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attachment: Option<Attachment>,
    /// Wall-clock send time, `HH:MM`.
    pub sent_at: String,
}

impl DisplayMessage {
    pub fn new(
        sender: Sender,
        text: impl Into<String>,
        attachment: Option<Attachment>,
        sent_at: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            attachment,
            sent_at: sent_at.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}
