use serde::{Deserialize, Serialize};

/// Instruction turn every transcript starts with. Keeps the model on topic.
pub const SYSTEM_INSTRUCTION: &str = "Kamu adalah chatbot khusus yang hanya menjawab pertanyaan \
terkait program Adiwiyata, lingkungan sekolah, dan kegiatan peduli lingkungan. Jika ada \
pertanyaan di luar topik tersebut, tolak dengan sopan.";

/// Role of a transcript turn, as the completion endpoint names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
}

/// Binary payload carried inline in a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    /// Base64 (standard alphabet, padded).
    pub data: String,
    #[serde(alias = "mimeType")]
    pub mime_type: String,
}

/// One piece of turn content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(alias = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::InlineData { .. } => None,
        }
    }
}

/// One exchange unit of the transcript sent as context to the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub parts: Vec<Part>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Model, vec![Part::text(text)])
    }

    /// The fixed instruction turn a fresh transcript is seeded with.
    pub fn seed() -> Self {
        Self::new(ChatRole::User, vec![Part::text(SYSTEM_INSTRUCTION)])
    }

    /// Text of the first text part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(Part::as_text)
    }
}
