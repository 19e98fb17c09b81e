use serde::{Deserialize, Serialize};

use crate::time::format_relative;

/// A public comment as projected from the latest store snapshot.
///
/// The id and timestamp are assigned by the store on write. Local copies are
/// rebuilt from scratch on every snapshot and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub text: String,
    pub created_at: jiff::Timestamp,
}

impl CommentRecord {
    /// Age label for this comment, e.g. `"3 jam lalu"`.
    pub fn relative_time(&self, now: jiff::Timestamp) -> String {
        format_relative(now, self.created_at)
    }
}
