//! Document collection and field naming conventions.
//!
//! Pure constants, no store dependency. These define the canonical layout of
//! the documents the site reads and writes.

/// Collection holding the public comment board.
pub const COMMENTS: &str = "comments";

/// Field carrying the comment body.
pub const COMMENT_TEXT: &str = "text";

/// Field carrying the server-assigned write time.
pub const COMMENT_TIMESTAMP: &str = "timestamp";
