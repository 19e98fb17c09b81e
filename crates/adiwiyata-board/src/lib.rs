pub mod chat;
pub mod comments;
pub mod error;
