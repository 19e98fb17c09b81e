pub mod attachment;
pub mod chat;
pub mod comment;
pub mod message;
