//! adiwiyata-core
//!
//! Pure domain types and formatting helpers for the Adiwiyata site.
//! No network or storage dependency. This is the shared vocabulary of the
//! comment board, the chat relay and the page renderer.

pub mod clock;
pub mod collections;
pub mod error;
pub mod models;
pub mod time;
