//! adiwiyata-gemini
//!
//! Completion endpoint client for the AdiBot chat relay: Gemini
//! `generateContent` over HTTPS, plus reply clean-up.

pub mod client;
pub mod error;
pub mod text;
pub mod wire;
