//! adiwiyata-store
//!
//! Live document collections. A thin seam over the hosted document database
//! (Firestore over REST) plus an in-process store for development and tests.

pub mod document;
pub mod error;
pub mod firestore;
pub mod memory;
pub mod store;
