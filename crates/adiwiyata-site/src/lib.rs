//! adiwiyata-site
//!
//! Page content and HTML rendering from embedded templates.

pub mod content;
pub mod error;
pub mod render;
