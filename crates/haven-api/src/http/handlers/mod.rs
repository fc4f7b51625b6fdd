//! REST API request handlers.

pub mod archive;
pub mod video;
