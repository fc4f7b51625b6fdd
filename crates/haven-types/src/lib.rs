//! Shared domain types for the Haven counseling session coordinator.
//!
//! This crate holds the vocabulary shared by every other Haven crate:
//! channel/participant identifiers, signaling event types, transcript and
//! summary documents, identity types, typed errors, and config structures.
//! It depends only on serde, chrono, uuid, and thiserror.

pub mod channel;
pub mod config;
pub mod error;
pub mod identity;
pub mod signal;
pub mod summary;
pub mod transcript;
