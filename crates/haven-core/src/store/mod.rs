//! Trait seams toward the shared key-value channel store.
//!
//! The store is external and shared between gateway instances; each trait
//! operation is individually atomic on the store side, but compound
//! sequences (leave, check size, destroy) are not atomic as a whole.

pub mod membership;
pub mod transcript;

pub use membership::MembershipStore;
pub use transcript::TranscriptStore;
