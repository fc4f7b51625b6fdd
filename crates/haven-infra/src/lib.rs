//! Infrastructure backends for Haven.
//!
//! Implements the trait seams defined in `haven-core`:
//!
//! - [`sqlite`]: shared channel store, counselor availability, identity
//!   directory, summary/archive repositories, and access tokens, all on a
//!   split reader/writer SQLite pool.
//! - [`video`]: OpenVidu-compatible session manager over REST.
//! - [`llm`]: OpenAI-compatible chat-completions summarizer.
//! - [`storage`]: local-filesystem blob store for transcript archives.

pub mod config;
pub mod llm;
pub mod sqlite;
pub mod storage;
pub mod video;
