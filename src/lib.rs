//! Jotter: local-first notes with AI summaries.
//!
//! The domain lives in `jotter-core`; this crate carries the edges: the
//! CLI, process configuration, the HTTP summarization client, and the
//! ambient theme probe.

pub mod config;
pub mod summarize;
pub mod theme;
