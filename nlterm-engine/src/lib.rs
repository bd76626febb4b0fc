// ABOUTME: turns natural-language requests into shell commands gated by a safety policy.
// ABOUTME: exposes the session orchestrator plus each component for direct use.

pub mod actions;
pub mod config;
pub mod delay;
pub mod error;
pub mod explain;
pub mod export;
pub mod journal;
pub mod patterns;
pub mod phrases;
pub mod policy;
pub mod redact;
pub mod session;
pub mod suggest;
pub mod translate;

pub use error::EngineError;
pub use session::{Phase, Session};
