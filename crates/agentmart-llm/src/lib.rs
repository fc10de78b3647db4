//! AgentMart LLM - Provider abstraction with function calling
//!
//! This crate provides a single interface over the chat-completion APIs the
//! marketplace talks to:
//!
//! - OpenAI (default, model `gpt-4`)
//! - Any OpenAI-compatible server (vLLM, llama.cpp, ...)
//! - Deterministic fallback (no network, plain text only)
//!
//! ## Key Design Principles
//!
//! 1. The model may **propose** a function call, it never executes one
//! 2. Tool-call arguments are parsed as JSON before they leave this crate
//! 3. Missing credentials surface as [`LLMError::ConfigurationError`]

pub mod providers;
pub mod router;
pub mod types;

pub use providers::*;
pub use router::*;
pub use types::*;
