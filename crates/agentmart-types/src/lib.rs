//! AgentMart Types - Canonical domain types for the agent marketplace
//!
//! This crate contains the foundational types shared by every AgentMart crate
//! with zero dependencies on other agentmart crates:
//!
//! - Agent call records and their lifecycle status
//! - Escrow job records as observed on-chain
//! - MNEE amounts with 18-decimal precision
//!
//! # Ownership
//!
//! Jobs are owned by the external escrow contract and are only ever read here.
//! Agent calls are created and mutated by the chat orchestrator and persisted
//! per wallet address.

pub mod amount;
pub mod call;
pub mod error;
pub mod job;

pub use amount::*;
pub use call::*;
pub use error::*;
pub use job::*;

/// Version of the AgentMart types schema
pub const TYPES_VERSION: &str = "0.1.0";
