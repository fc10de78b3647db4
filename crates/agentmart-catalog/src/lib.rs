//! AgentMart Catalog - What the marketplace sells
//!
//! Ten agent capabilities, each with:
//! - a callable function definition the model can propose
//! - a fixed price in MNEE and the auto-approval gate
//! - a deployment key and UI metadata for `GET /api/agents`

pub mod capability;
pub mod deployment;
pub mod error;
pub mod functions;
pub mod pricing;
pub mod prompt;

pub use capability::{display_name, slugify, Capability, DisplayInfo};
pub use deployment::{load_catalog, Catalog, CatalogEntry, DeployedAgent, DeploymentFile};
pub use error::{CatalogError, Result};
pub use functions::{tool_spec, tool_specs};
pub use pricing::{should_auto_approve, ApprovalDecision, AUTO_APPROVE_THRESHOLD};
pub use prompt::{approval_message, DEFAULT_SUMMARY, SUMMARY_SYSTEM_PROMPT, SYSTEM_PROMPT};

/// Resolve a model-proposed function name to its capability
pub fn resolve_function(name: &str) -> Result<Capability> {
    Capability::from_function_name(name).ok_or_else(|| CatalogError::UnknownFunction(name.to_string()))
}
