//! AgentMart Orchestrator - From utterance to agent call
//!
//! The model may only **propose** a function call. Whether it runs is
//! decided here:
//!
//! - price below the auto-approval threshold: executed immediately
//! - otherwise: returned to the user for explicit approval
//!
//! Every executed call is recorded in the wallet's history together with a
//! best-effort summary.

pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod requests;

pub use error::{ExecutionError, OrchestratorError, Result};
pub use executor::{AgentExecutor, SimulatedExecutor};
pub use orchestrator::{result_message, ChatOrchestrator, ChatReply, FunctionCall, TurnOutcome, EXECUTING_MESSAGE};
pub use requests::{chat_request, summarize, summary_request};
