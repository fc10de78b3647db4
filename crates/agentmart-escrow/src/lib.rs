//! AgentMart Escrow - read side of the on-chain job escrow
//!
//! Hires are paid through the escrow contract with transactions the client
//! signs in their own wallet. This crate never signs anything. It reads job
//! records, resolves the job created by a transaction and follows its status
//! until the job is final.

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod events;
pub mod tracker;
pub mod watcher;

pub use client::{
    parse_address, validate_tx_hash, EscrowClient, RpcEscrowClient, RpcLog, TransactionReceipt,
};
pub use config::EscrowConfig;
pub use contract::IJobEscrow;
pub use error::{EscrowError, Result};
pub use events::job_id_from_logs;
pub use tracker::{HireStep, JobTracker, TrackerEvent};
pub use watcher::{spawn_job_watcher, Activity, JobSnapshot, JobWatch, JobWatchRegistry, WatcherConfig};
