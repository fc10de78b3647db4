//! Escrow client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the escrow contract lives and how often to poll it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    /// Ethereum JSON-RPC endpoint
    pub rpc_url: String,
    /// Address of the deployed job escrow contract
    pub escrow_address: String,
    /// Interval between job status polls
    pub poll_interval_ms: u64,
    /// Delay before falling back to the client's job list
    pub fallback_delay_ms: u64,
    /// Stop a tracked watcher nobody has read for this long
    pub idle_timeout_secs: u64,
    /// Give up on a creation transaction that is not mined within this time
    pub receipt_timeout_secs: u64,
    /// Keep the last snapshot of a stopped watcher readable this long
    pub retention_secs: u64,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            escrow_address: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0".to_string(),
            poll_interval_ms: 2000,
            fallback_delay_ms: 500,
            idle_timeout_secs: 600,
            receipt_timeout_secs: 1800,
            retention_secs: 300,
        }
    }
}

impl EscrowConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}
