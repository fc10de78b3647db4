//! Read-only access to the escrow contract over Ethereum JSON-RPC

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use agentmart_types::{Job, JobId};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::config::EscrowConfig;
use crate::contract::{job_id_from_u256, IJobEscrow};
use crate::error::{EscrowError, Result};

/// A log entry as returned in a transaction receipt
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

/// The parts of a transaction receipt the tracker needs
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    #[serde(default)]
    pub transaction_hash: String,
    /// `0x1` on success, `0x0` when reverted
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        // Pre-byzantium receipts carry no status field
        self.status.as_deref().map(|s| s == "0x1").unwrap_or(true)
    }
}

/// Read-only view of the job escrow contract
#[async_trait]
pub trait EscrowClient: Send + Sync {
    /// Fetch one job record
    async fn get_job(&self, id: JobId) -> Result<Job>;

    /// Job ids created by a client, in creation order
    async fn jobs_by_client(&self, client: &str) -> Result<Vec<JobId>>;

    /// Receipt of a transaction, `None` while it is pending
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>>;

    /// Full job records for a client, newest first
    async fn client_jobs(&self, client: &str) -> Result<Vec<Job>> {
        let mut ids = self.jobs_by_client(client).await?;
        ids.reverse();

        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            jobs.push(self.get_job(id).await?);
        }
        Ok(jobs)
    }
}

pub fn parse_address(raw: &str) -> Result<Address> {
    Address::from_str(raw.trim()).map_err(|_| EscrowError::InvalidAddress(raw.to_string()))
}

/// Validate a `0x`-prefixed 32-byte transaction hash
pub fn validate_tx_hash(raw: &str) -> Result<()> {
    let hex_part = raw
        .strip_prefix("0x")
        .ok_or_else(|| EscrowError::InvalidTxHash(raw.to_string()))?;
    if hex_part.len() != 64 || hex::decode(hex_part).is_err() {
        return Err(EscrowError::InvalidTxHash(raw.to_string()));
    }
    Ok(())
}

pub(crate) fn decode_hex(raw: &str) -> Result<Vec<u8>> {
    let trimmed = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(trimmed).map_err(|e| EscrowError::Decode(format!("hex: {}", e)))
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC implementation of [`EscrowClient`]
pub struct RpcEscrowClient {
    http: reqwest::Client,
    rpc_url: String,
    escrow: Address,
    next_id: AtomicU64,
}

impl RpcEscrowClient {
    pub fn new(rpc_url: impl Into<String>, escrow: Address) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            escrow,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &EscrowConfig) -> Result<Self> {
        Ok(Self::new(config.rpc_url.clone(), parse_address(&config.escrow_address)?))
    }

    pub fn escrow_address(&self) -> Address {
        self.escrow
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self.http.post(&self.rpc_url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(EscrowError::Transport(format!("HTTP {}", response.status())));
        }

        let rpc: RpcResponse = response.json().await?;
        if let Some(err) = rpc.error {
            return Err(EscrowError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        serde_json::from_value(rpc.result).map_err(|e| EscrowError::Decode(e.to_string()))
    }

    async fn eth_call<C: SolCall>(&self, call: &C) -> Result<C::Return> {
        let data = format!("0x{}", hex::encode(call.abi_encode()));
        let tx = json!({
            "to": self.escrow.to_checksum(None),
            "data": data,
        });

        let raw: String = self.request("eth_call", json!([tx, "latest"])).await?;
        let bytes = decode_hex(&raw)?;
        Ok(C::abi_decode_returns(&bytes, true)?)
    }
}

#[async_trait]
impl EscrowClient for RpcEscrowClient {
    async fn get_job(&self, id: JobId) -> Result<Job> {
        let call = IJobEscrow::getJobCall {
            jobId: U256::from(id.value()),
        };
        let raw = self.eth_call(&call).await?._0;
        Job::try_from(raw)
    }

    async fn jobs_by_client(&self, client: &str) -> Result<Vec<JobId>> {
        let call = IJobEscrow::getJobsByClientCall {
            client: parse_address(client)?,
        };
        self.eth_call(&call)
            .await?
            ._0
            .into_iter()
            .map(job_id_from_u256)
            .collect()
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>> {
        validate_tx_hash(tx_hash)?;
        self.request("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }
}
