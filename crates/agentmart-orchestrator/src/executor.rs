//! Agent execution
//!
//! Agents are not invoked for real yet. [`SimulatedExecutor`] waits a random
//! delay and returns a mock result shaped like the real agent's output.

use std::time::Duration;

use agentmart_catalog::{display_name, Capability};
use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

use crate::error::ExecutionError;

/// Output rate of the simulated swap, in target tokens per source token
const SWAP_RATE: Decimal = dec!(0.00045);

#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn execute(&self, capability: Capability, arguments: &Value) -> Result<Value, ExecutionError>;
}

/// Executor that fakes agent work with a delay and mock output
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    base_delay: Duration,
    jitter: Duration,
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            jitter: Duration::from_secs(2),
        }
    }
}

impl SimulatedExecutor {
    pub fn new(base_delay: Duration, jitter: Duration) -> Self {
        Self { base_delay, jitter }
    }

    /// No delay at all
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    fn delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base_delay;
        }
        self.base_delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

#[async_trait]
impl AgentExecutor for SimulatedExecutor {
    async fn execute(&self, capability: Capability, arguments: &Value) -> Result<Value, ExecutionError> {
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        mock_result(capability, arguments)
    }
}

fn mock_result(capability: Capability, args: &Value) -> Result<Value, ExecutionError> {
    let mut rng = rand::thread_rng();

    match capability {
        Capability::WeatherData => Ok(json!({
            "location": args["location"],
            "temperature": 72,
            "condition": "Sunny",
            "humidity": "45%"
        })),
        Capability::PriceFeed => {
            let tokens = args["tokens"]
                .as_array()
                .ok_or(ExecutionError::InvalidArgument("tokens"))?;
            let prices: Vec<Value> = tokens
                .iter()
                .map(|token| {
                    json!({
                        "symbol": token,
                        "price_usd": format!("{:.2}", rng.gen_range(1000.0..51000.0)),
                        "change_24h": format!("{:.2}%", rng.gen_range(-5.0..5.0)),
                    })
                })
                .collect();
            Ok(json!({ "prices": prices }))
        }
        Capability::TokenSwap => {
            let amount = decimal_arg(&args["amount"]).ok_or(ExecutionError::InvalidArgument("amount"))?;
            let output = (amount * SWAP_RATE).round_dp(6);
            let tx_hash: [u8; 32] = rng.gen();
            Ok(json!({
                "from_token": args["from_token"],
                "to_token": args["to_token"],
                "input_amount": args["amount"],
                "output_amount": format!("{:.6}", output),
                "transaction_hash": format!("0x{}", hex::encode(tx_hash)),
            }))
        }
        other => Ok(json!({
            "success": true,
            "message": format!("{} executed successfully", display_name(other.function_name())),
            "data": args,
        })),
    }
}

fn decimal_arg(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
