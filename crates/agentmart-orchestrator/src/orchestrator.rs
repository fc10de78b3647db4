//! Chat orchestrator
//!
//! One user turn goes through:
//!
//! ```text
//! messages -> model (with function catalog) -> reply
//!                                           -> function call -> price gate -> approval required
//!                                                                          -> execute -> history + summary
//! ```

use std::sync::Arc;

use agentmart_catalog::{approval_message, display_name, ApprovalDecision, Capability};
use agentmart_db::{HistoryStore, HistoryUpdate, NewHistoryRecord};
use agentmart_llm::{LLMRouter, Message};
use agentmart_types::{AgentCall, CallStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use crate::error::{OrchestratorError, Result};
use crate::executor::AgentExecutor;
use crate::requests::{chat_request, summarize};

/// Shown while an auto-approved call runs and the model gave no text
pub const EXECUTING_MESSAGE: &str = "Executing agent...";

/// Characters of result JSON quoted back in the completion message
const RESULT_PREVIEW_CHARS: usize = 200;

/// Function call proposed by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Value,
}

/// Model reply to a chat turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub function_call: Option<FunctionCall>,
}

/// What happened in one orchestrated turn
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Plain answer, no agent involved
    Reply { message: String },
    /// The call costs at least the threshold and waits for the user
    ApprovalRequired {
        message: String,
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
        #[serde(rename = "agentName")]
        agent_name: String,
        price: Decimal,
    },
    /// The call was auto-approved and has run
    Executed {
        message: String,
        #[serde(rename = "resultMessage")]
        result_message: String,
        call: AgentCall,
    },
}

impl TurnOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reply { .. } => "reply",
            Self::ApprovalRequired { .. } => "approval_required",
            Self::Executed { .. } => "executed",
        }
    }
}

pub struct ChatOrchestrator {
    llm: LLMRouter,
    history: Arc<dyn HistoryStore>,
    executor: Arc<dyn AgentExecutor>,
}

impl ChatOrchestrator {
    pub fn new(llm: LLMRouter, history: Arc<dyn HistoryStore>, executor: Arc<dyn AgentExecutor>) -> Self {
        Self { llm, history, executor }
    }

    pub fn llm(&self) -> &LLMRouter {
        &self.llm
    }

    /// Send the conversation to the model and extract its first function call
    pub async fn chat(&self, messages: Vec<Message>) -> Result<ChatReply> {
        metrics::counter!("agentmart_chat_requests_total").increment(1);

        let response = self.llm.complete(chat_request(messages)).await?;
        let function_call = response.first_tool_call().map(|call| FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        });

        Ok(ChatReply {
            message: response.content,
            function_call,
        })
    }

    /// Summarize an execution
    pub async fn summarize(&self, agent_name: &str, input: &Value, output: &Value) -> Result<String> {
        Ok(summarize(&self.llm, agent_name, input, output).await?)
    }

    /// Run one chat turn on behalf of a wallet
    pub async fn handle_turn(&self, wallet_address: &str, messages: Vec<Message>) -> Result<TurnOutcome> {
        let reply = self.chat(messages).await?;

        let outcome = match reply.function_call {
            None => TurnOutcome::Reply { message: reply.message },
            Some(function_call) => {
                let capability = resolve(&function_call.name)?;
                let price = capability.price();

                match ApprovalDecision::for_price(price) {
                    ApprovalDecision::AutoApprove => {
                        tracing::info!(
                            wallet = %wallet_address,
                            function = %function_call.name,
                            %price,
                            "Auto-approving agent call"
                        );
                        let message = non_empty_or(reply.message, || EXECUTING_MESSAGE.to_string());
                        let call = self
                            .execute_call(wallet_address, &function_call.name, function_call.arguments)
                            .await?;
                        TurnOutcome::Executed {
                            message,
                            result_message: result_message(&call),
                            call,
                        }
                    }
                    ApprovalDecision::RequiresApproval => {
                        tracing::info!(
                            wallet = %wallet_address,
                            function = %function_call.name,
                            %price,
                            "Agent call requires approval"
                        );
                        let message = non_empty_or(reply.message, || {
                            approval_message(&function_call.name, capability)
                        });
                        TurnOutcome::ApprovalRequired {
                            message,
                            agent_name: display_name(&function_call.name),
                            function_call,
                            price,
                        }
                    }
                }
            }
        };

        metrics::counter!("agentmart_orchestrator_turns_total", "outcome" => outcome.kind()).increment(1);
        Ok(outcome)
    }

    /// Execute a call, recording it in the wallet's history
    ///
    /// Execution failures are recorded on the returned call rather than
    /// returned as errors. Only an unknown function or a failure to create
    /// the history record is an error.
    pub async fn execute_call(&self, wallet_address: &str, function_name: &str, arguments: Value) -> Result<AgentCall> {
        let capability = resolve(function_name)?;
        let agent_name = display_name(function_name);

        let mut call = AgentCall::executing(
            uuid::Uuid::new_v4().to_string(),
            agent_name.clone(),
            capability.slug(),
            capability.price(),
            arguments.clone(),
        );
        self.history
            .create(&NewHistoryRecord::from_call(wallet_address, &call))
            .await?;

        let started = Instant::now();
        let result = self.executor.execute(capability, &arguments).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                call.complete(output, elapsed_ms);
                call.summary = self.best_effort_summary(&call).await;
            }
            Err(e) => {
                tracing::warn!(call_id = %call.id, agent = %agent_name, error = %e, "Agent execution failed");
                call.fail(e.to_string(), elapsed_ms);
            }
        }

        if let Err(e) = self.history.update(&call.id, &HistoryUpdate::from_call(&call)).await {
            tracing::error!(call_id = %call.id, error = %e, "Failed to record call result");
        }

        metrics::counter!(
            "agentmart_agent_calls_total",
            "capability" => capability.slug(),
            "status" => call.status.as_str()
        )
        .increment(1);

        tracing::info!(
            call_id = %call.id,
            wallet = %wallet_address,
            capability = %capability,
            status = %call.status,
            execution_time_ms = elapsed_ms,
            "Agent call finished"
        );
        Ok(call)
    }

    async fn best_effort_summary(&self, call: &AgentCall) -> Option<String> {
        let output = call.output.as_ref()?;
        match summarize(&self.llm, &call.agent_name, &call.input, output).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!(call_id = %call.id, error = %e, "Failed to generate summary");
                None
            }
        }
    }
}

fn resolve(function_name: &str) -> Result<Capability> {
    Capability::from_function_name(function_name).ok_or_else(|| {
        tracing::warn!(function = %function_name, "Model proposed a function outside the catalog");
        OrchestratorError::UnknownFunction(function_name.to_string())
    })
}

fn non_empty_or(message: String, default: impl FnOnce() -> String) -> String {
    if message.trim().is_empty() {
        default()
    } else {
        message
    }
}

/// Chat line reporting a finished call
pub fn result_message(call: &AgentCall) -> String {
    match call.status {
        CallStatus::Failed => {
            let reason = call
                .output
                .as_ref()
                .and_then(|o| o["error"].as_str())
                .unwrap_or("unknown error");
            format!("❌ {} failed: {}", call.agent_name, reason)
        }
        _ => {
            let pretty = call
                .output
                .as_ref()
                .and_then(|o| serde_json::to_string_pretty(o).ok())
                .unwrap_or_default();
            let preview: String = pretty.chars().take(RESULT_PREVIEW_CHARS).collect();
            format!("✅ {} completed! {}...", call.agent_name, preview)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SimulatedExecutor;
    use agentmart_db::Database;
    use agentmart_llm::{
        CompletionRequest, CompletionResponse, LLMError, LLMProvider, ProviderKind, ToolCall,
    };
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const WALLET: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    /// Provider replaying canned responses and recording requests
    struct ScriptedProvider {
        responses: Mutex<VecDeque<agentmart_llm::Result<CompletionResponse>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<agentmart_llm::Result<CompletionResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Deterministic
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, request: CompletionRequest) -> agentmart_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(CompletionResponse::new("")))
        }
    }

    fn tool_response(content: &str, name: &str, arguments: Value) -> agentmart_llm::Result<CompletionResponse> {
        Ok(CompletionResponse::new(content).with_tool_call(ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }))
    }

    async fn orchestrator(provider: Arc<ScriptedProvider>) -> (ChatOrchestrator, Database) {
        let db = Database::connect_in_memory().await.unwrap();
        let orchestrator = ChatOrchestrator::new(
            LLMRouter::new(provider),
            Arc::new(db.history_repo()),
            Arc::new(SimulatedExecutor::instant()),
        );
        (orchestrator, db)
    }

    #[tokio::test]
    async fn test_btc_price_auto_executes() {
        let provider = ScriptedProvider::new(vec![
            tool_response("", "call_price_oracle", json!({"tokens": ["BTC"]})),
            Ok(CompletionResponse::new("  Fetched BTC price.  ")),
        ]);
        let (orchestrator, db) = orchestrator(provider.clone()).await;

        let outcome = orchestrator
            .handle_turn(WALLET, vec![Message::user("Get BTC price")])
            .await
            .unwrap();

        let TurnOutcome::Executed { message, call, result_message } = outcome else {
            panic!("expected auto-execution");
        };
        assert_eq!(message, EXECUTING_MESSAGE);
        assert_eq!(call.status, CallStatus::Completed);
        assert_eq!(call.cost, dec!(0.01));
        assert_eq!(call.capability, "price-feed");
        assert_eq!(call.agent_name, "price oracle");
        assert_eq!(call.summary.as_deref(), Some("Fetched BTC price."));
        assert!(result_message.starts_with("✅ price oracle completed!"));

        let history = db.history_repo().list(WALLET, 10, 0).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, "completed");
        assert_eq!(history[0].capability, "price-feed");
        assert_eq!(history[0].summary.as_deref(), Some("Fetched BTC price."));

        // chat request + summary request
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_swap_requires_approval() {
        let provider = ScriptedProvider::new(vec![tool_response(
            "",
            "call_swap_agent",
            json!({"amount": 100, "from_token": "USDC", "to_token": "ETH"}),
        )]);
        let (orchestrator, db) = orchestrator(provider).await;

        let outcome = orchestrator
            .handle_turn(WALLET, vec![Message::user("Swap 100 USDC to ETH")])
            .await
            .unwrap();

        let TurnOutcome::ApprovalRequired { message, function_call, agent_name, price } = outcome else {
            panic!("expected approval prompt");
        };
        assert_eq!(price, dec!(0.1));
        assert_eq!(agent_name, "swap agent");
        assert_eq!(function_call.name, "call_swap_agent");
        assert_eq!(message, "I'd like to call swap agent for you. This will cost 0.1 MNEE. Please approve.");

        // Nothing recorded until approved
        assert_eq!(db.history_repo().count(WALLET).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_threshold_price_requires_approval() {
        let provider = ScriptedProvider::new(vec![tool_response(
            "Posting that tweet.",
            "call_twitter_agent",
            json!({"content": "gm"}),
        )]);
        let (orchestrator, _db) = orchestrator(provider).await;

        let outcome = orchestrator.handle_turn(WALLET, vec![Message::user("tweet gm")]).await.unwrap();
        match outcome {
            TurnOutcome::ApprovalRequired { message, price, .. } => {
                assert_eq!(price, dec!(0.05));
                assert_eq!(message, "Posting that tweet.");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plain_reply() {
        let provider = ScriptedProvider::new(vec![Ok(CompletionResponse::new("Hello there"))]);
        let (orchestrator, _db) = orchestrator(provider).await;

        let outcome = orchestrator.handle_turn(WALLET, vec![Message::user("hi")]).await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Reply { ref message } if message == "Hello there"));
    }

    #[tokio::test]
    async fn test_unknown_function_rejected() {
        let provider = ScriptedProvider::new(vec![tool_response("", "call_mystery_agent", json!({}))]);
        let (orchestrator, _db) = orchestrator(provider).await;

        let err = orchestrator.handle_turn(WALLET, vec![Message::user("?")]).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::UnknownFunction(ref name) if name == "call_mystery_agent"));
    }

    #[tokio::test]
    async fn test_summary_failure_does_not_fail_call() {
        let provider = ScriptedProvider::new(vec![Err(LLMError::NetworkError {
            message: "connection reset".to_string(),
        })]);
        let (orchestrator, db) = orchestrator(provider).await;

        let call = orchestrator
            .execute_call(WALLET, "call_weather_agent", json!({"location": "Tokyo, Japan"}))
            .await
            .unwrap();
        assert_eq!(call.status, CallStatus::Completed);
        assert!(call.summary.is_none());

        let stats = db.history_repo().stats(WALLET).await.unwrap();
        assert_eq!(stats.completed_calls, 1);
        assert_eq!(stats.total_spent, dec!(0.02));
    }

    #[tokio::test]
    async fn test_execution_failure_recorded() {
        let provider = ScriptedProvider::new(vec![]);
        let (orchestrator, db) = orchestrator(provider.clone()).await;

        let call = orchestrator
            .execute_call(WALLET, "call_price_oracle", json!({}))
            .await
            .unwrap();
        assert_eq!(call.status, CallStatus::Failed);
        assert!(result_message(&call).starts_with("❌ price oracle failed:"));

        let history = db.history_repo().list(WALLET, 10, 0).await.unwrap();
        assert_eq!(history[0].status, "failed");
        // No summary is requested for failed calls
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = TurnOutcome::ApprovalRequired {
            message: "approve?".to_string(),
            function_call: FunctionCall {
                name: "call_swap_agent".to_string(),
                arguments: json!({"amount": 1}),
            },
            agent_name: "swap agent".to_string(),
            price: dec!(0.1),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "approval_required");
        assert_eq!(json["functionCall"]["name"], "call_swap_agent");
        assert_eq!(json["agentName"], "swap agent");
        assert_eq!(json["price"], "0.1");
    }
}
