//! API Integration Tests
//!
//! Full request/response cycle against an in-memory history database, a
//! scripted model and a fake escrow contract.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use agentmart_api::{create_test_router, AppState, DataPaths};
use agentmart_db::Database;
use agentmart_escrow::{EscrowClient, EscrowError, TransactionReceipt, WatcherConfig};
use agentmart_llm::{
    CompletionRequest, CompletionResponse, LLMProvider, LLMRouter, OpenAIConfig, OpenAIProvider,
    ProviderKind, ToolCall,
};
use agentmart_orchestrator::SimulatedExecutor;
use agentmart_types::{Job, JobId, JobStatus};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const WALLET: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

// =============================================================================
// Fixtures
// =============================================================================

struct ScriptedProvider {
    responses: Mutex<VecDeque<CompletionResponse>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
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

    async fn complete(&self, _request: CompletionRequest) -> agentmart_llm::Result<CompletionResponse> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CompletionResponse::new("")))
    }
}

fn tool_call(name: &str, arguments: Value) -> CompletionResponse {
    CompletionResponse::new("").with_tool_call(ToolCall {
        id: "call_1".to_string(),
        name: name.to_string(),
        arguments,
    })
}

/// Escrow with jobs 1 (approved) and 2 (pending) for every client
struct FakeEscrow;

fn fake_job(id: u64, status: JobStatus) -> Job {
    Job {
        id: JobId(id),
        client: WALLET.to_string(),
        agent: "0x0000000000000000000000000000000000000006".to_string(),
        amount_base_units: "10000000000000000".to_string(),
        amount: dec!(0.01),
        task_type: "price-feed".to_string(),
        input_hash: "Get current price of BTC".to_string(),
        result_hash: String::new(),
        status,
    }
}

#[async_trait]
impl EscrowClient for FakeEscrow {
    async fn get_job(&self, id: JobId) -> agentmart_escrow::Result<Job> {
        match id.value() {
            1 => Ok(fake_job(1, JobStatus::Approved)),
            2 => Ok(fake_job(2, JobStatus::Pending)),
            _ => Err(EscrowError::Rpc {
                code: 3,
                message: "execution reverted: Job does not exist".to_string(),
            }),
        }
    }

    async fn jobs_by_client(&self, _client: &str) -> agentmart_escrow::Result<Vec<JobId>> {
        Ok(vec![JobId(1), JobId(2)])
    }

    async fn transaction_receipt(&self, _tx_hash: &str) -> agentmart_escrow::Result<Option<TransactionReceipt>> {
        Ok(None)
    }
}

struct TestApp {
    router: Router,
    dir: TempDir,
}

impl TestApp {
    async fn with_llm(llm: LLMRouter) -> Self {
        let dir = TempDir::new().unwrap();
        let results_dir = dir.path().join("agent-results");
        std::fs::create_dir_all(&results_dir).unwrap();

        let db = Database::connect_in_memory().await.unwrap();
        let state = AppState::new(
            db,
            llm,
            Arc::new(SimulatedExecutor::instant()),
            Arc::new(FakeEscrow),
            WatcherConfig::default(),
            DataPaths {
                deployment_file: dir.path().join("deployments.json"),
                results_dir,
            },
        );

        Self {
            router: create_test_router(Arc::new(state)),
            dir,
        }
    }

    async fn scripted(responses: Vec<CompletionResponse>) -> Self {
        Self::with_llm(LLMRouter::new(ScriptedProvider::new(responses))).await
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");

        let body = match body {
            Some(json_body) => Body::from(serde_json::to_vec(&json_body).unwrap()),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));

        (status, json)
    }
}

// =============================================================================
// Health and catalog
// =============================================================================

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::scripted(vec![]).await;
        let (status, json) = app.request("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");

        let (status, json) = app.request("GET", "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["database"], true);
    }

    #[tokio::test]
    async fn test_agents_from_deployment_file() {
        let app = TestApp::scripted(vec![]).await;
        std::fs::write(
            app.path().join("deployments.json"),
            json!({
                "network": {"name": "localhost", "chainId": 31337},
                "agents": {
                    "priceOracle": {"name": "Price Oracle", "address": "0x0000000000000000000000000000000000000006", "price": "0.01"},
                    "swap": {"name": "Swap Agent", "address": "0x0000000000000000000000000000000000000005", "price": 0.1},
                    "legacy": {"name": "Old", "address": "0x0", "price": "1"}
                }
            })
            .to_string(),
        )
        .unwrap();

        let (status, json) = app.request("GET", "/api/agents", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["network"]["chainId"], 31337);

        let agents = json["agents"].as_object().unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(json["agents"]["price-feed"]["name"], "Price Oracle");
        assert_eq!(json["agents"]["price-feed"]["capability"], "price-feed");
        assert_eq!(json["agents"]["token-swap"]["category"], "DeFi");
    }

    #[tokio::test]
    async fn test_agents_missing_deployment() {
        let app = TestApp::scripted(vec![]).await;
        let (status, json) = app.request("GET", "/api/agents", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().ends_with("Please run deployment first."));
    }

    #[tokio::test]
    async fn test_agents_malformed_deployment() {
        let app = TestApp::scripted(vec![]).await;
        std::fs::write(app.path().join("deployments.json"), "{not json").unwrap();

        let (status, json) = app.request("GET", "/api/agents", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to load agent data");
    }
}

// =============================================================================
// Chat and summary
// =============================================================================

mod chat {
    use super::*;

    #[tokio::test]
    async fn test_chat_returns_function_call() {
        let app = TestApp::scripted(vec![tool_call("call_price_oracle", json!({"tokens": ["BTC"]}))]).await;

        let (status, json) = app
            .request(
                "POST",
                "/api/chat",
                Some(json!({"messages": [{"role": "user", "content": "Get BTC price"}]})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "");
        assert_eq!(json["functionCall"]["name"], "call_price_oracle");
        assert_eq!(json["functionCall"]["arguments"]["tokens"][0], "BTC");
    }

    #[tokio::test]
    async fn test_chat_plain_reply() {
        let app = TestApp::scripted(vec![CompletionResponse::new("Hi! I can call agents for you.")]).await;

        let (status, json) = app
            .request("POST", "/api/chat", Some(json!({"messages": [{"role": "user", "content": "hello"}]})))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Hi! I can call agents for you.");
        assert!(json["functionCall"].is_null());
    }

    #[tokio::test]
    async fn test_chat_without_api_key() {
        let llm = LLMRouter::new(Arc::new(OpenAIProvider::new(OpenAIConfig::default())));
        let app = TestApp::with_llm(llm).await;

        let (status, json) = app
            .request("POST", "/api/chat", Some(json!({"messages": [{"role": "user", "content": "hello"}]})))
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "LLM API key not configured");
    }

    #[tokio::test]
    async fn test_summarize_defaults_when_blank() {
        let app = TestApp::scripted(vec![CompletionResponse::new("   ")]).await;

        let (status, json) = app
            .request(
                "POST",
                "/api/summarize",
                Some(json!({"agentName": "weather agent", "input": {}, "output": {}})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"], "Execution completed successfully");
    }
}

// =============================================================================
// History
// =============================================================================

mod history {
    use super::*;

    fn create_body(id: &str) -> Value {
        json!({
            "action": "create",
            "data": {
                "id": id,
                "walletAddress": WALLET,
                "agentName": "price oracle",
                "status": "executing",
                "cost": "0.01",
                "input": {"tokens": ["BTC"]}
            }
        })
    }

    #[tokio::test]
    async fn test_wallet_required() {
        let app = TestApp::scripted(vec![]).await;
        let (status, json) = app.request("GET", "/api/history", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Wallet address required");
    }

    #[tokio::test]
    async fn test_create_update_and_list() {
        let app = TestApp::scripted(vec![]).await;

        let (status, json) = app.request("POST", "/api/history", Some(create_body("100"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"success": true, "id": "100"}));

        let (status, _) = app
            .request(
                "POST",
                "/api/history",
                Some(json!({
                    "action": "update",
                    "data": {"id": "100", "status": "completed", "output": {"prices": []}, "executionTime": 2100}
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = app
            .request("GET", &format!("/api/history?wallet={}", WALLET), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 1);
        assert_eq!(json["history"][0]["agentName"], "price oracle");
        assert_eq!(json["history"][0]["capability"], "price-oracle");
        assert_eq!(json["history"][0]["status"], "completed");
        assert_eq!(json["history"][0]["executionTime"], 2100);
        assert_eq!(json["stats"]["completed_calls"], 1);
        assert_eq!(json["stats"]["total_spent"], json!(0.01));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let app = TestApp::scripted(vec![]).await;
        let (status, json) = app
            .request(
                "POST",
                "/api/history",
                Some(json!({"action": "update", "data": {"id": "missing", "status": "failed"}})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let app = TestApp::scripted(vec![]).await;

        let (status, json) = app
            .request("POST", "/api/history", Some(json!({"action": "create", "data": {"id": "1"}})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing required fields");

        let (status, json) = app
            .request("POST", "/api/history", Some(json!({"action": "update", "data": {}})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "ID required for update");

        let (status, json) = app
            .request("POST", "/api/history", Some(json!({"action": "delete", "data": {}})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], r#"Invalid action. Must be "create" or "update""#);
    }

    #[tokio::test]
    async fn test_out_of_range_execution_time_is_bad_request() {
        let app = TestApp::scripted(vec![]).await;
        app.request("POST", "/api/history", Some(create_body("100"))).await;

        let (status, json) = app
            .request(
                "POST",
                "/api/history",
                Some(json!({
                    "action": "update",
                    "data": {"id": "100", "status": "completed", "executionTime": u64::MAX}
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("out of range"));

        let (_, json) = app
            .request("GET", &format!("/api/history?wallet={}", WALLET), None)
            .await;
        assert_eq!(json["history"][0]["status"], "executing");
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let app = TestApp::scripted(vec![]).await;
        app.request("POST", "/api/history", Some(create_body("7"))).await;
        let (status, _) = app.request("POST", "/api/history", Some(create_body("7"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}

// =============================================================================
// Orchestration
// =============================================================================

mod orchestrate {
    use super::*;

    #[tokio::test]
    async fn test_btc_price_executes_without_confirmation() {
        let app = TestApp::scripted(vec![
            tool_call("call_price_oracle", json!({"tokens": ["BTC"]})),
            CompletionResponse::new("BTC price fetched."),
        ])
        .await;

        let (status, json) = app
            .request(
                "POST",
                "/api/orchestrate",
                Some(json!({
                    "walletAddress": WALLET,
                    "messages": [{"role": "user", "content": "Get BTC price"}]
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "executed");
        assert_eq!(json["message"], "Executing agent...");
        assert_eq!(json["call"]["cost"], "0.01");
        assert_eq!(json["call"]["status"], "completed");
        assert_eq!(json["call"]["summary"], "BTC price fetched.");

        let (_, history) = app
            .request("GET", &format!("/api/history?wallet={}", WALLET), None)
            .await;
        assert_eq!(history["count"], 1);
        assert_eq!(history["history"][0]["capability"], "price-feed");
    }

    #[tokio::test]
    async fn test_swap_waits_for_approval_then_executes() {
        let args = json!({"amount": 100, "from_token": "USDC", "to_token": "ETH"});
        let app = TestApp::scripted(vec![tool_call("call_swap_agent", args.clone())]).await;

        let (status, json) = app
            .request(
                "POST",
                "/api/orchestrate",
                Some(json!({
                    "walletAddress": WALLET,
                    "messages": [{"role": "user", "content": "Swap 100 USDC to ETH"}]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "approval_required");
        assert_eq!(json["price"], "0.1");
        assert_eq!(
            json["message"],
            "I'd like to call swap agent for you. This will cost 0.1 MNEE. Please approve."
        );

        let (status, json) = app
            .request(
                "POST",
                "/api/orchestrate/execute",
                Some(json!({"walletAddress": WALLET, "name": "call_swap_agent", "arguments": args})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["call"]["status"], "completed");
        assert_eq!(json["call"]["output"]["output_amount"], "0.045000");
        assert!(json["message"].as_str().unwrap().starts_with("✅ swap agent completed!"));
    }

    #[tokio::test]
    async fn test_unknown_model_function_is_bad_gateway() {
        let app = TestApp::scripted(vec![tool_call("call_mystery", json!({}))]).await;
        let (status, _) = app
            .request(
                "POST",
                "/api/orchestrate",
                Some(json!({"walletAddress": WALLET, "messages": [{"role": "user", "content": "?"}]})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_wallet_and_name_validation() {
        let app = TestApp::scripted(vec![]).await;

        let (status, json) = app
            .request("POST", "/api/orchestrate", Some(json!({"messages": []})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Wallet address required");

        let (status, _) = app
            .request(
                "POST",
                "/api/orchestrate/execute",
                Some(json!({"walletAddress": WALLET, "name": "call_nothing", "arguments": {}})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Escrow jobs
// =============================================================================

mod jobs {
    use super::*;

    #[tokio::test]
    async fn test_job_result_file() {
        let app = TestApp::scripted(vec![]).await;

        let (status, json) = app.request("GET", "/api/job-result/4", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Result not found");

        std::fs::write(
            app.path().join("agent-results").join("job-4.json"),
            json!({"jobId": 4, "result": "BTC: $43,000"}).to_string(),
        )
        .unwrap();
        let (status, json) = app.request("GET", "/api/job-result/4", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"], "BTC: $43,000");

        let (status, _) = app.request("GET", "/api/job-result/..%2Fsecret", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_and_get_jobs() {
        let app = TestApp::scripted(vec![]).await;

        let (status, json) = app.request("GET", &format!("/api/jobs?client={}", WALLET), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);
        // Newest first
        assert_eq!(json["jobs"][0]["id"], 2);
        assert_eq!(json["jobs"][0]["statusLabel"], "Pending");
        assert_eq!(json["jobs"][1]["status"], 3);

        let (status, json) = app.request("GET", "/api/jobs/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["statusLabel"], "Approved");
        assert_eq!(json["amount"], "0.01");

        let (status, _) = app.request("GET", "/api/jobs/99", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, json) = app.request("GET", "/api/jobs", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Client address required");
    }

    #[tokio::test]
    async fn test_track_transaction() {
        let app = TestApp::scripted(vec![]).await;
        let tx_hash = format!("0x{}", "ab".repeat(32));

        let (status, json) = app
            .request("POST", "/api/jobs/track", Some(json!({"client": WALLET, "txHash": tx_hash})))
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["step"], "create");
        assert!(json["jobId"].is_null());

        let (status, json) = app.request("GET", &format!("/api/jobs/track/{}", tx_hash), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["txHash"], tx_hash);

        let (status, _) = app
            .request("GET", &format!("/api/jobs/track/0x{}", "cd".repeat(32)), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .request("POST", "/api/jobs/track", Some(json!({"client": WALLET, "txHash": "0x1234"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.request("DELETE", &format!("/api/jobs/track/{}", tx_hash), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.request("GET", &format!("/api/jobs/track/{}", tx_hash), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = app.request("DELETE", &format!("/api/jobs/track/{}", tx_hash), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("No tracked job"));
    }
}
