//! Application state shared across handlers

use std::path::PathBuf;
use std::sync::Arc;

use agentmart_db::{Database, HistoryStore};
use agentmart_escrow::{EscrowClient, JobWatchRegistry, WatcherConfig};
use agentmart_llm::LLMRouter;
use agentmart_orchestrator::{AgentExecutor, ChatOrchestrator};

/// Files written outside this service
#[derive(Debug, Clone)]
pub struct DataPaths {
    /// Contract deployment output listing the agents
    pub deployment_file: PathBuf,
    /// Directory where the agent runner writes `job-<id>.json`
    pub results_dir: PathBuf,
}

impl DataPaths {
    pub fn job_result_file(&self, job_id: u64) -> PathBuf {
        self.results_dir.join(format!("job-{}.json", job_id))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub history: Arc<dyn HistoryStore>,
    pub orchestrator: Arc<ChatOrchestrator>,
    pub escrow: Arc<dyn EscrowClient>,
    pub watches: Arc<JobWatchRegistry>,
    pub paths: DataPaths,
}

impl AppState {
    pub fn new(
        db: Database,
        llm: LLMRouter,
        executor: Arc<dyn AgentExecutor>,
        escrow: Arc<dyn EscrowClient>,
        watcher: WatcherConfig,
        paths: DataPaths,
    ) -> Self {
        let history: Arc<dyn HistoryStore> = Arc::new(db.history_repo());
        let orchestrator = Arc::new(ChatOrchestrator::new(llm, history.clone(), executor));
        let watches = Arc::new(JobWatchRegistry::new(escrow.clone(), watcher));

        Self {
            db,
            history,
            orchestrator,
            escrow,
            watches,
            paths,
        }
    }
}
