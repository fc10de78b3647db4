//! Escrow job DTOs

use agentmart_types::Job;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct JobsQuery {
    pub client: Option<String>,
}

/// A job with its human-readable status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub status_label: &'static str,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        let status_label = job.status_label();
        Self { job, status_label }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobView>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub client: String,
    pub tx_hash: String,
}
