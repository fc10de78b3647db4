//! Hire flow step derived from transaction state and polled job status
//!
//! ```text
//! input -> approve -> create -> processing -> complete
//!            |                                  ^
//!            +-> input (approval failed)        | polled status 2 or 3
//! ```
//!
//! `complete` is sticky. Statuses 4 and 5 are recorded and stop polling but
//! have no step of their own.

use agentmart_types::{JobId, JobStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Step of the hire flow shown to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HireStep {
    Input,
    Approve,
    Create,
    Processing,
    Complete,
}

impl HireStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Approve => "approve",
            Self::Create => "create",
            Self::Processing => "processing",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for HireStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    /// The client submitted the hire form
    Submitted,
    /// The token approval transaction was confirmed
    ApprovalConfirmed,
    /// The token approval transaction failed or was rejected
    ApprovalFailed,
    /// The job creation transaction was confirmed
    JobCreationConfirmed,
    /// The job id became known
    JobIdResolved(JobId),
    /// A poll returned the job's on-chain status
    StatusPolled(JobStatus),
}

/// Derived view of one hire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTracker {
    step: HireStep,
    job_id: Option<JobId>,
    last_status: Option<JobStatus>,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTracker {
    pub fn new() -> Self {
        Self {
            step: HireStep::Input,
            job_id: None,
            last_status: None,
        }
    }

    /// Tracker for a job whose creation transaction was already sent
    pub fn awaiting_creation() -> Self {
        Self {
            step: HireStep::Create,
            ..Self::new()
        }
    }

    pub fn step(&self) -> HireStep {
        self.step
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.job_id
    }

    pub fn last_status(&self) -> Option<JobStatus> {
        self.last_status
    }

    /// Polling runs while a job id is known and the job is not final
    pub fn should_poll(&self) -> bool {
        self.job_id.is_some() && !self.last_status.map(|s| s.is_final()).unwrap_or(false)
    }

    /// Apply an event; returns whether the tracker changed
    pub fn apply(&mut self, event: TrackerEvent) -> bool {
        let before = self.clone();

        match (self.step, event) {
            (HireStep::Input, TrackerEvent::Submitted) => self.step = HireStep::Approve,
            (HireStep::Approve, TrackerEvent::ApprovalConfirmed) => self.step = HireStep::Create,
            (HireStep::Approve, TrackerEvent::ApprovalFailed) => self.step = HireStep::Input,
            // Optimistic: the job id may not be known yet
            (HireStep::Create, TrackerEvent::JobCreationConfirmed) => {
                self.step = HireStep::Processing
            }
            (HireStep::Processing | HireStep::Complete, TrackerEvent::JobIdResolved(id)) => {
                if self.job_id.is_none() {
                    self.job_id = Some(id);
                }
            }
            (HireStep::Processing | HireStep::Complete, TrackerEvent::StatusPolled(status)) => {
                if self.job_id.is_some() {
                    self.last_status = Some(status);
                    if status.is_delivered() {
                        self.step = HireStep::Complete;
                    }
                }
            }
            _ => {}
        }

        *self != before
    }
}
