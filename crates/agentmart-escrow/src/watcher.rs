//! Background job watchers
//!
//! A watcher follows one job-creation transaction: it waits for the receipt,
//! resolves the job id, then polls the job status on a fixed interval. The
//! latest [`JobSnapshot`] is published on a `watch` channel. The task stops
//! when the job reaches a final status, when every receiver is dropped, when
//! nobody has read the snapshot for `idle_timeout`, or when the creation
//! transaction is not mined within `receipt_timeout`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use agentmart_types::{JobId, JobStatus};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

use crate::client::{EscrowClient, TransactionReceipt};
use crate::config::EscrowConfig;
use crate::events::job_id_from_logs;
use crate::tracker::{HireStep, JobTracker, TrackerEvent};

/// Published state of a watched job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub tx_hash: String,
    pub client: String,
    pub step: HireStep,
    pub job_id: Option<JobId>,
    pub status: Option<JobStatus>,
    pub status_label: Option<&'static str>,
}

impl JobSnapshot {
    fn from_tracker(tx_hash: &str, client: &str, tracker: &JobTracker) -> Self {
        Self {
            tx_hash: tx_hash.to_string(),
            client: client.to_string(),
            step: tracker.step(),
            job_id: tracker.job_id(),
            status: tracker.last_status(),
            status_label: tracker.last_status().map(|s| s.label()),
        }
    }
}

/// Timing for a watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub poll_interval: Duration,
    pub fallback_delay: Duration,
    /// Stop once the snapshot has gone unread this long
    pub idle_timeout: Duration,
    /// Stop waiting for the creation receipt after this long
    pub receipt_timeout: Duration,
    /// How long the registry keeps a stopped watcher's last snapshot
    pub retention: Duration,
    /// Only accept `JobCreated` logs from this contract, when set
    pub escrow_address: Option<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::from(&EscrowConfig::default()).without_address()
    }
}

impl WatcherConfig {
    fn without_address(mut self) -> Self {
        self.escrow_address = None;
        self
    }
}

impl From<&EscrowConfig> for WatcherConfig {
    fn from(config: &EscrowConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            fallback_delay: config.fallback_delay(),
            idle_timeout: config.idle_timeout(),
            receipt_timeout: config.receipt_timeout(),
            retention: config.retention(),
            escrow_address: Some(config.escrow_address.clone()),
        }
    }
}

/// Last time anyone read a watcher's snapshot
#[derive(Debug)]
pub struct Activity {
    origin: Instant,
    last_read_ms: AtomicU64,
}

impl Activity {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_read_ms: AtomicU64::new(0),
        }
    }

    /// Record a read
    pub fn touch(&self) {
        let now = self.origin.elapsed().as_millis() as u64;
        self.last_read_ms.fetch_max(now, Ordering::Relaxed);
    }

    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_read_ms.load(Ordering::Relaxed));
        self.origin.elapsed().saturating_sub(last)
    }
}

/// Handle to a running watcher
pub struct JobWatch {
    pub updates: watch::Receiver<JobSnapshot>,
    pub activity: Arc<Activity>,
    pub handle: JoinHandle<()>,
}

/// Start watching a job-creation transaction
pub fn spawn_job_watcher(
    escrow: Arc<dyn EscrowClient>,
    client: String,
    tx_hash: String,
    config: WatcherConfig,
) -> JobWatch {
    let tracker = JobTracker::awaiting_creation();
    let (tx, rx) = watch::channel(JobSnapshot::from_tracker(&tx_hash, &client, &tracker));
    let activity = Arc::new(Activity::new());

    let watcher_activity = activity.clone();
    let handle = tokio::spawn(async move {
        let mut watcher = Watcher {
            escrow,
            client,
            tx_hash,
            config,
            tracker,
            activity: watcher_activity,
            updates: tx,
        };
        watcher.run().await;
        tracing::debug!(tx_hash = %watcher.tx_hash, step = %watcher.tracker.step(), "Job watcher stopped");
    });

    JobWatch {
        updates: rx,
        activity,
        handle,
    }
}

struct Watcher {
    escrow: Arc<dyn EscrowClient>,
    client: String,
    tx_hash: String,
    config: WatcherConfig,
    tracker: JobTracker,
    activity: Arc<Activity>,
    updates: watch::Sender<JobSnapshot>,
}

impl Watcher {
    async fn run(&mut self) {
        let Some(receipt) = self.wait_for_receipt().await else {
            return;
        };

        self.apply(TrackerEvent::JobCreationConfirmed);

        let job_id = match job_id_from_logs(&receipt.logs, self.config.escrow_address.as_deref()) {
            Some(id) => {
                tracing::info!(tx_hash = %self.tx_hash, job_id = %id, "Job id extracted from JobCreated event");
                id
            }
            None => {
                tracing::warn!(
                    tx_hash = %self.tx_hash,
                    client = %self.client,
                    "JobCreated event not found, falling back to the client's latest job"
                );
                if !self.sleep(self.config.fallback_delay).await {
                    return;
                }
                match self.latest_client_job().await {
                    Some(id) => id,
                    None => return,
                }
            }
        };

        self.apply(TrackerEvent::JobIdResolved(job_id));
        self.poll_status(job_id).await;
    }

    fn apply(&mut self, event: TrackerEvent) {
        if self.tracker.apply(event) {
            self.updates
                .send_replace(JobSnapshot::from_tracker(&self.tx_hash, &self.client, &self.tracker));
        }
    }

    fn is_idle(&self) -> bool {
        let idle = self.activity.idle_for();
        if idle >= self.config.idle_timeout {
            tracing::info!(tx_hash = %self.tx_hash, idle_secs = idle.as_secs(), "Job watcher idle, stopping");
            return true;
        }
        false
    }

    /// Sleep unless every receiver goes away first; returns false when the
    /// watcher should stop
    async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => !self.is_idle(),
            _ = self.updates.closed() => false,
        }
    }

    async fn wait_for_receipt(&self) -> Option<TransactionReceipt> {
        let deadline = Instant::now() + self.config.receipt_timeout;
        loop {
            match self.escrow.transaction_receipt(&self.tx_hash).await {
                Ok(Some(receipt)) if receipt.succeeded() => return Some(receipt),
                Ok(Some(_)) => {
                    tracing::warn!(tx_hash = %self.tx_hash, "Job creation transaction reverted");
                    return None;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(tx_hash = %self.tx_hash, error = %e, "Failed to fetch receipt");
                }
            }
            if Instant::now() >= deadline {
                tracing::warn!(tx_hash = %self.tx_hash, "Job creation transaction not mined in time, stopping");
                return None;
            }
            if !self.sleep(self.config.poll_interval).await {
                return None;
            }
        }
    }

    /// Most recent job of the client; racy if the wallet creates jobs concurrently
    async fn latest_client_job(&self) -> Option<JobId> {
        loop {
            match self.escrow.jobs_by_client(&self.client).await {
                Ok(ids) => {
                    if let Some(id) = ids.last().copied() {
                        tracing::info!(tx_hash = %self.tx_hash, job_id = %id, "Job id taken from latest client job");
                        return Some(id);
                    }
                }
                Err(e) => {
                    tracing::warn!(client = %self.client, error = %e, "Failed to list client jobs");
                }
            }
            if !self.sleep(self.config.poll_interval).await {
                return None;
            }
        }
    }

    async fn poll_status(&mut self, job_id: JobId) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while self.tracker.should_poll() {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.updates.closed() => return,
            }
            if self.is_idle() {
                return;
            }

            match self.escrow.get_job(job_id).await {
                Ok(job) => {
                    tracing::debug!(job_id = %job_id, status = %job.status, "Polled job status");
                    self.apply(TrackerEvent::StatusPolled(job.status));
                }
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Failed to poll job status");
                }
            }
        }
    }
}

struct TrackedJob {
    generation: u64,
    updates: watch::Receiver<JobSnapshot>,
    activity: Arc<Activity>,
    abort: AbortHandle,
}

type TrackedJobs = DashMap<String, TrackedJob>;

/// Active watchers keyed by transaction hash
///
/// A stopped watcher's entry stays readable for `retention`, then is removed.
pub struct JobWatchRegistry {
    escrow: Arc<dyn EscrowClient>,
    config: WatcherConfig,
    watches: Arc<TrackedJobs>,
    generations: AtomicU64,
}

impl JobWatchRegistry {
    pub fn new(escrow: Arc<dyn EscrowClient>, config: WatcherConfig) -> Self {
        Self {
            escrow,
            config,
            watches: Arc::new(DashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    /// Start tracking a transaction, replacing any existing watcher for it
    pub fn track(&self, client: &str, tx_hash: &str) -> JobSnapshot {
        let key = tx_hash.to_lowercase();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let JobWatch {
            updates,
            activity,
            handle,
        } = spawn_job_watcher(
            self.escrow.clone(),
            client.to_string(),
            tx_hash.to_string(),
            self.config.clone(),
        );
        let snapshot = updates.borrow().clone();

        let tracked = TrackedJob {
            generation,
            updates,
            activity,
            abort: handle.abort_handle(),
        };
        if let Some(previous) = self.watches.insert(key.clone(), tracked) {
            tracing::info!(tx_hash = %tx_hash, "Replacing existing job watcher");
            previous.abort.abort();
        }

        tokio::spawn(evict_when_stopped(
            Arc::downgrade(&self.watches),
            key,
            generation,
            handle,
            self.config.retention,
        ));
        snapshot
    }

    /// Latest snapshot for a transaction; counts as a read for the idle timeout
    pub fn snapshot(&self, tx_hash: &str) -> Option<JobSnapshot> {
        self.watches.get(&tx_hash.to_lowercase()).map(|w| {
            w.activity.touch();
            w.updates.borrow().clone()
        })
    }

    /// Stop and forget a watcher; returns whether one existed
    pub fn untrack(&self, tx_hash: &str) -> bool {
        match self.watches.remove(&tx_hash.to_lowercase()) {
            Some((_, watch)) => {
                watch.abort.abort();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }
}

impl Drop for JobWatchRegistry {
    fn drop(&mut self) {
        for entry in self.watches.iter() {
            entry.abort.abort();
        }
    }
}

/// Remove a registry entry once its watcher has stopped and the retention
/// period has passed; a newer watcher for the same key is left alone
async fn evict_when_stopped(
    watches: Weak<TrackedJobs>,
    key: String,
    generation: u64,
    handle: JoinHandle<()>,
    retention: Duration,
) {
    if handle.await.is_err() {
        // Aborted: untrack or replacement already removed the entry
        return;
    }

    tokio::time::sleep(retention).await;
    if let Some(watches) = watches.upgrade() {
        if watches.remove_if(&key, |_, w| w.generation == generation).is_some() {
            tracing::debug!(tx_hash = %key, "Evicted stopped job watcher");
        }
    }
}
