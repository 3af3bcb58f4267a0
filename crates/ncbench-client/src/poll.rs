//! Polling a task until its result is ready.
//!
//! The poller runs a fixed-interval loop against the status endpoint and
//! stops on the first of: a result payload appears, the backend reports a
//! terminal failure, the configured timeout passes, a status request fails,
//! or the caller cancels. HTTP success and job success are deliberately
//! decoupled: the backend may report progress indefinitely, and the client
//! has two independent stop signals (data availability, or an explicit
//! terminal status) without requiring a result payload on failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use ncbench_core::{TaskId, TaskRequest, TaskSnapshot, TaskStatus};

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::store::TaskStore;

/// Polling intervals and limits.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Sleep between status requests.
    pub interval: Duration,

    /// Maximum total wait before giving up.
    pub timeout: Duration,

    /// Period of the elapsed-seconds display tick. UI only; has no bearing
    /// on correctness.
    pub display_tick: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(30 * 60),
            display_tick: Duration::from_secs(1),
        }
    }
}

/// How a polling loop ended, short of an error.
///
/// Cancellation is a deliberate outcome, not a failure; errors (timeout,
/// HTTP, transport) are reported through [`ClientError`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// A result payload appeared, or the backend reported a terminal
    /// failure status. The caller inspects the snapshot either way.
    Delivered(TaskSnapshot),
    /// The caller cancelled the loop.
    Cancelled,
}

/// Live progress published while a loop is running.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollProgress {
    /// Most recently observed status; starts at `PENDING`.
    pub status: TaskStatus,
    /// Wall-clock seconds since the loop started.
    pub elapsed_secs: u64,
}

/// Drives the poll loop for one task at a time.
///
/// The busy flag is advisory: callers use it to gate their UI against
/// re-entrant submissions, but serializing sessions per logical form is
/// the caller's responsibility.
pub struct Poller {
    client: Arc<ApiClient>,
    config: PollConfig,
    busy: Arc<AtomicBool>,
    progress: Arc<watch::Sender<PollProgress>>,
}

impl Poller {
    pub fn new(client: Arc<ApiClient>, config: PollConfig) -> Self {
        let (progress, _) = watch::channel(PollProgress::default());
        Self {
            client,
            config,
            busy: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(progress),
        }
    }

    /// True while a submission or poll session is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Subscribe to live progress updates.
    pub fn subscribe(&self) -> watch::Receiver<PollProgress> {
        self.progress.subscribe()
    }

    /// Poll `id` until a terminal condition is reached.
    ///
    /// Each tick checks the timeout before issuing a request; both the
    /// request and the inter-tick sleep are raced against `token`, so a
    /// fired cancellation unwinds within one tick without further requests.
    /// The elapsed ticker and busy flag are released on every exit path.
    pub async fn run(
        &self,
        id: &TaskId,
        token: &CancellationToken,
    ) -> Result<PollOutcome, ClientError> {
        let started_at = Instant::now();
        let _session = PollSession::start(
            self.progress.clone(),
            self.busy.clone(),
            started_at,
            self.config.display_tick,
        );

        info!(
            task_id = %id,
            interval_secs = self.config.interval.as_secs(),
            timeout_secs = self.config.timeout.as_secs(),
            "polling task until ready"
        );

        loop {
            let waited = started_at.elapsed();
            if waited > self.config.timeout {
                return Err(ClientError::PollTimeout {
                    waited_secs: waited.as_secs(),
                });
            }

            let snapshot = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!(task_id = %id, "polling cancelled");
                    return Ok(PollOutcome::Cancelled);
                }
                fetched = self.client.fetch_status(id) => fetched?,
            };

            let status = snapshot.status.clone();
            self.progress.send_modify(|p| p.status = status.clone());

            if snapshot.result.is_some() {
                info!(task_id = %id, status = %status, "result delivered");
                return Ok(PollOutcome::Delivered(snapshot));
            }
            if status.is_terminal_failure() {
                info!(task_id = %id, status = %status, "terminal failure reported without result");
                return Ok(PollOutcome::Delivered(snapshot));
            }

            debug!(task_id = %id, status = %status, "result outstanding, sleeping");
            tokio::select! {
                _ = token.cancelled() => {
                    info!(task_id = %id, "polling cancelled");
                    return Ok(PollOutcome::Cancelled);
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }

    /// Submit a request and poll the created task, holding the busy flag
    /// across both phases so callers can gate re-entrant submissions on a
    /// single signal.
    pub async fn submit_and_run(
        &self,
        request: &TaskRequest,
        store: &dyn TaskStore,
        token: &CancellationToken,
    ) -> Result<(TaskId, PollOutcome), ClientError> {
        let _busy = BusyGuard::acquire(self.busy.clone());
        let id = self.client.submit(request, store).await?;
        let outcome = self.run(&id, token).await?;
        Ok((id, outcome))
    }
}

/// Resources owned exclusively by one active poll loop: the elapsed-time
/// ticker and the busy flag. Exists iff a loop is active; dropped exactly
/// once on every exit path, including error returns.
struct PollSession {
    ticker: JoinHandle<()>,
    _busy: BusyGuard,
}

impl PollSession {
    fn start(
        progress: Arc<watch::Sender<PollProgress>>,
        busy: Arc<AtomicBool>,
        started_at: Instant,
        tick: Duration,
    ) -> Self {
        let guard = BusyGuard::acquire(busy);
        progress.send_replace(PollProgress::default());

        let ticker = tokio::spawn({
            let progress = progress.clone();
            async move {
                let mut interval = tokio::time::interval(tick);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    progress.send_modify(|p| p.elapsed_secs = started_at.elapsed().as_secs());
                }
            }
        });

        Self {
            ticker,
            _busy: guard,
        }
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
