//! Single-slot job scheduling.
//!
//! One dedicated worker task executes at most one build at a time, which
//! also guarantees no two jobs ever touch the same scratch artifacts. The
//! submitting side never blocks: it hands off a snapshot and receives the
//! outcome through a oneshot channel. Shutdown cancels the in-flight job
//! rather than awaiting it.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::cancel::{CancelHandle, cancel_pair};
use crate::error::BuildFault;
use crate::pipeline::{BuildOutcome, BuildPipeline, BuildRequest};

/// Whether the worker currently has a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Ready,
    Running,
}

/// What [`Scheduler::submit`] did with a request.
#[derive(Debug)]
pub enum Submission {
    /// The job was accepted; the receiver yields its outcome.
    Accepted(oneshot::Receiver<Result<BuildOutcome, BuildFault>>),
    /// A job is already running; the request was dropped.
    Busy,
    /// Nothing changed since the last successful build; the request was
    /// skipped without invoking any tool.
    Clean,
    /// The scheduler has shut down.
    ShutDown,
}

/// The status/dirty pair, guarded together so submission decisions are
/// atomic.
#[derive(Debug)]
struct SchedulerState {
    status: JobStatus,
    dirty: bool,
}

struct Job {
    request: BuildRequest,
    outcome_tx: oneshot::Sender<Result<BuildOutcome, BuildFault>>,
}

/// Serializes build requests onto one worker task.
#[derive(Debug)]
pub struct Scheduler {
    state: Arc<Mutex<SchedulerState>>,
    status_tx: Arc<watch::Sender<JobStatus>>,
    jobs_tx: mpsc::Sender<Job>,
    cancel: CancelHandle,
}

impl Scheduler {
    /// Spawn the worker task for `pipeline`. Requires a tokio runtime.
    ///
    /// The dirty flag starts set, so the very first submission builds.
    pub fn new(pipeline: BuildPipeline) -> Self {
        let state = Arc::new(Mutex::new(SchedulerState {
            status: JobStatus::Ready,
            dirty: true,
        }));
        let (status_tx, _) = watch::channel(JobStatus::Ready);
        let status_tx = Arc::new(status_tx);
        let (jobs_tx, mut jobs_rx) = mpsc::channel::<Job>(1);
        let (cancel, cancel_token) = cancel_pair();

        let worker_state = state.clone();
        let worker_status = status_tx.clone();
        tokio::spawn(async move {
            loop {
                // Biased toward the queue: a job accepted just before
                // shutdown still runs (and resolves as Cancelled at its
                // first checkpoint) instead of losing its outcome.
                let job = tokio::select! {
                    biased;
                    job = jobs_rx.recv() => match job {
                        Some(job) => job,
                        None => break,
                    },
                    _ = cancel_token.cancelled() => break,
                };

                let result = pipeline.run(&job.request, &cancel_token).await;

                {
                    let mut state = worker_state.lock().unwrap();
                    if matches!(result, Ok(BuildOutcome::Success { .. })) {
                        state.dirty = false;
                    }
                    state.status = JobStatus::Ready;
                    worker_status.send_replace(JobStatus::Ready);
                }

                // The submitter may have dropped its receiver; that is fine.
                let _ = job.outcome_tx.send(result);

                if cancel_token.is_cancelled() {
                    break;
                }
            }
            debug!("build worker stopped");
        });

        Self {
            state,
            status_tx,
            jobs_tx,
            cancel,
        }
    }

    /// Hand one request to the worker.
    ///
    /// The Ready→Running transition happens synchronously here; the
    /// transition back to Ready happens on the worker once the pipeline has
    /// produced a result, whatever the outcome.
    pub fn submit(&self, request: BuildRequest) -> Submission {
        let mut state = self.state.lock().unwrap();
        if state.status == JobStatus::Running {
            debug!("build request dropped; a job is already running");
            return Submission::Busy;
        }
        if !state.dirty {
            debug!("build request skipped; nothing changed since the last success");
            return Submission::Clean;
        }

        state.status = JobStatus::Running;
        self.status_tx.send_replace(JobStatus::Running);

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let job = Job {
            request,
            outcome_tx,
        };
        if self.jobs_tx.try_send(job).is_err() {
            // Worker gone: shutdown already happened.
            state.status = JobStatus::Ready;
            self.status_tx.send_replace(JobStatus::Ready);
            return Submission::ShutDown;
        }

        Submission::Accepted(outcome_rx)
    }

    /// Record that the source text or an option changed since the last
    /// successful build.
    pub fn mark_dirty(&self) {
        self.state.lock().unwrap().dirty = true;
    }

    /// Whether a build would actually run if submitted now.
    pub fn is_dirty(&self) -> bool {
        self.state.lock().unwrap().dirty
    }

    /// The current Ready/Running status.
    pub fn status(&self) -> JobStatus {
        self.state.lock().unwrap().status
    }

    /// Observe Ready/Running transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<JobStatus> {
        self.status_tx.subscribe()
    }

    /// Cancel any in-flight job and stop the worker.
    ///
    /// Non-blocking: the worker kills the running tool process and winds
    /// down on its own; the cancelled job still delivers its outcome.
    pub fn shutdown(&self) {
        info!("scheduler shutdown requested");
        self.cancel.cancel();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
