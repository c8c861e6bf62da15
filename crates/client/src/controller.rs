//! Job status state machine.
//!
//! [`JobController`] owns the status display and the elapsed-time timer for
//! one watched job. Inbound socket messages drive its transitions:
//!
//! ```text
//! Idle ──subscribed──▶ Subscribed ──job:running──▶ Running ──job:done──▶ Done
//! Archived (host says the job is finalized; never subscribes)
//! ```
//!
//! `subscribed` only advances an idle controller; later acknowledgements
//! update the status text without leaving `Running` or `Done`. The timer is
//! latched: it starts at most once per controller and is dropped on `done`,
//! so no message order can restart it.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

use artwatch_core::protocol::{parse_message, JobCommand, ServerMessage};
use artwatch_core::HostContext;

use crate::view::JobView;

/// Period of the elapsed-time counter.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub const STATUS_SUBSCRIBED: &str = "subscribed to updates";
pub const STATUS_CREATING_IMAGE: &str = "creating image";
pub const STATUS_DONE: &str = "done";
pub const STATUS_DISCONNECTED: &str = "disconnected";

/// Status text shown on each timer tick.
pub fn running_status(elapsed_seconds: u64) -> String {
    format!("job is running ({elapsed_seconds}s)")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Subscribed,
    Running,
    Done,
    /// Finalized before the view loaded; no updates are expected.
    Archived,
    /// The connection failed or closed before the job finished.
    Disconnected,
}

impl JobState {
    /// No further messages are expected in this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Archived | Self::Disconnected)
    }
}

/// Errors raised while applying a single message.
///
/// The message is discarded; the controller's state and view are untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Invalid job command: {0:?}")]
    UnknownJobCommand(String),
}

/// Per-job controller owning the view and the elapsed timer.
pub struct JobController<V: JobView> {
    view: V,
    job_id: String,
    image_url: Option<String>,
    state: JobState,
    timer: Option<Interval>,
    /// Set once the timer has been started; never cleared.
    timer_started: bool,
    elapsed_seconds: u64,
}

impl<V: JobView> JobController<V> {
    /// Bind a controller to `view` for the job described by `host`.
    pub fn new(host: &HostContext, view: V) -> Self {
        let state = if host.archived {
            JobState::Archived
        } else {
            JobState::Idle
        };
        Self {
            view,
            job_id: host.job_id.clone(),
            image_url: host.image_url.clone(),
            state,
            timer: None,
            timer_started: false,
            elapsed_seconds: host.initial_elapsed_secs,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn timer_active(&self) -> bool {
        self.timer.is_some()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Whether a subscription should be sent once the socket opens.
    pub fn should_subscribe(&self) -> bool {
        self.state == JobState::Idle
    }

    /// Decode and apply a raw text frame.
    pub fn handle_text(&mut self, text: &str) -> Result<(), ControllerError> {
        self.handle(parse_message(text))
    }

    /// Apply a decoded message.
    ///
    /// Must be called from within a tokio runtime: `job: running` creates
    /// the timer.
    pub fn handle(&mut self, msg: ServerMessage) -> Result<(), ControllerError> {
        match msg {
            ServerMessage::Subscribed(job_id) => {
                tracing::info!(job_id = %job_id, "Subscribed to job updates");
                self.view.set_status(STATUS_SUBSCRIBED);
                if self.state == JobState::Idle {
                    self.transition(JobState::Subscribed);
                }
            }
            ServerMessage::Job(JobCommand::Running) => self.on_running(),
            ServerMessage::Job(JobCommand::Done) => self.on_done(),
            ServerMessage::Job(JobCommand::Other(arg)) => {
                return Err(ControllerError::UnknownJobCommand(arg));
            }
            ServerMessage::Unrecognized { command } => {
                tracing::warn!(
                    job_id = %self.job_id,
                    command = command.as_deref().unwrap_or("<none>"),
                    "No command found for socket message",
                );
            }
        }
        Ok(())
    }

    /// Wait for the next timer tick and update the elapsed counter.
    ///
    /// Pends forever while no timer is running, so it can sit in a
    /// `tokio::select!` next to the message stream. Cancel-safe.
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
        self.elapsed_seconds += 1;
        tracing::trace!(elapsed_seconds = self.elapsed_seconds, "Timer tick");
        self.view.set_status(&running_status(self.elapsed_seconds));
    }

    /// The connection failed or closed.
    ///
    /// Surfaces a visible status unless the job already reached a final
    /// state.
    pub fn disconnected(&mut self) {
        if matches!(self.state, JobState::Done | JobState::Archived) {
            return;
        }
        self.stop_timer();
        self.view.set_status(STATUS_DISCONNECTED);
        self.transition(JobState::Disconnected);
    }

    fn on_running(&mut self) {
        if matches!(self.state, JobState::Done | JobState::Disconnected) {
            tracing::warn!(job_id = %self.job_id, state = ?self.state, "Ignoring running command for finished job");
            return;
        }
        self.view.set_status(STATUS_CREATING_IMAGE);
        self.start_timer();
        self.transition(JobState::Running);
    }

    fn on_done(&mut self) {
        if matches!(self.state, JobState::Done | JobState::Disconnected) {
            tracing::debug!(job_id = %self.job_id, state = ?self.state, "Ignoring done command for finished job");
            return;
        }
        self.stop_timer();
        match self.image_url.as_deref() {
            Some(src) => self.view.append_image(src),
            None => tracing::warn!(job_id = %self.job_id, "Job finished but no image URL is known"),
        }
        self.view.set_status(STATUS_DONE);
        self.transition(JobState::Done);
    }

    fn start_timer(&mut self) {
        if self.timer_started {
            tracing::debug!(job_id = %self.job_id, "Timer already started");
            return;
        }
        self.timer_started = true;
        tracing::info!(job_id = %self.job_id, "Starting elapsed timer");
        let mut timer = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
    }

    fn stop_timer(&mut self) {
        if self.timer.take().is_some() {
            tracing::info!(
                job_id = %self.job_id,
                elapsed_seconds = self.elapsed_seconds,
                "Stopped elapsed timer",
            );
        }
    }

    fn transition(&mut self, next: JobState) {
        if self.state != next {
            tracing::debug!(job_id = %self.job_id, from = ?self.state, to = ?next, "Job state changed");
            self.state = next;
        }
    }
}
