//! Startup sequence and event loop for one watched job.
//!
//! [`run`] binds a [`JobController`] to the caller's view, opens the
//! job-status socket, subscribes unless the job is archived, and then
//! multiplexes inbound messages and timer ticks on the current task until
//! the job reaches a terminal state or the connection ends.

use artwatch_core::HostContext;

use crate::controller::{JobController, JobState};
use crate::socket::{JobSocket, SocketError};
use crate::view::JobView;

/// Watch the job described by `host`, rendering into `view`.
///
/// Returns the final state once the job is done or archived. Connection
/// failures are surfaced on the view as a `disconnected` status before the
/// error is returned.
pub async fn run<V: JobView>(
    socket: JobSocket,
    host: &HostContext,
    view: V,
) -> Result<JobState, SessionError> {
    let mut controller = JobController::new(host, view);

    let mut conn = match socket.open().await {
        Ok(conn) => conn,
        Err(e) => {
            controller.disconnected();
            return Err(e.into());
        }
    };
    tracing::info!(url = %conn.url(), job_id = %host.job_id, "Socket connected");

    if controller.should_subscribe() {
        if let Err(e) = conn.subscribe(&host.job_id).await {
            controller.disconnected();
            return Err(e.into());
        }
    } else {
        tracing::info!(job_id = %host.job_id, "Job is archived, not subscribing");
    }

    while !controller.state().is_terminal() {
        tokio::select! {
            msg = conn.next_message() => match msg {
                Some(Ok(text)) => {
                    tracing::debug!(raw = %text, "Received job-status message");
                    if let Err(e) = controller.handle_text(&text) {
                        tracing::error!(
                            job_id = %host.job_id,
                            error = %e,
                            raw = %text,
                            "Discarding job-status message",
                        );
                    }
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Job-status socket failed");
                    controller.disconnected();
                    return Err(e.into());
                }
                None => {
                    let state = controller.state();
                    controller.disconnected();
                    return Err(SessionError::Closed { state });
                }
            },
            () = controller.tick() => {}
        }
    }

    tracing::info!(
        job_id = %host.job_id,
        state = ?controller.state(),
        elapsed_seconds = controller.elapsed_seconds(),
        "Finished watching job",
    );
    Ok(controller.state())
}

/// Errors that end a watch session early.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Socket(#[from] SocketError),

    /// The server closed the connection before the job finished.
    #[error("Connection closed before the job finished (state: {state:?})")]
    Closed { state: JobState },
}
