//! End-to-end tests for the watch session against a local WebSocket server.
//!
//! Each test starts a scripted server on `127.0.0.1:0`, runs
//! [`session::run`] against it with a [`RecordingView`], and checks both
//! what the view saw and what the server received.

use std::time::Duration;

use assert_matches::assert_matches;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use artwatch_client::controller::{
    running_status, JobState, STATUS_DISCONNECTED, STATUS_DONE, STATUS_SUBSCRIBED,
};
use artwatch_client::session::{self, SessionError};
use artwatch_client::socket::{JobSocket, SocketError};
use artwatch_client::view::RecordingView;
use artwatch_core::endpoint::parse_origin;
use artwatch_core::HostContext;

const IMAGE_URL: &str = "https://x/img.png";

// ---------------------------------------------------------------------------
// Scripted server
// ---------------------------------------------------------------------------

enum Step {
    /// Wait for one text frame from the client.
    AwaitFrame,
    Send(&'static str),
    Sleep(Duration),
    Close,
}

/// Accept one connection, play `steps`, then collect any remaining frames
/// until the client goes away. Resolves to every text frame received.
async fn scripted_server(steps: Vec<Step>) -> (JobSocket, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut received = Vec::new();

        for step in steps {
            match step {
                Step::AwaitFrame => {
                    if let Some(text) = next_text(&mut ws).await {
                        received.push(text);
                    }
                }
                Step::Send(text) => {
                    ws.send(Message::Text(text.to_string())).await.unwrap();
                }
                Step::Sleep(duration) => tokio::time::sleep(duration).await,
                Step::Close => {
                    let _ = ws.close(None).await;
                }
            }
        }

        while let Some(text) = next_text(&mut ws).await {
            received.push(text);
        }
        received
    });

    let origin = parse_origin(&format!("http://{addr}")).unwrap();
    (JobSocket::for_origin(&origin).unwrap(), handle)
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> Option<String> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return Some(text),
            Some(Ok(Message::Close(_)) | Err(_)) | None => return None,
            Some(Ok(_)) => continue,
        }
    }
}

fn live_job(job_id: &str) -> HostContext {
    HostContext::new(job_id).with_image_url(IMAGE_URL)
}

fn tick_statuses(view: &RecordingView) -> Vec<&str> {
    view.statuses
        .iter()
        .map(String::as_str)
        .filter(|s| s.starts_with("job is running"))
        .collect()
}

fn running_status_text(elapsed_seconds: usize) -> String {
    running_status(elapsed_seconds as u64)
}

fn subscribe_target(frame: &str) -> String {
    let parsed: serde_json::Value = serde_json::from_str(frame).expect("frame should be JSON");
    let object = parsed.as_object().expect("frame should be an object");
    assert_eq!(object.len(), 1, "subscribe frame has exactly one key");
    object["subscribe"].as_str().expect("subscribe value is a string").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// open → subscribed → running → two ticks → done.
#[tokio::test]
async fn full_lifecycle_shows_ticks_then_image() {
    let (socket, server) = scripted_server(vec![
        Step::AwaitFrame,
        Step::Send(r#"{"subscribed":"abc"}"#),
        Step::Send(r#"{"job":"running"}"#),
        Step::Sleep(Duration::from_millis(2500)),
        Step::Send(r#"{"job":"done"}"#),
    ])
    .await;

    let mut view = RecordingView::new();
    let state = session::run(socket, &live_job("abc"), &mut view)
        .await
        .expect("session should finish");

    assert_eq!(state, JobState::Done);
    assert_eq!(view.status(), Some(STATUS_DONE));
    assert_eq!(view.images, vec![IMAGE_URL]);
    // Two ticks fit in the 2.5s window; a slow machine may see a third.
    let ticks = tick_statuses(&view);
    assert!(
        (2..=3).contains(&ticks.len()),
        "expected two or three ticks, got {ticks:?}"
    );
    let expected: Vec<String> = (1..=ticks.len()).map(running_status_text).collect();
    assert_eq!(ticks, expected);
    assert_eq!(view.statuses.first().map(String::as_str), Some(STATUS_SUBSCRIBED));

    let received = server.await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(subscribe_target(&received[0]), "abc");
}

/// The subscription is the first and only outbound frame and carries the id.
#[tokio::test]
async fn subscribe_is_sent_once_with_job_id() {
    let job_id = "6f1c7f3e-2b1a-4c55-9a43-0d7c1b2f9e10";
    let (socket, server) = scripted_server(vec![
        Step::AwaitFrame,
        Step::Send(r#"{"subscribed":"6f1c7f3e-2b1a-4c55-9a43-0d7c1b2f9e10"}"#),
        Step::Send(r#"{"job":"done"}"#),
    ])
    .await;

    let mut view = RecordingView::new();
    session::run(socket, &live_job(job_id), &mut view)
        .await
        .unwrap();

    let received = server.await.unwrap();
    assert_eq!(received, vec![format!(r#"{{"subscribe":"{job_id}"}}"#)]);
}

/// Archived jobs open the socket but never subscribe or touch the status.
#[tokio::test]
async fn archived_job_sends_nothing() {
    let (socket, server) = scripted_server(vec![]).await;

    let host = live_job("abc").with_archived(true);
    let mut view = RecordingView::new();
    let state = session::run(socket, &host, &mut view).await.unwrap();

    assert_eq!(state, JobState::Archived);
    assert!(view.statuses.is_empty());
    assert!(view.images.is_empty());
    assert!(server.await.unwrap().is_empty());
}

/// `done` without a prior `running` finishes cleanly with no ticks.
#[tokio::test]
async fn done_without_running_finishes() {
    let (socket, server) = scripted_server(vec![
        Step::AwaitFrame,
        Step::Send(r#"{"job":"done"}"#),
    ])
    .await;

    let mut view = RecordingView::new();
    let state = session::run(socket, &live_job("abc"), &mut view)
        .await
        .unwrap();

    assert_eq!(state, JobState::Done);
    assert!(tick_statuses(&view).is_empty());
    assert_eq!(view.statuses, vec![STATUS_DONE]);
    server.await.unwrap();
}

/// Unknown job commands are discarded and the session keeps going.
#[tokio::test]
async fn unknown_job_command_is_discarded() {
    let (socket, server) = scripted_server(vec![
        Step::AwaitFrame,
        Step::Send(r#"{"subscribed":"abc"}"#),
        Step::Send(r#"{"job":"exploded"}"#),
        Step::Send(r#"{"job":"done"}"#),
    ])
    .await;

    let mut view = RecordingView::new();
    let state = session::run(socket, &live_job("abc"), &mut view)
        .await
        .unwrap();

    assert_eq!(state, JobState::Done);
    assert_eq!(view.statuses, vec![STATUS_SUBSCRIBED, STATUS_DONE]);
    server.await.unwrap();
}

/// Malformed and unknown frames leave the view untouched.
#[tokio::test]
async fn malformed_frames_are_ignored() {
    let (socket, server) = scripted_server(vec![
        Step::AwaitFrame,
        Step::Send("definitely not json"),
        Step::Send(r#"{"progress":50}"#),
        Step::Send(r#"{"job":"running","subscribed":"abc"}"#),
        Step::Send("{}"),
        Step::Send(r#"{"subscribed":"abc"}"#),
        Step::Send(r#"{"job":"done"}"#),
    ])
    .await;

    let mut view = RecordingView::new();
    let state = session::run(socket, &live_job("abc"), &mut view)
        .await
        .unwrap();

    assert_eq!(state, JobState::Done);
    assert_eq!(view.statuses, vec![STATUS_SUBSCRIBED, STATUS_DONE]);
    server.await.unwrap();
}

/// A server close before the job finishes surfaces `disconnected`.
#[tokio::test]
async fn early_close_shows_disconnected() {
    let (socket, server) = scripted_server(vec![
        Step::AwaitFrame,
        Step::Send(r#"{"subscribed":"abc"}"#),
        Step::Close,
    ])
    .await;

    let mut view = RecordingView::new();
    let result = session::run(socket, &live_job("abc"), &mut view).await;

    assert_matches!(
        result,
        Err(SessionError::Closed {
            state: JobState::Subscribed
        })
    );
    assert_eq!(view.status(), Some(STATUS_DISCONNECTED));
    server.await.unwrap();
}

/// A failed handshake surfaces `disconnected` and returns the connect error.
#[tokio::test]
async fn connect_failure_shows_disconnected() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let origin = parse_origin(&format!("http://{addr}")).unwrap();
    let socket = JobSocket::for_origin(&origin).unwrap();

    let mut view = RecordingView::new();
    let result = session::run(socket, &live_job("abc"), &mut view).await;

    assert_matches!(
        result,
        Err(SessionError::Socket(SocketError::Connect { .. }))
    );
    assert_eq!(view.statuses, vec![STATUS_DISCONNECTED]);
}
