//! Job-status socket connection.
//!
//! [`JobSocket`] holds the endpoint derived from the page origin. Call
//! [`JobSocket::open`] to perform the opening handshake; it resolves once,
//! when the connection is open, with a live [`JobConnection`]. Inbound text
//! frames are then read one at a time with
//! [`JobConnection::next_message`], in the order the transport delivers
//! them.

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use artwatch_core::endpoint;
use artwatch_core::protocol::encode_subscribe;
use artwatch_core::CoreError;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Endpoint handle for the job-status socket of one page origin.
pub struct JobSocket {
    url: Url,
}

/// An open job-status socket.
pub struct JobConnection {
    url: Url,
    ws_stream: WsStream,
}

impl std::fmt::Debug for JobSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSocket")
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl std::fmt::Debug for JobConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobConnection")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl JobSocket {
    /// Target an explicit socket URL.
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Target `<upgraded-origin>/ws` for a page origin.
    pub fn for_origin(origin: &Url) -> Result<Self, SocketError> {
        Ok(Self::new(endpoint::socket_url(origin)?))
    }

    /// Socket URL, e.g. `ws://host:8080/ws`.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Perform the opening handshake.
    pub async fn open(self) -> Result<JobConnection, SocketError> {
        tracing::info!(url = %self.url, "Connecting to job-status socket");

        let (ws_stream, _response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|source| SocketError::Connect {
                    url: self.url.to_string(),
                    source,
                })?;

        Ok(JobConnection {
            url: self.url,
            ws_stream,
        })
    }
}

impl JobConnection {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send `{"subscribe": "<job_id>"}`.
    ///
    /// Returns once the frame is written. The acknowledgement arrives later
    /// as an ordinary inbound message.
    pub async fn subscribe(&mut self, job_id: &str) -> Result<(), SocketError> {
        let frame = encode_subscribe(job_id)?;
        tracing::debug!(job_id, "Sending subscription");
        self.ws_stream
            .send(Message::Text(frame))
            .await
            .map_err(SocketError::Send)
    }

    /// Next inbound text payload.
    ///
    /// Returns `None` once the server closes the connection or the stream
    /// ends. Binary and control frames are skipped.
    pub async fn next_message(&mut self) -> Option<Result<String, SocketError>> {
        while let Some(msg_result) = self.ws_stream.next().await {
            match msg_result {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(_)) => {
                    tracing::trace!("Ignoring binary frame");
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Handled automatically by tungstenite.
                }
                Ok(Message::Close(frame)) => {
                    tracing::info!(?frame, "Job-status socket closed by server");
                    return None;
                }
                Ok(Message::Frame(_)) => {}
                Err(e) => return Some(Err(SocketError::Receive(e))),
            }
        }
        None
    }
}

/// Errors from the job-status socket.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// The opening handshake failed.
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("Failed to send frame: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("Receive error: {0}")]
    Receive(#[source] tungstenite::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
