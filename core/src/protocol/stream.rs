//! Push-status channel client

use futures::StreamExt;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

use deploy_api::PushEvent;

use crate::errors::PublishError;
use crate::session::SessionId;

/// Factory for push-status connections to the helper
pub struct StreamingClient {
    stream_url: Url,
}

impl StreamingClient {
    pub(crate) fn new(stream_url: Url) -> Self {
        Self { stream_url }
    }

    /// Open the event stream for a session
    pub async fn connect(&self, session_id: &SessionId) -> Result<PushStream, PublishError> {
        let url = self
            .stream_url
            .join(&format!("session/{}/events", session_id))
            .map_err(|e| PublishError::StreamError(e.to_string()))?;
        debug!("Connecting push stream: {}", url);

        let (ws, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| PublishError::StreamError(e.to_string()))?;

        Ok(PushStream { ws })
    }
}

/// An open push-status stream for one session
pub struct PushStream {
    ws: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl PushStream {
    /// Next decoded event; `None` once the helper closes the channel.
    ///
    /// Frames that fail to decode are skipped, not fatal.
    pub async fn next_event(&mut self) -> Result<Option<PushEvent>, PublishError> {
        while let Some(frame) = self.ws.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<PushEvent>(&text) {
                    Ok(event) => return Ok(Some(event)),
                    Err(e) => warn!("Skipping undecodable push frame: {}", e),
                },
                Ok(Message::Close(_)) => return Ok(None),
                Ok(_) => {}
                Err(e) => return Err(PublishError::StreamError(e.to_string())),
            }
        }
        Ok(None)
    }
}
