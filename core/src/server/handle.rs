//! Deploy server lifecycle management

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, Notify};
use tracing::{error, info, warn};
use url::Url;

use crate::credentials::CredentialsSupplier;
use crate::errors::PublishError;
use crate::protocol::client::RequestClient;
use crate::protocol::stream::StreamingClient;
use crate::server::launcher::{HelperLauncher, ServerLauncher, ServerOptions};

/// Notification raised when the helper process is lost.
///
/// Subscribers must treat every in-flight session as terminated.
#[derive(Debug, Clone)]
pub struct Disconnected {
    pub reason: String,
}

#[derive(Debug, Clone)]
struct Endpoints {
    base_url: Url,
    stream_url: Url,
}

/// Process-wide handle over the deploy helper.
///
/// Created once by the hosting application and shared across publish
/// attempts; yields the request and streaming clients a deployment
/// session runs on. Start failures are reported to the caller, never
/// retried here.
pub struct ServerProcessHandle {
    options: ServerOptions,
    launcher: Arc<dyn ServerLauncher>,
    endpoints: Mutex<Option<Endpoints>>,
    connected: Arc<AtomicBool>,
    disconnect_tx: broadcast::Sender<Disconnected>,
    stop_signal: Arc<Notify>,
}

impl ServerProcessHandle {
    /// Create a handle that spawns the helper binary on demand
    pub fn new(options: ServerOptions) -> Self {
        Self::with_launcher(options, Arc::new(HelperLauncher))
    }

    /// Create a handle with a custom launcher
    pub fn with_launcher(options: ServerOptions, launcher: Arc<dyn ServerLauncher>) -> Self {
        let (disconnect_tx, _) = broadcast::channel(8);
        Self {
            options,
            launcher,
            endpoints: Mutex::new(None),
            connected: Arc::new(AtomicBool::new(false)),
            disconnect_tx,
            stop_signal: Arc::new(Notify::new()),
        }
    }

    /// Ensure exactly one helper process is running.
    ///
    /// Safe under concurrent callers: the lock serializes launch attempts
    /// and a live helper short-circuits later entrants. A handle whose
    /// helper was lost launches a fresh one.
    pub async fn start(&self) -> Result<(), PublishError> {
        let mut endpoints = self.endpoints.lock().await;
        if endpoints.is_some() && self.is_connected() {
            return Ok(());
        }

        info!("Starting deploy helper: {}", self.options.binary_path.display());
        let launched = self.launcher.launch(&self.options).await?;

        *endpoints = Some(Endpoints {
            base_url: launched.base_url,
            stream_url: launched.stream_url,
        });
        self.connected.store(true, Ordering::SeqCst);

        if let Some(child) = launched.child {
            self.spawn_watchdog(child);
        }
        Ok(())
    }

    /// Terminate the helper and invalidate all derived clients
    pub fn stop(&self) {
        info!("Stopping deploy helper");
        notify_disconnected(&self.connected, &self.disconnect_tx, "stopped by host");
        self.stop_signal.notify_waiters();
    }

    /// Whether the helper process is currently reachable
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Subscribe to disconnection notifications.
    ///
    /// Delivery may occur on any runtime thread; dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Disconnected> {
        self.disconnect_tx.subscribe()
    }

    /// Request/response client bound to the running helper.
    ///
    /// `credentials` is invoked immediately before every call the client
    /// makes, so rotated tokens are picked up mid-session.
    pub async fn request_client(
        &self,
        credentials: Arc<dyn CredentialsSupplier>,
    ) -> Result<RequestClient, PublishError> {
        let endpoints = self.running_endpoints().await?;
        RequestClient::new(endpoints.base_url, credentials)
    }

    /// Push-status client bound to the running helper
    pub async fn streaming_client(&self) -> Result<StreamingClient, PublishError> {
        let endpoints = self.running_endpoints().await?;
        Ok(StreamingClient::new(endpoints.stream_url))
    }

    async fn running_endpoints(&self) -> Result<Endpoints, PublishError> {
        let endpoints = self.endpoints.lock().await;
        let endpoints = endpoints
            .as_ref()
            .ok_or_else(|| PublishError::ServerStart("helper has not been started".to_string()))?;
        if !self.is_connected() {
            return Err(PublishError::Disconnected("helper is not running".to_string()));
        }
        Ok(endpoints.clone())
    }

    fn spawn_watchdog(&self, mut child: tokio::process::Child) {
        let connected = self.connected.clone();
        let disconnect_tx = self.disconnect_tx.clone();
        let stop_signal = self.stop_signal.clone();

        tokio::spawn(async move {
            let exit_reason = tokio::select! {
                status = child.wait() => Some(match status {
                    Ok(status) => format!("helper exited: {status}"),
                    Err(e) => format!("helper wait failed: {e}"),
                }),
                _ = stop_signal.notified() => None,
            };

            match exit_reason {
                Some(reason) => {
                    warn!("{}", reason);
                    notify_disconnected(&connected, &disconnect_tx, &reason);
                }
                None => {
                    if let Err(e) = child.kill().await {
                        error!("Failed to kill helper process: {}", e);
                    }
                }
            }
        });
    }
}

fn notify_disconnected(
    connected: &AtomicBool,
    disconnect_tx: &broadcast::Sender<Disconnected>,
    reason: &str,
) {
    // Only the first observer of the loss publishes it
    if connected.swap(false, Ordering::SeqCst) {
        let _ = disconnect_tx.send(Disconnected {
            reason: reason.to_string(),
        });
    }
}
