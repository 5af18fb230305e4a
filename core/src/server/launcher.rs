//! Helper process launching

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, info};
use url::Url;

use crate::errors::PublishError;

use deploy_api::HealthResponse;

/// Helper server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Path to the helper binary
    pub binary_path: PathBuf,

    /// Host the helper binds to
    pub host: String,

    /// Port the helper listens on
    pub port: u16,

    /// Total time to wait for the helper to become healthy
    pub startup_timeout: Duration,

    /// Delay between health probes during startup
    pub health_poll_interval: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("stevedore-helper"),
            host: "127.0.0.1".to_string(),
            port: 7732,
            startup_timeout: Duration::from_secs(30),
            health_poll_interval: Duration::from_millis(250),
        }
    }
}

/// A launched helper process with its endpoints.
///
/// `child` is `None` when the helper is managed externally (tests, or an
/// already-running helper adopted by the host).
pub struct LaunchedServer {
    pub child: Option<Child>,
    pub base_url: Url,
    pub stream_url: Url,
}

/// Launcher trait for testability
#[async_trait]
pub trait ServerLauncher: Send + Sync {
    /// Spawn the helper and wait until it is ready to serve
    async fn launch(&self, options: &ServerOptions) -> Result<LaunchedServer, PublishError>;
}

/// Compute the request and streaming endpoints for a helper binding
pub fn endpoint_urls(options: &ServerOptions) -> Result<(Url, Url), PublishError> {
    let base = Url::parse(&format!("http://{}:{}/", options.host, options.port))
        .map_err(|e| PublishError::ServerStart(format!("invalid helper endpoint: {e}")))?;
    let stream = Url::parse(&format!("ws://{}:{}/", options.host, options.port))
        .map_err(|e| PublishError::ServerStart(format!("invalid stream endpoint: {e}")))?;
    Ok((base, stream))
}

/// Default launcher: spawns the helper binary and probes its health endpoint
pub struct HelperLauncher;

#[async_trait]
impl ServerLauncher for HelperLauncher {
    async fn launch(&self, options: &ServerOptions) -> Result<LaunchedServer, PublishError> {
        let (base_url, stream_url) = endpoint_urls(options)?;

        let mut child = Command::new(&options.binary_path)
            .arg("--host")
            .arg(&options.host)
            .arg("--port")
            .arg(options.port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PublishError::ServerStart(format!(
                    "failed to spawn {}: {e}",
                    options.binary_path.display()
                ))
            })?;

        match wait_for_health(&base_url, options).await {
            Ok(health) => {
                info!("Deploy helper ready, version {}", health.version);
                Ok(LaunchedServer {
                    child: Some(child),
                    base_url,
                    stream_url,
                })
            }
            Err(e) => {
                let _ = child.start_kill();
                Err(e)
            }
        }
    }
}

async fn wait_for_health(
    base_url: &Url,
    options: &ServerOptions,
) -> Result<HealthResponse, PublishError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let health_url = base_url
        .join("health")
        .map_err(|e| PublishError::ServerStart(e.to_string()))?;

    let deadline = tokio::time::Instant::now() + options.startup_timeout;
    loop {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                if let Ok(health) = response.json::<HealthResponse>().await {
                    return Ok(health);
                }
            }
            Ok(response) => {
                debug!("Helper not ready yet: {}", response.status());
            }
            Err(e) => {
                debug!("Helper not reachable yet: {}", e);
            }
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(PublishError::ServerStart(format!(
                "helper did not become healthy within {:?}",
                options.startup_timeout
            )));
        }
        tokio::time::sleep(options.health_poll_interval).await;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Launcher that records launches and never spawns a process
    pub(crate) struct FakeLauncher {
        pub launches: AtomicU32,
    }

    impl FakeLauncher {
        pub fn new() -> Self {
            Self {
                launches: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ServerLauncher for FakeLauncher {
        async fn launch(&self, options: &ServerOptions) -> Result<LaunchedServer, PublishError> {
            // Yield so concurrent starts overlap
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.launches.fetch_add(1, Ordering::SeqCst);
            let (base_url, stream_url) = endpoint_urls(options)?;
            Ok(LaunchedServer {
                child: None,
                base_url,
                stream_url,
            })
        }
    }
}
