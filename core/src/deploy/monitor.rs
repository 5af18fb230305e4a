//! Deployment monitoring

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use deploy_api::{
    DeploymentState, GetDeploymentStatusResponse, OptionSetting, ProblemDetails,
    StartDeploymentRequest,
};

use crate::configuration::deploy_payload;
use crate::deploy::progress::{ProgressStatus, ProgressTracker};
use crate::errors::PublishError;
use crate::faults;
use crate::session::DeploymentSession;
use crate::utils::{calc_exp_backoff, CooldownOptions};

/// Session operations the monitor drives
#[async_trait]
pub trait DeploySession: Send + Sync {
    /// Begin deploying with the supplied settings
    async fn start_deployment(&self, request: StartDeploymentRequest)
        -> Result<(), PublishError>;

    /// Current deployment status
    async fn deployment_status(&self) -> Result<GetDeploymentStatusResponse, PublishError>;

    /// Best-effort abort of the in-flight deployment
    async fn abort_deployment(&self) -> Result<(), PublishError>;
}

#[async_trait]
impl DeploySession for DeploymentSession {
    async fn start_deployment(
        &self,
        request: StartDeploymentRequest,
    ) -> Result<(), PublishError> {
        DeploymentSession::start_deployment(self, request).await
    }

    async fn deployment_status(&self) -> Result<GetDeploymentStatusResponse, PublishError> {
        DeploymentSession::deployment_status(self).await
    }

    async fn abort_deployment(&self) -> Result<(), PublishError> {
        DeploymentSession::abort_deployment(self).await
    }
}

/// Monitor options
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Delay between status checks
    pub poll_interval: Duration,

    /// Consecutive failed status checks tolerated before giving up
    pub max_error_streak: u32,

    /// Backoff applied while status checks are failing
    pub cooldown: CooldownOptions,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_error_streak: 5,
            cooldown: CooldownOptions::default(),
        }
    }
}

/// Record of the most recent deployment attempt
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub application_name: String,
    pub recipe_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Drives a deployment attempt to a terminal state.
///
/// Progress is published on a watch channel so the view layer can
/// disable conflicting actions while an attempt is in flight and raise
/// the failure banner on `Fail`.
pub struct DeploymentMonitor {
    options: MonitorOptions,
    tracker: Mutex<ProgressTracker>,
    progress_tx: watch::Sender<ProgressStatus>,
    attempt: Mutex<Option<AttemptRecord>>,
}

impl DeploymentMonitor {
    /// Create a monitor in the not-started state
    pub fn new(options: MonitorOptions) -> Self {
        let (progress_tx, _) = watch::channel(ProgressStatus::NotStarted);
        Self {
            options,
            tracker: Mutex::new(ProgressTracker::new()),
            progress_tx,
            attempt: Mutex::new(None),
        }
    }

    /// Observe progress changes
    pub fn subscribe(&self) -> watch::Receiver<ProgressStatus> {
        self.progress_tx.subscribe()
    }

    /// Current progress
    pub fn status(&self) -> ProgressStatus {
        *self.progress_tx.borrow()
    }

    /// Record of the most recent attempt, if any
    pub async fn last_attempt(&self) -> Option<AttemptRecord> {
        self.attempt.lock().await.clone()
    }

    /// Drive one deployment attempt to completion.
    ///
    /// Serializes the visible configuration tree, starts the deployment
    /// and checks the session's status until it reaches `Success` or
    /// `Fail`. On cancellation the helper is asked to abort and the
    /// attempt settles in `Fail` with a cancellation-specific error.
    /// `Success` is the only `Ok` outcome; the caller records the new
    /// republish target on it.
    pub async fn deploy<S>(
        &self,
        session: &S,
        application_name: &str,
        recipe_id: &str,
        configuration: &[OptionSetting],
        mut cancel: Pin<Box<dyn Future<Output = ()> + Send>>,
    ) -> Result<(), PublishError>
    where
        S: DeploySession + ?Sized,
    {
        self.begin().await?;
        self.record_start(application_name, recipe_id).await;

        let request = StartDeploymentRequest {
            application_name: application_name.to_string(),
            recipe_id: recipe_id.to_string(),
            settings: deploy_payload(configuration),
        };

        info!(
            "Starting deployment of '{}' with recipe {}",
            application_name, recipe_id
        );
        if let Err(e) = session.start_deployment(request).await {
            error!("Failed to start deployment: {}", e);
            self.finish(ProgressStatus::Fail, Some(&e)).await;
            return Err(e);
        }

        let mut err_streak: u32 = 0;
        loop {
            let delay = if err_streak == 0 {
                self.options.poll_interval
            } else {
                calc_exp_backoff(&self.options.cooldown, err_streak)
            };

            tokio::select! {
                _ = &mut cancel => {
                    warn!("Deployment of '{}' cancelled, requesting abort...", application_name);
                    if let Err(e) = session.abort_deployment().await {
                        warn!("Abort request failed: {}", e);
                    }
                    let cancelled = PublishError::DeploymentCancelled(
                        "deployment cancelled before completion".to_string(),
                    );
                    self.finish(ProgressStatus::Fail, Some(&cancelled)).await;
                    return Err(cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }

            match session.deployment_status().await {
                Ok(status) => {
                    err_streak = 0;
                    match status.state {
                        DeploymentState::Success => {
                            info!("Deployment of '{}' succeeded", application_name);
                            self.finish(ProgressStatus::Success, None).await;
                            return Ok(());
                        }
                        DeploymentState::Error => {
                            let failure = terminal_failure(status.error);
                            self.finish(ProgressStatus::Fail, Some(&failure)).await;
                            return Err(failure);
                        }
                        DeploymentState::Pending | DeploymentState::Executing => {
                            debug!("Deployment in progress: {:?}", status.state);
                        }
                    }
                }
                Err(e) => {
                    err_streak += 1;
                    if err_streak > self.options.max_error_streak {
                        error!("Giving up after {} failed status checks: {}", err_streak, e);
                        self.finish(ProgressStatus::Fail, Some(&e)).await;
                        return Err(e);
                    }
                    warn!("Status check failed (attempt {}): {}", err_streak, e);
                }
            }
        }
    }

    async fn begin(&self) -> Result<(), PublishError> {
        let mut tracker = self.tracker.lock().await;
        if tracker.status() == ProgressStatus::InProgress {
            return Err(PublishError::DeploymentInFlight(
                "monitor already driving an attempt".to_string(),
            ));
        }
        if tracker.status().is_terminal() {
            tracker
                .restart()
                .map_err(PublishError::Internal)?;
        }
        tracker
            .advance(ProgressStatus::InProgress)
            .map_err(PublishError::Internal)?;
        self.progress_tx.send_replace(tracker.status());
        Ok(())
    }

    async fn finish(&self, outcome: ProgressStatus, error: Option<&PublishError>) {
        {
            let mut tracker = self.tracker.lock().await;
            if let Err(e) = tracker.advance(outcome) {
                error!("Progress bookkeeping error: {}", e);
            }
            self.progress_tx.send_replace(tracker.status());
        }

        let mut attempt = self.attempt.lock().await;
        if let Some(record) = attempt.as_mut() {
            record.finished_at = Some(Utc::now());
            record.error = error.map(|e| e.to_string());
        }
    }

    async fn record_start(&self, application_name: &str, recipe_id: &str) {
        let mut attempt = self.attempt.lock().await;
        *attempt = Some(AttemptRecord {
            application_name: application_name.to_string(),
            recipe_id: recipe_id.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        });
    }
}

/// Map a terminal error payload onto the error taxonomy
fn terminal_failure(problem: Option<ProblemDetails>) -> PublishError {
    match problem {
        Some(problem) => faults::try_translate(&problem)
            .unwrap_or_else(|| PublishError::DeployFault(problem.detail.clone())),
        None => PublishError::DeployFault("deployment ended in error state".to_string()),
    }
}
