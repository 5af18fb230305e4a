//! Deployment session handle

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use deploy_api::{
    CreateSessionRequest, DeploymentState, ExistingDeploymentSummary,
    GetDeploymentStatusResponse, OptionSetting, RecommendationSummary,
    SetConfigurationValueRequest, StartDeploymentRequest,
};

use crate::credentials::CredentialsSupplier;
use crate::errors::PublishError;
use crate::protocol::client::RequestClient;
use crate::server::handle::ServerProcessHandle;

/// Opaque helper-issued session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A session-scoped handle over one publish attempt.
///
/// Bound to exactly one server handle. Every call fails with a
/// session-invalid error once the helper disconnects and is never
/// retried here; the caller decides whether to allocate a fresh
/// session. A session runs at most one deployment at a time.
pub struct DeploymentSession {
    id: SessionId,
    server: Arc<ServerProcessHandle>,
    client: RequestClient,
    deploying: AtomicBool,
    default_application_name: Option<String>,
}

impl DeploymentSession {
    /// Ask the helper to allocate a session for a project
    pub async fn create(
        server: Arc<ServerProcessHandle>,
        credentials: Arc<dyn CredentialsSupplier>,
        request: CreateSessionRequest,
    ) -> Result<Self, PublishError> {
        let client = server.request_client(credentials).await?;
        let response = client.create_session(&request).await?;
        info!("Created deploy session {}", response.session_id);

        Ok(Self {
            id: SessionId(response.session_id),
            server,
            client,
            deploying: AtomicBool::new(false),
            default_application_name: response.default_application_name,
        })
    }

    /// The helper-issued session id
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Application name suggested by the helper at session creation
    pub fn default_application_name(&self) -> Option<&str> {
        self.default_application_name.as_deref()
    }

    fn guard_connected(&self) -> Result<(), PublishError> {
        if self.server.is_connected() {
            Ok(())
        } else {
            Err(PublishError::SessionInvalid(format!(
                "server disconnected, session {} is gone",
                self.id
            )))
        }
    }

    /// Ranked recommendations for a project not deployed before
    pub async fn recommendations(&self) -> Result<Vec<RecommendationSummary>, PublishError> {
        self.guard_connected()?;
        self.client.get_recommendations(&self.id).await
    }

    /// Previously-deployed targets available for republish
    pub async fn existing_deployments(
        &self,
    ) -> Result<Vec<ExistingDeploymentSummary>, PublishError> {
        self.guard_connected()?;
        self.client.get_existing_deployments(&self.id).await
    }

    /// The active recipe's configuration tree
    pub async fn configuration(&self) -> Result<Vec<OptionSetting>, PublishError> {
        self.guard_connected()?;
        self.client.get_configuration(&self.id).await
    }

    /// Update one configuration value by its slash-joined path
    pub async fn set_configuration_value(
        &self,
        option_path: &str,
        value: Value,
    ) -> Result<(), PublishError> {
        self.guard_connected()?;
        let request = SetConfigurationValueRequest {
            option_path: option_path.to_string(),
            value,
        };
        self.client.set_configuration_value(&self.id, &request).await
    }

    /// Begin a deployment.
    ///
    /// A second start while one is in flight is rejected, not queued.
    pub async fn start_deployment(
        &self,
        request: StartDeploymentRequest,
    ) -> Result<(), PublishError> {
        self.guard_connected()?;
        if self.deploying.swap(true, Ordering::SeqCst) {
            return Err(PublishError::DeploymentInFlight(format!(
                "session {}",
                self.id
            )));
        }

        match self.client.start_deployment(&self.id, &request).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.deploying.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Current deployment status; a terminal state clears the in-flight
    /// latch so the session can be reused for a retry of the attempt.
    pub async fn deployment_status(&self) -> Result<GetDeploymentStatusResponse, PublishError> {
        self.guard_connected()?;
        let status = self.client.get_deployment_status(&self.id).await?;
        if matches!(
            status.state,
            DeploymentState::Success | DeploymentState::Error
        ) {
            self.deploying.store(false, Ordering::SeqCst);
        }
        Ok(status)
    }

    /// Best-effort abort of the in-flight deployment
    pub async fn abort_deployment(&self) -> Result<(), PublishError> {
        self.guard_connected()?;
        self.client.abort_deployment(&self.id).await
    }

    /// Release the helper-side session
    pub async fn close(&self) -> Result<(), PublishError> {
        self.guard_connected()?;
        debug!("Closing deploy session {}", self.id);
        self.client.close_session(&self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Credentials, StaticCredentials};
    use crate::server::launcher::testing::FakeLauncher;
    use crate::server::launcher::ServerOptions;

    async fn started_server() -> Arc<ServerProcessHandle> {
        let handle = Arc::new(ServerProcessHandle::with_launcher(
            ServerOptions::default(),
            Arc::new(FakeLauncher::new()),
        ));
        handle.start().await.unwrap();
        handle
    }

    fn test_credentials() -> Arc<dyn CredentialsSupplier> {
        Arc::new(StaticCredentials::new(Credentials {
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "secret".into(),
            session_token: None,
        }))
    }

    async fn test_session(server: Arc<ServerProcessHandle>) -> DeploymentSession {
        let client = server.request_client(test_credentials()).await.unwrap();
        DeploymentSession {
            id: SessionId("session-1".to_string()),
            server,
            client,
            deploying: AtomicBool::new(false),
            default_application_name: None,
        }
    }

    #[tokio::test]
    async fn test_calls_fail_after_disconnect() {
        let server = started_server().await;
        let session = test_session(server.clone()).await;

        server.stop();

        let result = session.recommendations().await;
        assert!(matches!(result, Err(PublishError::SessionInvalid(_))));
    }

    #[tokio::test]
    async fn test_second_deployment_rejected_while_in_flight() {
        let server = started_server().await;
        let session = test_session(server).await;
        session.deploying.store(true, Ordering::SeqCst);

        let request = StartDeploymentRequest {
            application_name: "my-app".to_string(),
            recipe_id: "recipe".to_string(),
            settings: vec![],
        };
        let result = session.start_deployment(request).await;
        assert!(matches!(result, Err(PublishError::DeploymentInFlight(_))));
    }
}
