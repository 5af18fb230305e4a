//! Session-scoped helper endpoints

use serde_json::Value;

use deploy_api::{
    CreateSessionRequest, CreateSessionResponse, ExistingDeploymentSummary,
    GetConfigurationResponse, GetDeploymentStatusResponse, GetExistingDeploymentsResponse,
    GetRecommendationsResponse, OptionSetting, RecommendationSummary,
    SetConfigurationValueRequest, StartDeploymentRequest,
};

use crate::errors::PublishError;
use crate::protocol::client::RequestClient;
use crate::session::SessionId;

impl RequestClient {
    /// Allocate a new helper session for a project
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CreateSessionResponse, PublishError> {
        self.post("/session", request).await
    }

    /// Get ranked recipe recommendations for the session's project
    pub async fn get_recommendations(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<RecommendationSummary>, PublishError> {
        let path = format!("/session/{}/recommendations", session_id);
        let response: GetRecommendationsResponse = self.get(&path).await?;
        Ok(response.recommendations)
    }

    /// List previously-deployed targets for the session's project
    pub async fn get_existing_deployments(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ExistingDeploymentSummary>, PublishError> {
        let path = format!("/session/{}/deployments", session_id);
        let response: GetExistingDeploymentsResponse = self.get(&path).await?;
        Ok(response.deployments)
    }

    /// Fetch the active recipe's configuration tree
    pub async fn get_configuration(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<OptionSetting>, PublishError> {
        let path = format!("/session/{}/settings", session_id);
        let response: GetConfigurationResponse = self.get(&path).await?;
        Ok(response.options)
    }

    /// Update a single configuration value
    pub async fn set_configuration_value(
        &self,
        session_id: &SessionId,
        request: &SetConfigurationValueRequest,
    ) -> Result<(), PublishError> {
        let path = format!("/session/{}/settings", session_id);
        let _: Value = self.post(&path, request).await?;
        Ok(())
    }

    /// Begin deploying with the supplied settings
    pub async fn start_deployment(
        &self,
        session_id: &SessionId,
        request: &StartDeploymentRequest,
    ) -> Result<(), PublishError> {
        let path = format!("/session/{}/execute", session_id);
        let _: Value = self.post(&path, request).await?;
        Ok(())
    }

    /// Current deployment status for the session
    pub async fn get_deployment_status(
        &self,
        session_id: &SessionId,
    ) -> Result<GetDeploymentStatusResponse, PublishError> {
        let path = format!("/session/{}/execute/status", session_id);
        self.get(&path).await
    }

    /// Ask the helper to abort the in-flight deployment
    pub async fn abort_deployment(&self, session_id: &SessionId) -> Result<(), PublishError> {
        let path = format!("/session/{}/execute/abort", session_id);
        let _: Value = self.post(&path, &Value::Null).await?;
        Ok(())
    }

    /// Release the helper-side session
    pub async fn close_session(&self, session_id: &SessionId) -> Result<(), PublishError> {
        let path = format!("/session/{}/close", session_id);
        let _: Value = self.post(&path, &Value::Null).await?;
        Ok(())
    }
}
