//! API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub project_path: String,
    pub target_region: Option<String>,
}

/// Session creation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub default_application_name: Option<String>,
}

/// A ranked candidate recipe for a project that has not been deployed before
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    /// Recipe identifier
    pub recipe_id: String,

    /// Display name of the recipe
    pub name: String,

    /// Short description shown in the target list
    pub description: Option<String>,

    /// Rank within the recommendation set, lower is better
    pub rank: u32,

    /// Compute service the recipe deploys to
    pub target_service: String,
}

/// Recommendations response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRecommendationsResponse {
    pub recommendations: Vec<RecommendationSummary>,
}

/// A previously-deployed resource the project can be redeployed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingDeploymentSummary {
    /// Cloud-side identifier of the deployed stack
    pub stack_id: String,

    /// Application name the stack was deployed under
    pub name: String,

    /// Recipe the stack was originally deployed with
    pub recipe_id: String,

    /// Last successful deployment time
    pub last_deployed_at: Option<DateTime<Utc>>,
}

/// Existing deployments response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetExistingDeploymentsResponse {
    pub deployments: Vec<ExistingDeploymentSummary>,
}

/// Kind of a configuration option node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Text,
    Number,
    Bool,
    List,
    Object,
    /// Rendered as a single role-picker widget; its internal fields are
    /// never shown as a sub-tree.
    IamRole,
}

/// A node in a recipe's editable configuration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSetting {
    /// Identifier, unique among siblings
    pub id: String,

    /// Display name
    pub name: String,

    /// Description shown as help text
    pub description: Option<String>,

    /// Node kind
    pub kind: OptionKind,

    /// Leaf value, absent on interior nodes
    pub value: Option<serde_json::Value>,

    /// Child nodes in recipe-defined display order
    #[serde(default)]
    pub children: Vec<OptionSetting>,

    /// Hidden from the basic view unless the user opts in
    #[serde(default)]
    pub advanced: bool,
}

/// Configuration response for a session's active recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetConfigurationResponse {
    pub options: Vec<OptionSetting>,
}

/// Request to update a single configuration value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetConfigurationValueRequest {
    /// Slash-joined ids from the root to the option
    pub option_path: String,

    /// New leaf value
    pub value: serde_json::Value,
}

/// A flattened option value sent with a deployment request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
    pub option_path: String,
    pub value: serde_json::Value,
}

/// Request to start a deployment for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartDeploymentRequest {
    pub application_name: String,
    pub recipe_id: String,
    pub settings: Vec<OptionValue>,
}

/// Server-side deployment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentState {
    Pending,
    Executing,
    Success,
    Error,
}

/// Deployment status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDeploymentStatusResponse {
    pub state: DeploymentState,

    /// Populated when `state` is `Error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProblemDetails>,
}

/// Structured error payload returned as the body of a failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Numeric HTTP-style status
    pub status: u16,

    /// Short human-readable summary
    #[serde(default)]
    pub title: Option<String>,

    /// Free-text detail describing the failure
    #[serde(default)]
    pub detail: String,
}

/// Event pushed over the helper's streaming channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// A log line emitted by the deployment
    Log {
        level: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The deployment moved to a new state
    Status { state: DeploymentState },

    /// The helper closed the session
    SessionClosed { session_id: String },
}

/// Helper health probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
