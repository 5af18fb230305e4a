//! Publish destination selection

use serde::{Deserialize, Serialize};

use deploy_api::{ExistingDeploymentSummary, RecommendationSummary};

/// The user's intent: deploy to a new target or redeploy to an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSelectionMode {
    NewTargets,
    ExistingTargets,
}

impl TargetSelectionMode {
    pub fn is_republish(&self) -> bool {
        matches!(self, TargetSelectionMode::ExistingTargets)
    }
}

/// The destination a publish attempt is aimed at.
///
/// Closed on purpose: a new destination kind cannot appear without
/// revisiting the refresh rule below.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishDestination {
    /// A ranked candidate recipe for a first-time deployment
    Recommendation(RecommendationSummary),

    /// A previously-deployed resource to redeploy in place
    Republish(ExistingDeploymentSummary),
}

impl PublishDestination {
    /// Name shown in the target header
    pub fn display_name(&self) -> &str {
        match self {
            PublishDestination::Recommendation(recommendation) => &recommendation.name,
            PublishDestination::Republish(target) => &target.name,
        }
    }

    pub fn is_republish(&self) -> bool {
        matches!(self, PublishDestination::Republish(_))
    }
}

/// Whether the loaded destination must be recomputed for the current mode.
///
/// Pure, so view-model mutations can call it on every change. Refresh is
/// required exactly when the loaded destination's kind matches the mode:
/// recommendations are recomputed whenever "new targets" is re-entered
/// (project state may have changed), and a republish target is
/// re-validated against current server state before reuse. An empty
/// destination is the initial-load path's job, and a destination of the
/// other kind is replaced by that load as well, so neither forces a
/// refresh here.
pub fn should_refresh_target(
    is_republish: bool,
    destination: Option<&PublishDestination>,
) -> bool {
    match (is_republish, destination) {
        (true, Some(PublishDestination::Republish(_))) => true,
        (false, Some(PublishDestination::Recommendation(_))) => true,
        _ => false,
    }
}
