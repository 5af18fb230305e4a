//! Target selector unit tests

use deploy_api::{ExistingDeploymentSummary, RecommendationSummary};
use stevedore::targets::{should_refresh_target, PublishDestination, TargetSelectionMode};

fn recommendation() -> PublishDestination {
    PublishDestination::Recommendation(RecommendationSummary {
        recipe_id: "container-service".to_string(),
        name: "Container Service".to_string(),
        description: None,
        rank: 1,
        target_service: "containers".to_string(),
    })
}

fn republish_target() -> PublishDestination {
    PublishDestination::Republish(ExistingDeploymentSummary {
        stack_id: "stack-1234".to_string(),
        name: "my-app".to_string(),
        recipe_id: "container-service".to_string(),
        last_deployed_at: None,
    })
}

#[test]
fn test_republish_mode_refreshes_republish_target() {
    assert!(should_refresh_target(true, Some(&republish_target())));
}

#[test]
fn test_new_target_mode_refreshes_recommendation() {
    assert!(should_refresh_target(false, Some(&recommendation())));
}

#[test]
fn test_empty_destination_never_refreshes() {
    assert!(!should_refresh_target(false, None));
    assert!(!should_refresh_target(true, None));
}

#[test]
fn test_mismatched_destination_kind_does_not_refresh() {
    // The predicate is deliberately narrow: a destination of the other
    // kind is replaced by the mode's own load path.
    assert!(!should_refresh_target(true, Some(&recommendation())));
    assert!(!should_refresh_target(false, Some(&republish_target())));
}

#[test]
fn test_mode_maps_to_republish_flag() {
    assert!(TargetSelectionMode::ExistingTargets.is_republish());
    assert!(!TargetSelectionMode::NewTargets.is_republish());
}

#[test]
fn test_destination_display_name() {
    assert_eq!(recommendation().display_name(), "Container Service");
    assert_eq!(republish_target().display_name(), "my-app");
    assert!(republish_target().is_republish());
}
