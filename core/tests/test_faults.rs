//! Error translator unit tests

use deploy_api::ProblemDetails;
use stevedore::faults::try_translate;
use stevedore::PublishError;

fn problem(status: u16, detail: &str) -> ProblemDetails {
    ProblemDetails {
        status,
        title: None,
        detail: detail.to_string(),
    }
}

#[test]
fn test_invalid_application_name_is_translated() {
    let detail = "Invalid cloud application name: xyz";
    let result = try_translate(&problem(400, detail));

    match result {
        Some(PublishError::InvalidApplicationName(message)) => {
            assert_eq!(message, detail);
        }
        other => panic!("unexpected translation: {other:?}"),
    }
}

#[test]
fn test_invalid_stack_name_is_translated() {
    let result = try_translate(&problem(400, "Invalid stack name: 9-lives"));
    assert!(matches!(result, Some(PublishError::InvalidStackName(_))));
}

#[test]
fn test_non_400_is_never_handled() {
    let detail = "Invalid cloud application name: xyz";
    assert!(try_translate(&problem(500, detail)).is_none());
    assert!(try_translate(&problem(503, detail)).is_none());
}

#[test]
fn test_unrelated_400_detail_is_not_handled() {
    assert!(try_translate(&problem(400, "some other validation error")).is_none());
}

#[test]
fn test_empty_detail_is_not_handled() {
    assert!(try_translate(&problem(400, "")).is_none());
    assert!(try_translate(&problem(400, "   ")).is_none());
}

#[test]
fn test_marker_match_is_case_insensitive() {
    let result = try_translate(&problem(400, "INVALID CLOUD APPLICATION NAME: xyz"));
    assert!(matches!(
        result,
        Some(PublishError::InvalidApplicationName(_))
    ));
}
