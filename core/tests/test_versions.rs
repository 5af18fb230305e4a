//! Version resolver unit tests

use async_trait::async_trait;
use semver::Version;
use stevedore::versions::range::VersionRange;
use stevedore::versions::resolver::{best_version_in_range, VersionFeed};
use stevedore::PublishError;

struct FixedFeed {
    versions: Vec<&'static str>,
}

#[async_trait]
impl VersionFeed for FixedFeed {
    async fn published_versions(&self, _package_id: &str) -> Result<Vec<String>, PublishError> {
        Ok(self.versions.iter().map(|v| v.to_string()).collect())
    }
}

fn range(notation: &str) -> VersionRange {
    notation.parse().unwrap()
}

#[tokio::test]
async fn test_resolves_highest_version_in_range() {
    let feed = FixedFeed {
        versions: vec!["1.9.0", "2.0.0", "2.5.0", "3.0.0"],
    };

    let version = best_version_in_range(&feed, "deploy-helper", &range("[2.0.0,3.0.0)"))
        .await
        .unwrap();
    assert_eq!(version, Version::parse("2.5.0").unwrap());
}

#[tokio::test]
async fn test_no_match_names_package_and_range() {
    let feed = FixedFeed {
        versions: vec!["1.0.0"],
    };

    let result = best_version_in_range(&feed, "deploy-helper", &range("[2.0.0,3.0.0)")).await;
    match result {
        Err(PublishError::NoVersionInRange { package, range }) => {
            assert_eq!(package, "deploy-helper");
            assert_eq!(range, "[2.0.0,3.0.0)");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_semver_entries_are_skipped() {
    let feed = FixedFeed {
        versions: vec!["not-a-version", "2.1.0"],
    };

    let version = best_version_in_range(&feed, "deploy-helper", &range("[2.0.0,3.0.0)"))
        .await
        .unwrap();
    assert_eq!(version, Version::parse("2.1.0").unwrap());
}

#[tokio::test]
async fn test_feed_errors_propagate() {
    struct FailingFeed;

    #[async_trait]
    impl VersionFeed for FailingFeed {
        async fn published_versions(
            &self,
            _package_id: &str,
        ) -> Result<Vec<String>, PublishError> {
            Err(PublishError::DeployFault("registry unreachable".to_string()))
        }
    }

    let result = best_version_in_range(&FailingFeed, "deploy-helper", &range("1.0.0")).await;
    assert!(matches!(result, Err(PublishError::DeployFault(_))));
}
