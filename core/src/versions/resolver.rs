//! Tool version resolution

use async_trait::async_trait;
use semver::Version;
use tracing::{debug, info};
use url::Url;

use crate::errors::PublishError;
use crate::versions::range::VersionRange;

/// Source of published versions for a package
#[async_trait]
pub trait VersionFeed: Send + Sync {
    /// All published version strings for `package_id`
    async fn published_versions(&self, package_id: &str) -> Result<Vec<String>, PublishError>;
}

/// Version feed backed by the tool registry
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RegistryClient {
    pub fn new(base_url: Url) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl VersionFeed for RegistryClient {
    async fn published_versions(&self, package_id: &str) -> Result<Vec<String>, PublishError> {
        let url = self
            .base_url
            .join(&format!("packages/{package_id}/versions"))
            .map_err(|e| PublishError::Internal(e.to_string()))?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::DeployFault(format!("{}: {}", status, body)));
        }

        #[derive(serde::Deserialize)]
        struct VersionsResponse {
            versions: Vec<String>,
        }

        let body: VersionsResponse = response.json().await?;
        Ok(body.versions)
    }
}

/// Pick the highest published version of `package_id` satisfying `range`.
///
/// This pins which helper build is compatible with the current recipe
/// set. Registry entries that are not semantic versions are skipped.
pub async fn best_version_in_range<F>(
    feed: &F,
    package_id: &str,
    range: &VersionRange,
) -> Result<Version, PublishError>
where
    F: VersionFeed + ?Sized,
{
    let published = feed.published_versions(package_id).await?;
    let best = published
        .iter()
        .filter_map(|raw| Version::parse(raw).ok())
        .filter(|version| range.matches(version))
        .max();

    match best {
        Some(version) => {
            info!("Resolved {} {} for range {}", package_id, version, range);
            Ok(version)
        }
        None => Err(PublishError::NoVersionInRange {
            package: package_id.to_string(),
            range: range.to_string(),
        }),
    }
}
