//! HTTP client for the deploy helper

use std::sync::Arc;

use http::StatusCode;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use deploy_api::ProblemDetails;

use crate::credentials::CredentialsSupplier;
use crate::errors::PublishError;
use crate::faults;

const HEADER_ACCESS_KEY_ID: &str = "x-access-key-id";
const HEADER_SECRET_ACCESS_KEY: &str = "x-secret-access-key";
const HEADER_SESSION_TOKEN: &str = "x-session-token";
const HEADER_REQUEST_ID: &str = "x-request-id";

/// Request/response client for the deploy helper
pub struct RequestClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialsSupplier>,
}

impl RequestClient {
    pub(crate) fn new(
        base_url: Url,
        credentials: Arc<dyn CredentialsSupplier>,
    ) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Get the helper base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, PublishError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let request = self.authorize(self.client.get(url)).await?;
        let response = request.send().await?;
        decode("GET", response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PublishError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let request = self.authorize(self.client.post(url).json(body)).await?;
        let response = request.send().await?;
        decode("POST", response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, PublishError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| PublishError::Internal(e.to_string()))
    }

    /// Attach fresh credentials and a correlation id.
    ///
    /// Credentials are re-resolved on every call; a deployment session
    /// can outlive short-lived tokens, so values cached at client
    /// construction would go stale mid-attempt.
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, PublishError> {
        let credentials = self.credentials.credentials().await?;

        let mut request = request
            .header(HEADER_ACCESS_KEY_ID, credentials.access_key_id.as_str())
            .header(
                HEADER_SECRET_ACCESS_KEY,
                credentials.secret_access_key.expose_secret(),
            )
            .header(HEADER_REQUEST_ID, uuid::Uuid::new_v4().to_string());

        if let Some(token) = &credentials.session_token {
            request = request.header(HEADER_SESSION_TOKEN, token.expose_secret());
        }

        Ok(request)
    }
}

async fn decode<T: DeserializeOwned>(method: &str, response: Response) -> Result<T, PublishError> {
    let status = response.status();
    if status.is_success() {
        let body = response.json().await?;
        return Ok(body);
    }

    let body = response.text().await.unwrap_or_default();
    error!("HTTP {} failed: {} - {}", method, status, body);
    Err(classify_failure(status, &body))
}

/// Map a failed response onto the error taxonomy: recognized validation
/// categories become typed errors, everything else a deploy-tool fault
/// with the message preserved.
fn classify_failure(status: StatusCode, body: &str) -> PublishError {
    match serde_json::from_str::<ProblemDetails>(body) {
        Ok(problem) => faults::try_translate(&problem).unwrap_or_else(|| {
            PublishError::DeployFault(format!("{}: {}", problem.status, problem.detail))
        }),
        Err(_) => PublishError::DeployFault(format!("{}: {}", status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_failure_translates_known_validation() {
        let body = r#"{"status": 400, "detail": "Invalid cloud application name: app?"}"#;
        let error = classify_failure(StatusCode::BAD_REQUEST, body);
        assert!(matches!(error, PublishError::InvalidApplicationName(_)));
    }

    #[test]
    fn test_classify_failure_wraps_unknown_problem() {
        let body = r#"{"status": 500, "detail": "stack overflow in helper"}"#;
        let error = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, body);
        match error {
            PublishError::DeployFault(message) => {
                assert!(message.contains("stack overflow in helper"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_failure_handles_unparseable_body() {
        let error = classify_failure(StatusCode::BAD_GATEWAY, "<html>gateway</html>");
        match error {
            PublishError::DeployFault(message) => {
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
