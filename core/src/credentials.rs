//! Credential resolution for outbound helper calls

use async_trait::async_trait;
use secrecy::SecretString;

use crate::errors::PublishError;

/// A set of cloud credentials valid at one point in time
#[derive(Clone)]
pub struct Credentials {
    /// Access key identifier
    pub access_key_id: String,

    /// Secret key half
    pub secret_access_key: SecretString,

    /// Session token for temporary credentials
    pub session_token: Option<SecretString>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// Credentials supplier trait for testability.
///
/// Resolved immediately before every outbound call. Deployment sessions
/// can outlive short-lived tokens (temporary/MFA/SSO), so implementations
/// must return fresh values on each invocation instead of caching at
/// construction time.
#[async_trait]
pub trait CredentialsSupplier: Send + Sync {
    /// Resolve the credentials to attach to the next call
    async fn credentials(&self) -> Result<Credentials, PublishError>;
}

/// Fixed credentials for long-lived keys and tests
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialsSupplier for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials, PublishError> {
        Ok(self.credentials.clone())
    }
}
