//! Bearer-token verification against the hosted auth provider.

use thiserror::Error;
use uuid::Uuid;

/// Errors specific to credential verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider rejected the token (invalid, expired or revoked).
    #[error("Invalid or expired token")]
    Rejected,

    /// The provider could not be reached or answered unexpectedly.
    #[error("Auth provider error: {0}")]
    Upstream(String),
}

/// Identity attached to a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Verifies bearer tokens issued by the hosted backend.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Resolves a bearer token to the user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] for tokens the provider does not
    /// accept and [`AuthError::Upstream`] when verification itself fails.
    async fn verify_bearer(&self, token: &str) -> Result<AuthUser, AuthError>;
}
