//! Hosted-backend (GoTrue) implementation of the `AuthService` trait.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::services::auth_service::{AuthError, AuthService, AuthUser};

/// Subset of the provider's user payload we care about.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
}

pub struct SupabaseAuthService {
    client: Client,
    user_endpoint: String,
    anon_key: String,
}

impl SupabaseAuthService {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.request_timeout_seconds,
            ))
            .user_agent("Kalkops/1.0")
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build auth HTTP client: {e}"))?;

        Ok(Self {
            client,
            user_endpoint: format!("{}/auth/v1/user", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        })
    }
}

#[async_trait]
impl AuthService for SupabaseAuthService {
    async fn verify_bearer(&self, token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(&self.user_endpoint)
            .header("Authorization", format!("Bearer {token}"))
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let user: ProviderUser = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Upstream(format!("Malformed user payload: {e}")))?;

                Ok(AuthUser {
                    id: user.id,
                    email: user.email.unwrap_or_default(),
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Rejected),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AuthError::Upstream(format!(
                    "Unexpected status {status}: {body}"
                )))
            }
        }
    }
}
