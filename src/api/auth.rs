use axum::http::HeaderMap;

use super::{ApiError, AppState};
use crate::services::AuthUser;

/// Token from `Authorization: Bearer <token>`, if present and non-empty.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}

/// Resolves the request's bearer token to a verified user.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::AuthenticationRequired)?;
    let user = state.auth.verify_bearer(token).await?;

    tracing::Span::current().record("user_id", user.email.as_str());

    Ok(user)
}
