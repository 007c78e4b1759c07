use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::services::AuthError;

/// JSON shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// No usable bearer credential on the request.
    AuthenticationRequired,

    /// The credential was presented but did not verify.
    AuthenticationInvalid(String),

    /// Authenticated, but the profile lacks the required capability.
    AuthorizationDenied(String),

    ValidationError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationRequired => write!(f, "Authentication required"),
            Self::AuthenticationInvalid(msg) => write!(f, "Authentication invalid: {}", msg),
            Self::AuthorizationDenied(msg) => write!(f, "Authorization denied: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "Authentication required".to_string(),
                    details: None,
                },
            ),
            Self::AuthenticationInvalid(reason) => {
                tracing::warn!("Token verification failed: {}", reason);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody {
                        error: "Invalid or expired token".to_string(),
                        details: None,
                    },
                )
            }
            Self::AuthorizationDenied(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    error: msg,
                    details: None,
                },
            ),
            Self::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    details: None,
                },
            ),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Internal server error".to_string(),
                        details: Some(msg),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

/// Any verification failure is unauthorized to the caller; the distinction
/// only matters for logging.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected => Self::AuthenticationInvalid("rejected by provider".to_string()),
            AuthError::Upstream(msg) => Self::AuthenticationInvalid(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
