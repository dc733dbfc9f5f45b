//! Centralized error handling for the application.
//!
//! Flow-fatal SSO failures map to terminal error responses with generic
//! messages; provider and infrastructure detail is logged, never surfaced to
//! the caller.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bb8_redis::bb8;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::config::ConfigError;
use super::jwt::JwtError;
use super::oauth::OAuthError;
use super::password::HashingError;

const INTERNAL_MSG: &str = "An internal server error occurred";
const SIGN_IN_FAILED_MSG: &str = "Sign-in failed. Please try again.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid request format: {0}")]
    RequestFormat(String),

    #[error("Invalid callback: {0}")]
    InvalidCallback(String),

    #[error("Invalid state")]
    InvalidState,

    #[error("Account creation failed: {0}")]
    AccountCreation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Internal libraries
    #[error("Config operation failed")]
    Config(#[from] ConfigError),

    #[error("JWT operation failed")]
    Jwt(#[from] JwtError),

    #[error("OAuth operation failed")]
    OAuth(#[from] OAuthError),

    #[error("Password hashing operation failed")]
    Hashing(#[from] HashingError),

    // Third-party libraries
    #[error("Sea ORM operation failed")]
    Database(#[from] sea_orm::DbErr),

    #[error("Redis operation failed")]
    Redis(#[from] redis::RedisError),

    #[error("Redis connection pool operation failed")]
    RedisPool(#[from] bb8::RunError<redis::RedisError>),

    #[error("Serde JSON operation failed")]
    JsonParse(#[from] serde_json::Error),

    #[error("An internal server error occurred")]
    Internal,
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::RequestFormat(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Validation(err) => {
                let details = json!(err.field_errors());
                (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed".to_string(), Some(details))
            },
            AppError::RequestFormat(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::InvalidCallback(msg) => (StatusCode::BAD_REQUEST, format!("Invalid callback: {msg}"), None),
            AppError::InvalidState => (StatusCode::FORBIDDEN, "Invalid state".to_string(), None),
            AppError::AccountCreation(msg) => {
                tracing::error!("Account creation rejected: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, SIGN_IN_FAILED_MSG.to_string(), None)
            },
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),

            // Internal libraries
            AppError::Config(err) => {
                tracing::error!("Config getter error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },
            AppError::Jwt(err) => {
                tracing::error!("JWT error: {:?}", err);
                let status = match err {
                    JwtError::TokenExpired | JwtError::InvalidToken => StatusCode::UNAUTHORIZED,
                    JwtError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match err {
                    JwtError::TokenExpired | JwtError::InvalidToken => err.to_string(),
                    JwtError::TokenCreation => INTERNAL_MSG.to_string(),
                };
                (status, message, None)
            },
            AppError::OAuth(err) => {
                // Provider failures are fatal to the flow but their detail
                // stays in the logs.
                tracing::error!("OAuth flow error: {:?}", err);
                let status = match err {
                    OAuthError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    OAuthError::Network(_) | OAuthError::Protocol(_) => StatusCode::BAD_GATEWAY,
                };
                (status, SIGN_IN_FAILED_MSG.to_string(), None)
            },
            AppError::Hashing(err) => {
                tracing::error!("Password hashing error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },

            // Third-party libraries
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },
            AppError::Redis(err) | AppError::RedisPool(bb8::RunError::User(err)) => {
                tracing::error!("Redis error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },
            AppError::RedisPool(bb8::RunError::TimedOut) => {
                tracing::error!("Redis connection pool timed out");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },
            AppError::JsonParse(err) => {
                tracing::error!("Failed to parse JSON: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None),
        };

        (status, Json(ErrorResponse { message, details })).into_response()
    }
}
