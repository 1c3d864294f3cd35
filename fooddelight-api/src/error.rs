/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Component errors from
/// `fooddelight-shared` convert into [`ApiError`] through `From` impls, and
/// [`ApiError`] renders as a JSON body:
///
/// ```json
/// { "error": "Cart is empty", "code": "empty_cart" }
/// ```
///
/// Internal failures are logged and reported to the client with a generic
/// message only.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fooddelight_shared::{
    auth::{credentials::CredentialError, session::SessionError},
    checkout::OrderError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request data (400)
    BadRequest(String),

    /// Field-level validation failures (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Email already registered (400)
    DuplicateEmail,

    /// Unknown email or wrong password, deliberately indistinguishable (400)
    InvalidCredentials,

    /// Order rejected before anything was stored (400)
    InvalidOrder { code: &'static str, message: String },

    /// Missing, malformed or expired session token (401)
    Unauthorized(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g., "duplicate_email")
    pub code: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::DuplicateEmail => write!(f, "Email is already registered"),
            ApiError::InvalidCredentials => write!(f, "Invalid email or password"),
            ApiError::InvalidOrder { message, .. } => write!(f, "Invalid order: {}", message),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "duplicate_email",
                "Registration failed, email may already exist".to_string(),
                None,
            ),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                "Invalid email or password".to_string(),
                None,
            ),
            ApiError::InvalidOrder { code, message } => (StatusCode::BAD_REQUEST, code, message, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::InternalError(format!("Database error: {}", err))
    }
}

/// Convert JSON body rejections to API errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    }
}

/// Convert credential store errors to API errors
impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidInput => ApiError::BadRequest(err.to_string()),
            CredentialError::DuplicateEmail => ApiError::DuplicateEmail,
            CredentialError::NotFound | CredentialError::BadCredentials => ApiError::InvalidCredentials,
            CredentialError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            CredentialError::Store(e) => e.into(),
        }
    }
}

/// Convert session errors to API errors
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MissingToken => ApiError::Unauthorized("No token provided".to_string()),
            SessionError::Malformed(_) | SessionError::Expired => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            SessionError::Signing(msg) => {
                ApiError::InternalError(format!("Failed to issue session token: {}", msg))
            }
        }
    }
}

/// Convert order placement errors to API errors
impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let code = match &err {
            OrderError::EmptyCart => "empty_cart",
            OrderError::InvalidItem { .. } => "invalid_item",
            OrderError::InvalidTotal => "invalid_total",
            OrderError::OwnerMissing(_) | OrderError::Store(_) => {
                return ApiError::InternalError(err.to_string());
            }
        };

        ApiError::InvalidOrder {
            code,
            message: err.to_string(),
        }
    }
}
