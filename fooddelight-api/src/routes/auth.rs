/// Authentication endpoints
///
/// - `POST /api/register` - Create an account
/// - `POST /api/login` - Exchange credentials for a session token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use fooddelight_shared::auth::credentials::{self, normalize_email};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[serde(default)]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    pub email: String,

    /// Password
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token (HS256 JWT, valid for one hour)
    pub token: String,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

fn require_credentials(email: &str, password: &str) -> ApiResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    }
    Ok(())
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/register
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Response
///
/// ```json
/// 201 Created
/// {
///   "message": "User registered successfully",
///   "user_id": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, invalid email, or email already registered
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    require_credentials(&req.email, &req.password)?;

    let req = RegisterRequest {
        email: normalize_email(&req.email),
        password: req.password,
    };
    req.validate()?;

    let user_id = credentials::register(&state.db, &req.email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id,
        }),
    ))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "expires_at": "2025-01-01T13:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, or unknown email / wrong password
///   (one shared message for both)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    require_credentials(&req.email, &req.password)?;

    let user = credentials::verify(&state.db, &req.email, &req.password).await?;
    let issued = state.sessions.issue(user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
