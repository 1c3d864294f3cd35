/// Session authentication middleware
///
/// Runs before the handler, so a request without a valid session token is
/// rejected with 401 before its body is read. On success the caller's
/// [`SessionUser`] is placed in the request extensions.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use fooddelight_shared::auth::session::{bearer_token, SessionError};
use uuid::Uuid;

/// The authenticated caller of a protected route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: Uuid,
}

/// Validates the `Authorization: Bearer` token of the request
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = authenticate(&state, &req).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Session rejected");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(SessionUser { user_id });

    Ok(next.run(req).await)
}

fn authenticate(state: &AppState, req: &Request) -> Result<Uuid, SessionError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| SessionError::Malformed("Authorization header is not valid text".to_string()))?,
        ),
        None => None,
    };

    let token = bearer_token(header)?;
    state.sessions.validate(token)
}
