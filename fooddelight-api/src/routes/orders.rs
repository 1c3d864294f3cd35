/// Order endpoints
///
/// - `POST /api/place-order` - Record the caller's cart as an order and send a
///   confirmation email
///
/// The order is committed before the email is attempted. An email failure is
/// reported through `email_sent: false` and never turns the response into an
/// error.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::SessionUser,
};
use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use fooddelight_shared::{checkout, models::order::OrderItem, notify::OrderSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ORDER_PLACED_EMAIL_SENT: &str = "Order placed successfully, confirmation email sent";
pub const ORDER_PLACED_EMAIL_FAILED: &str =
    "Order placed successfully, but the confirmation email could not be sent";

/// Place order request
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Cart lines
    pub items: Option<Vec<OrderItem>>,

    /// Client-computed total
    pub total: Option<f64>,
}

/// Place order response
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order_id: Uuid,
    /// Whether the confirmation email was delivered
    pub email_sent: bool,
}

/// Place an order for the authenticated user
///
/// # Endpoint
///
/// ```text
/// POST /api/place-order
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "items": [{ "image": "https://...", "title": "Pizza", "price": 9.99, "quantity": 2 }],
///   "total": 19.98
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "Order placed successfully, confirmation email sent",
///   "order_id": "uuid",
///   "email_sent": true
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, empty cart, invalid item or total
/// - `401 Unauthorized`: Missing, malformed or expired token
/// - `500 Internal Server Error`: Server error
pub async fn place_order(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> ApiResult<Json<PlaceOrderResponse>> {
    let Json(req) = payload?;

    let (Some(items), Some(total)) = (req.items, req.total) else {
        return Err(ApiError::BadRequest("Invalid order data".to_string()));
    };

    let placed = checkout::place_order(&state.db, session.user_id, items, total).await?;

    let summary = OrderSummary::from_order(&placed.order);
    let email_sent = match state
        .notifier
        .send_confirmation(&placed.owner_email, &summary)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                order_id = %placed.order.id,
                user_id = %session.user_id,
                error = %e,
                "Order placed without confirmation email"
            );
            false
        }
    };

    let message = if email_sent {
        ORDER_PLACED_EMAIL_SENT
    } else {
        ORDER_PLACED_EMAIL_FAILED
    };

    Ok(Json(PlaceOrderResponse {
        message: message.to_string(),
        order_id: placed.order.id,
        email_sent,
    }))
}
