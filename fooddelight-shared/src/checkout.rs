/// Order placement
///
/// Validates a submitted cart and records it as one order row, in a single
/// transaction that also resolves the owner's email address for the
/// confirmation email. Once [`place_order`] returns `Ok`, the order is durable;
/// anything that happens afterwards (such as the confirmation email failing)
/// cannot undo it.
///
/// # Example
///
/// ```no_run
/// use fooddelight_shared::checkout::place_order;
/// use fooddelight_shared::models::order::OrderItem;
/// use sqlx::SqlitePool;
/// use uuid::Uuid;
///
/// # async fn example(pool: SqlitePool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let items = vec![OrderItem {
///     image: None,
///     title: "Pizza".to_string(),
///     price: 9.99,
///     quantity: 2,
/// }];
///
/// let placed = place_order(&pool, user_id, items, 19.98).await?;
/// println!("Order {} placed for {}", placed.order.id, placed.owner_email);
/// # Ok(())
/// # }
/// ```

use crate::models::{
    order::{CreateOrder, Order, OrderItem},
    user::User,
};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

/// Largest accepted gap between the client total and the recomputed total
/// before a warning is logged
pub const TOTAL_TOLERANCE: f64 = 0.005;

/// Why an order could not be placed
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The cart has no items
    #[error("Cart is empty")]
    EmptyCart,

    /// An item has a blank title, a bad price or a quantity below one
    #[error("Invalid item at position {index}: {reason}")]
    InvalidItem { index: usize, reason: String },

    /// Total is negative or not a finite number
    #[error("Total must be a finite, non-negative number")]
    InvalidTotal,

    /// The authenticated user no longer exists
    #[error("Owner {0} of the order does not exist")]
    OwnerMissing(Uuid),

    /// The store failed
    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}

/// A recorded order together with where to send its confirmation
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// The stored order
    pub order: Order,

    /// Email address of the owning user
    pub owner_email: String,
}

/// Checks a cart before anything touches the store
///
/// # Errors
///
/// - `OrderError::EmptyCart` if `items` is empty
/// - `OrderError::InvalidItem` for the first item with a blank title, a
///   negative or non-finite price, or a zero quantity
/// - `OrderError::InvalidTotal` if `total` is negative or not finite
pub fn validate_order(items: &[OrderItem], total: f64) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    for (index, item) in items.iter().enumerate() {
        let reason = if item.title.trim().is_empty() {
            Some("title is required")
        } else if !item.price.is_finite() || item.price < 0.0 {
            Some("price must be a finite, non-negative number")
        } else if item.quantity < 1 {
            Some("quantity must be at least 1")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(OrderError::InvalidItem {
                index,
                reason: reason.to_string(),
            });
        }
    }

    if !total.is_finite() || total < 0.0 {
        return Err(OrderError::InvalidTotal);
    }

    Ok(())
}

/// Sum of price × quantity over all items
pub fn recomputed_total(items: &[OrderItem]) -> f64 {
    items.iter().map(OrderItem::line_total).sum()
}

/// Validates and records an order for `user_id`
///
/// The insert and the owner lookup share one transaction: either the order is
/// stored and the owner's email is returned, or nothing is written. A missing
/// owner surfaces as a foreign key violation on the insert.
///
/// The client-computed `total` is stored as submitted. A mismatch with the
/// recomputed total is logged but not rejected.
///
/// # Errors
///
/// - Validation errors from [`validate_order`]
/// - `OrderError::OwnerMissing` if the user row is absent
/// - `OrderError::Store` if the store fails
pub async fn place_order(
    pool: &SqlitePool,
    user_id: Uuid,
    items: Vec<OrderItem>,
    total: f64,
) -> Result<PlacedOrder, OrderError> {
    validate_order(&items, total)?;

    let expected = recomputed_total(&items);
    if (expected - total).abs() > TOTAL_TOLERANCE {
        warn!(
            %user_id,
            submitted_total = total,
            recomputed_total = expected,
            "Order total does not match item prices"
        );
    }

    let mut tx = pool.begin().await?;

    // Write first: a deferred transaction that reads before writing cannot
    // upgrade its lock while another writer is active.
    let order = Order::create(
        &mut *tx,
        CreateOrder {
            user_id,
            items,
            total,
        },
    )
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db_err) if db_err.is_foreign_key_violation() => OrderError::OwnerMissing(user_id),
        _ => OrderError::Store(e),
    })?;

    let owner_email = User::email_of(&mut *tx, user_id)
        .await?
        .ok_or(OrderError::OwnerMissing(user_id))?;

    tx.commit().await?;

    info!(
        order_id = %order.id,
        %user_id,
        item_count = order.items().len(),
        total = order.total,
        "Order placed"
    );

    Ok(PlacedOrder { order, owner_email })
}
