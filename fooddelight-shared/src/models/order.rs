/// Order model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE orders (
///     id BLOB PRIMARY KEY NOT NULL,
///     user_id BLOB NOT NULL REFERENCES users(id),
///     items TEXT NOT NULL,
///     total REAL NOT NULL CHECK (total >= 0),
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// The item list is stored as an opaque JSON array next to the numeric total;
/// it is not decomposed into rows. Orders are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, Executor, Sqlite};
use uuid::Uuid;

/// One line of an order as submitted by the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product image URL, shown in the confirmation email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Product title
    pub title: String,

    /// Unit price
    pub price: f64,

    /// Number of units, at least 1
    pub quantity: u32,
}

impl OrderItem {
    /// Unit price times quantity
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A placed order
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Items in the order they were submitted
    pub items: Json<Vec<OrderItem>>,

    /// Order total as submitted by the client
    pub total: f64,

    /// When the order was placed
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new order
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Owning user, must exist
    pub user_id: Uuid,

    /// Validated, non-empty item list
    pub items: Vec<OrderItem>,

    /// Validated total
    pub total: f64,
}

impl Order {
    /// Items of this order
    pub fn items(&self) -> &[OrderItem] {
        &self.items.0
    }

    /// Inserts a new order with a generated ID
    ///
    /// # Errors
    ///
    /// Returns a database error if the owning user does not exist (foreign key
    /// violation) or the connection fails
    pub async fn create<'e, E>(executor: E, data: CreateOrder) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (id, user_id, items, total, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, items, total, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(Json(data.items))
        .bind(data.total)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    /// Finds an order by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, items, total, created_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Counts all stored orders
    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(executor)
            .await
    }
}
