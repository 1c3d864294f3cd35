/// Database layer
///
/// - `pool`: SQLite connection pool with health checks and explicit shutdown
/// - `migrations`: Embedded sqlx migrations creating `users` and `orders`
///
/// Models live in the `models` module at crate root level.
///
/// # Example
///
/// ```no_run
/// use fooddelight_shared::db::{migrations::run_migrations, pool::{close_pool, create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: "sqlite://food-delight.db".to_string(),
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     close_pool(pool).await;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
