/// Database models
///
/// - `user`: Registered accounts (email + password hash)
/// - `order`: Placed orders with their item list stored as JSON
///
/// Query functions take any sqlx executor, so they run equally against the
/// pool or inside a transaction.

pub mod order;
pub mod user;
