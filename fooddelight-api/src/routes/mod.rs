/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `orders`: Order placement

pub mod auth;
pub mod health;
pub mod orders;
