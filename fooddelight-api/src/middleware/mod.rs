/// Middleware modules for the API server
///
/// - `auth`: Session token check for protected routes
/// - `security`: Security response headers

pub mod auth;
pub mod security;
