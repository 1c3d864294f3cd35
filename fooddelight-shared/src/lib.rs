//! # Food Delight Shared Library
//!
//! Domain logic for the Food Delight ordering backend, used by the API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens and the credential store
//! - `db`: SQLite connection pool and migrations
//! - `models`: Database models (users, orders)
//! - `checkout`: Order validation and transactional placement
//! - `notify`: Order confirmation emails

pub mod auth;
pub mod checkout;
pub mod db;
pub mod models;
pub mod notify;

/// Current version of the Food Delight shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
