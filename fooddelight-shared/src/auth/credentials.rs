/// Credential store
///
/// Registers users and verifies their passwords. Emails are normalized
/// (trimmed, lower-cased) before they reach the store; the store's UNIQUE
/// constraint is the only arbiter of duplicates, so two concurrent
/// registrations of the same address resolve to one success and one
/// `DuplicateEmail`.
///
/// Hashing and verification run on tokio's blocking pool.

use super::password::{hash_password, verify_password, PasswordError};
use crate::models::user::{CreateUser, User};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Credential store failures
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Email or password missing or blank
    #[error("Email and password are required")]
    InvalidInput,

    /// Another account already uses this email
    #[error("Email is already registered")]
    DuplicateEmail,

    /// No account with this email
    #[error("User not found")]
    NotFound,

    /// Password does not match
    #[error("Invalid credentials")]
    BadCredentials,

    /// Hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The store failed
    #[error("Database error: {0}")]
    Store(sqlx::Error),
}

impl From<sqlx::Error> for CredentialError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                CredentialError::DuplicateEmail
            }
            other => CredentialError::Store(other),
        }
    }
}

/// Trims and lower-cases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates a new account and returns its ID
///
/// # Errors
///
/// - `CredentialError::InvalidInput` if email or password is blank
/// - `CredentialError::DuplicateEmail` if the email is taken
/// - `CredentialError::Password` / `CredentialError::Store` on internal failure
pub async fn register(pool: &SqlitePool, email: &str, password: &str) -> Result<Uuid, CredentialError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(CredentialError::InvalidInput);
    }

    let password_hash = hash_blocking(password.to_string()).await?;

    let user = User::create(
        pool,
        CreateUser {
            email,
            password_hash,
        },
    )
    .await?;

    info!(user_id = %user.id, "User registered");
    Ok(user.id)
}

/// Checks an email/password pair and returns the matching user
///
/// # Errors
///
/// - `CredentialError::InvalidInput` if email or password is blank
/// - `CredentialError::NotFound` if no account has this email
/// - `CredentialError::BadCredentials` if the password does not match
pub async fn verify(pool: &SqlitePool, email: &str, password: &str) -> Result<User, CredentialError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(CredentialError::InvalidInput);
    }

    let user = User::find_by_email(pool, &email)
        .await?
        .ok_or(CredentialError::NotFound)?;

    let matches = verify_blocking(password.to_string(), user.password_hash.clone()).await?;
    if !matches {
        debug!(user_id = %user.id, "Password mismatch");
        return Err(CredentialError::BadCredentials);
    }

    Ok(user)
}

async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))?
}
