/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`session`]: Signed, stateless session tokens (HS256 JWT, 1 hour)
/// - [`credentials`]: User registration and credential verification
///
/// # Example
///
/// ```
/// use fooddelight_shared::auth::password::{hash_password, verify_password};
/// use fooddelight_shared::auth::session::SessionKeys;
/// use secrecy::SecretString;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("hunter2")?;
/// assert!(verify_password("hunter2", &hash)?);
///
/// let keys = SessionKeys::new(&SecretString::from("a-very-long-secret-used-only-in-docs!!"));
/// let user_id = Uuid::new_v4();
/// let token = keys.issue(user_id)?;
/// assert_eq!(keys.validate(&token.token)?, user_id);
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod password;
pub mod session;
