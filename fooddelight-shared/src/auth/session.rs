/// Session tokens
///
/// A session token is a stateless HS256 JWT proving that the bearer logged in
/// as a given user. It carries the user id and an absolute expiry exactly one
/// hour after issuance. Validity is decided by signature and expiry alone, so
/// any server instance holding the same secret can validate it without a
/// store lookup. Tokens cannot be revoked before they expire.
///
/// # Claims
///
/// - `sub`: User ID
/// - `iss`: Always `"fooddelight"`
/// - `iat`: Issued at (Unix seconds)
/// - `exp`: Expiry (Unix seconds), `iat + 3600`
///
/// # Example
///
/// ```
/// use fooddelight_shared::auth::session::{SessionError, SessionKeys};
/// use secrecy::SecretString;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), SessionError> {
/// let keys = SessionKeys::new(&SecretString::from("secret-key-that-is-32-bytes-long!"));
/// let user_id = Uuid::new_v4();
///
/// let issued = keys.issue(user_id)?;
/// assert_eq!(keys.validate(&issued.token)?, user_id);
///
/// // The same token is rejected once its hour is up
/// let later = issued.expires_at;
/// assert!(matches!(keys.validate_at(&issued.token, later), Err(SessionError::Expired)));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifetime of a session token, in seconds
pub const SESSION_TTL_SECS: i64 = 3600;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "fooddelight";

/// Why a session token was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No token was presented
    #[error("No token provided")]
    MissingToken,

    /// Token could not be parsed, or its signature or issuer is wrong
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Current time is at or past the embedded expiry
    #[error("Token has expired")]
    Expired,

    /// Signing failed
    #[error("Failed to create token: {0}")]
    Signing(String),
}

/// JWT claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for `user_id` issued at `now`, expiring one hour later
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat,
            exp: iat + SESSION_TTL_SECS,
        }
    }

    /// Checks whether the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A freshly signed token and its absolute expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded JWT
    pub token: String,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Process-wide signing and verification keys
///
/// Built once at startup from the configured secret and shared read-only
/// between request handlers.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    /// Derives HS256 keys from the configured secret
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issues a token for `user_id`, valid for one hour from now
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Signing` if the token cannot be encoded
    pub fn issue(&self, user_id: Uuid) -> Result<IssuedToken, SessionError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token as if the current time were `now`
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<IssuedToken, SessionError> {
        let claims = Claims::new(user_id, now);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Validates a token and returns the user it was issued to
    ///
    /// # Errors
    ///
    /// - `SessionError::Malformed` if parsing, signature or issuer checks fail
    /// - `SessionError::Expired` if the token's hour is up
    pub fn validate(&self, token: &str) -> Result<Uuid, SessionError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates a token against an explicit current time
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, SessionError> {
        let claims = self.decode(token)?;

        if claims.is_expired_at(now) {
            return Err(SessionError::Expired);
        }

        Ok(claims.sub)
    }

    /// Checks signature and issuer; expiry is checked by the caller against
    /// its own clock, with no leeway.
    fn decode(&self, token: &str) -> Result<Claims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| SessionError::Malformed(e.to_string()))
    }
}

/// Extracts the token from an `Authorization` header value
///
/// # Errors
///
/// - `SessionError::MissingToken` if the header is absent or carries no token
/// - `SessionError::Malformed` if the scheme is not `Bearer`
pub fn bearer_token(header: Option<&str>) -> Result<&str, SessionError> {
    let value = header.map(str::trim).filter(|v| !v.is_empty()).ok_or(SessionError::MissingToken)?;

    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(SessionError::Malformed("Expected Bearer token".to_string()));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(SessionError::MissingToken);
    }

    Ok(token)
}
