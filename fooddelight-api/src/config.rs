/// Configuration management for the API server
///
/// Configuration comes from environment variables (after loading `.env` if
/// present) and is parsed into a typed struct once at startup.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://food-delight.db)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `JWT_SECRET`: Session signing secret, at least 32 characters (required)
/// - `SENDGRID_API_KEY`: Mail provider key (optional, emails are skipped without it)
/// - `MAIL_FROM`: Sender address (default: orders@fooddelight.local)
/// - `MAIL_API_URL`: Provider endpoint (default: SendGrid v3 mail/send)
/// - `MAIL_TIMEOUT_SECONDS`: Upper bound for one send (default: 10)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use fooddelight_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use fooddelight_shared::db::pool::DatabaseConfig as PoolConfig;
use secrecy::SecretString;
use std::{env, time::Duration};

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Outgoing email configuration
    pub mail: MailConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins, `*` for any
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret for signing session tokens
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: SecretString,
}

/// Outgoing email configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SendGrid API key; `None` disables confirmation emails
    pub api_key: Option<SecretString>,

    /// Sender address
    pub from: String,

    /// Provider endpoint
    pub api_url: String,

    /// Upper bound for a single send
    pub timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Pool settings for this database
    ///
    /// In-memory URLs get a single pinned connection.
    pub fn pool_config(&self) -> PoolConfig {
        if self.url.contains(":memory:") {
            return PoolConfig::in_memory();
        }

        PoolConfig {
            url: self.url.clone(),
            max_connections: self.max_connections.max(1),
            ..PoolConfig::default()
        }
    }
}

impl MailConfig {
    /// Send timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric or boolean variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`]
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let api_host = var("API_HOST", "0.0.0.0");
        let api_port = var("API_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT must be a port number: {}", e))?;

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = parse_bool(&var("PRODUCTION", "false"))
            .ok_or_else(|| anyhow::anyhow!("PRODUCTION must be true or false"))?;

        let database_url = var("DATABASE_URL", "sqlite://food-delight.db");
        let max_connections = var("DATABASE_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS must be a number: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
        }

        let api_key = lookup("SENDGRID_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);

        let timeout_seconds = var("MAIL_TIMEOUT_SECONDS", "10")
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("MAIL_TIMEOUT_SECONDS must be a number: {}", e))?;

        if timeout_seconds == 0 {
            anyhow::bail!("MAIL_TIMEOUT_SECONDS must be greater than zero");
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: SecretString::from(jwt_secret),
            },
            mail: MailConfig {
                api_key,
                from: var("MAIL_FROM", "orders@fooddelight.local"),
                api_url: var("MAIL_API_URL", "https://api.sendgrid.com/v3/mail/send"),
                timeout_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.api.cors_origins, vec!["*".to_string()]);
        assert!(!config.api.production);
        assert_eq!(config.database.url, "sqlite://food-delight.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.secret.expose_secret(), SECRET);
        assert!(config.mail.api_key.is_none());
        assert_eq!(config.mail.from, "orders@fooddelight.local");
        assert_eq!(config.mail.api_url, "https://api.sendgrid.com/v3/mail/send");
        assert_eq!(config.mail.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("PRODUCTION", "true"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("SENDGRID_API_KEY", "SG.key"),
            ("MAIL_TIMEOUT_SECONDS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(config.api.production);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(
            config.mail.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("SG.key".to_string())
        );
        assert_eq!(config.mail.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_pool_config() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_MAX_CONNECTIONS", "8"),
        ]))
        .unwrap();
        let pool = config.database.pool_config();
        assert_eq!(pool.url, "sqlite://food-delight.db");
        assert_eq!(pool.max_connections, 8);

        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "8"),
        ]))
        .unwrap();
        assert_eq!(config.database.pool_config().max_connections, 1);
    }

    #[test]
    fn test_jwt_secret_required() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", "too-short")])).is_err());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("API_PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("MAIL_TIMEOUT_SECONDS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("PRODUCTION", "maybe")])).is_err());
    }

    #[test]
    fn test_blank_mail_key_disables_mail() {
        let config =
            Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("SENDGRID_API_KEY", "  ")])).unwrap();
        assert!(config.mail.api_key.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config =
            Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("SENDGRID_API_KEY", "SG.key")])).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains(SECRET));
        assert!(!debug.contains("SG.key"));
    }
}
