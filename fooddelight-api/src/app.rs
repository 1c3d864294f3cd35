/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use fooddelight_api::{app::AppState, config::Config};
/// use fooddelight_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.pool_config()).await?;
/// let state = AppState::new(pool, config)?;
/// let app = fooddelight_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::require_session, security::security_headers},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use fooddelight_shared::{
    auth::session::SessionKeys,
    notify::{ConfirmationDispatcher, MailError, Mailer, SendGridMailer},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Session token keys, derived once from `JWT_SECRET`
    pub sessions: Arc<SessionKeys>,

    /// Order confirmation sender
    pub notifier: ConfirmationDispatcher,
}

impl AppState {
    /// Creates application state, with SendGrid delivery when an API key is configured
    ///
    /// # Errors
    ///
    /// Returns an error if the mail client cannot be built (e.g. invalid `MAIL_FROM`)
    pub fn new(db: SqlitePool, config: Config) -> Result<Self, MailError> {
        let notifier = match &config.mail.api_key {
            Some(api_key) => {
                let mailer = SendGridMailer::new(
                    config.mail.api_url.clone(),
                    api_key.clone(),
                    config.mail.from.clone(),
                    config.mail.timeout(),
                )?;
                ConfirmationDispatcher::new(Arc::new(mailer), config.mail.timeout())
            }
            None => ConfirmationDispatcher::disabled(),
        };

        Ok(Self::with_notifier(db, config, notifier))
    }

    /// Creates application state that delivers email through `mailer`
    pub fn with_mailer(db: SqlitePool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let notifier = ConfirmationDispatcher::new(mailer, config.mail.timeout());
        Self::with_notifier(db, config, notifier)
    }

    fn with_notifier(db: SqlitePool, config: Config, notifier: ConfirmationDispatcher) -> Self {
        Self {
            db,
            sessions: Arc::new(SessionKeys::new(&config.jwt.secret)),
            config: Arc::new(config),
            notifier,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health              # Health check (public)
/// └── /api/
///     ├── POST /register        # Create account (public)
///     ├── POST /login           # Issue session token (public)
///     └── POST /place-order     # Record order (Bearer token)
/// ```
///
/// Applied outermost first: security headers, CORS, request tracing, then
/// session authentication on protected routes.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Order routes (require a session token)
    let order_routes = Router::new()
        .route("/place-order", post(routes::orders::place_order))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let api_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(order_routes);

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(production, security_headers))
        .with_state(state)
}
