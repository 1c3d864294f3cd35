//! Common test utilities for integration tests
//!
//! - In-memory or on-disk database with migrations applied
//! - Configurable fake mailers
//! - Request helpers driving the router in-process

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fooddelight_api::app::{build_router, AppState};
use fooddelight_api::config::Config;
use fooddelight_shared::db::{migrations::run_migrations, pool::create_pool};
use fooddelight_shared::notify::{MailError, Mailer, OutgoingEmail};
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Records every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Always fails as if the provider were down
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Rejected {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// Never answers
pub struct HangingMailer;

#[async_trait]
impl Mailer for HangingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub state: AppState,
}

impl TestContext {
    /// Context whose emails land in the returned recorder
    pub async fn new() -> anyhow::Result<(Self, Arc<RecordingMailer>)> {
        let mailer = Arc::new(RecordingMailer::default());
        let ctx = Self::with_mailer(mailer.clone()).await?;
        Ok((ctx, mailer))
    }

    /// Context delivering email through `mailer`
    pub async fn with_mailer(mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let config = test_config(&[])?;
        let db = test_pool(&config).await?;
        let state = AppState::with_mailer(db.clone(), config, mailer);
        Ok(Self::from_state(db, state))
    }

    /// Context backed by a database file in `dir` with a multi-connection pool
    pub async fn on_disk(dir: &TempDir) -> anyhow::Result<(Self, Arc<RecordingMailer>)> {
        let url = format!("sqlite://{}", dir.path().join("fooddelight.db").display());
        let config = test_config(&[("DATABASE_URL", url.as_str())])?;
        let db = test_pool(&config).await?;
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::with_mailer(db.clone(), config, mailer.clone());
        Ok((Self::from_state(db, state), mailer))
    }

    /// Context without a mail provider
    pub async fn without_mail() -> anyhow::Result<Self> {
        let config = test_config(&[])?;
        let db = test_pool(&config).await?;
        let state = AppState::new(db.clone(), config)?;
        Ok(Self::from_state(db, state))
    }

    fn from_state(db: SqlitePool, state: AppState) -> Self {
        let app = build_router(state.clone());
        Self { db, app, state }
    }

    /// Sends a request and returns status and parsed JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!("Response body is not JSON: {}", String::from_utf8_lossy(&body))
            })
        };
        (status, json)
    }

    /// POSTs a JSON body, optionally with an `Authorization` header value
    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        authorization: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        self.post_raw(uri, body.to_string(), authorization).await
    }

    /// POSTs a raw body as `application/json`
    pub async fn post_raw(
        &self,
        uri: &str,
        body: String,
        authorization: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Registers an account and returns its user ID
    pub async fn register(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/register",
                serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["user_id"].as_str().unwrap().to_string()
    }

    /// Logs in and returns the session token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/login",
                serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Registers and logs in, returning the bearer header value
    pub async fn signed_in(&self, email: &str) -> String {
        self.register(email, "pw1").await;
        format!("Bearer {}", self.login(email, "pw1").await)
    }

    /// Number of stored orders
    pub async fn order_count(&self) -> i64 {
        fooddelight_shared::models::order::Order::count(&self.db)
            .await
            .unwrap()
    }
}

/// Test configuration on top of defaults
pub fn test_config(overrides: &[(&str, &str)]) -> anyhow::Result<Config> {
    let overrides: Vec<(String, String)> = overrides
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Config::from_lookup(move |key| {
        if let Some((_, value)) = overrides.iter().find(|(k, _)| k == key) {
            return Some(value.clone());
        }
        match key {
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "MAIL_TIMEOUT_SECONDS" => Some("1".to_string()),
            _ => None,
        }
    })
}

async fn test_pool(config: &Config) -> anyhow::Result<SqlitePool> {
    let db = create_pool(config.database.pool_config()).await?;
    run_migrations(&db).await?;
    Ok(db)
}

/// The single-item cart used across tests
pub fn pizza_order() -> serde_json::Value {
    serde_json::json!({
        "items": [{ "title": "Pizza", "price": 9.99, "quantity": 2 }],
        "total": 19.98
    })
}
