#![allow(dead_code, unused_macros)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use uuid::Uuid;

use trackmybugs_api::auth::HashingParams;
use trackmybugs_api::clock::FixedClock;
use trackmybugs_api::config::AppConfig;
use trackmybugs_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "correct horse battery staple";

fn config_for(database_url: &str) -> Result<AppConfig> {
    let url = database_url.to_string();
    AppConfig::from_lookup(move |key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "DATABASE_URL" => Some(url.clone()),
        _ => None,
    })
    .context("test configuration")
}

/// State whose pool points at a closed port: every query fails fast
pub fn offline_state() -> Result<AppState> {
    let config = config_for("postgres://nobody@127.0.0.1:1/none")?;
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy(&config.database.url)?;
    let clock = Arc::new(FixedClock::new(Utc::now()));
    Ok(AppState::new(pool, config, clock, HashingParams::testing())?)
}

/// A server on its own port, backed by a private Postgres schema
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub pool: PgPool,
    pub clock: Arc<FixedClock>,
    database_url: String,
    schema: String,
}

impl TestApp {
    /// `None` when `TEST_DATABASE_URL` is not set
    pub async fn spawn() -> Result<Option<Self>> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set; skipping database test");
            return Ok(None);
        };

        let schema = format!("test_{}", Uuid::new_v4().simple());
        let admin = PgPoolOptions::new().max_connections(1).connect(&database_url).await?;
        admin.execute(format!("CREATE SCHEMA \"{}\"", schema).as_str()).await?;
        admin.close().await;

        let search_path = format!("SET search_path TO \"{}\"", schema);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .after_connect(move |conn, _meta| {
                let statement = search_path.clone();
                Box::pin(async move {
                    conn.execute(statement.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&database_url)
            .await?;
        pool.execute(include_str!("../../schema.sql")).await?;

        let clock = Arc::new(FixedClock::new(Utc::now()));
        let state = AppState::new(pool.clone(), config_for(&database_url)?, clock.clone(), HashingParams::testing())?;

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Some(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            pool,
            clock,
            database_url,
            schema,
        }))
    }

    pub async fn cleanup(self) -> Result<()> {
        self.pool.close().await;
        let admin = PgPoolOptions::new().max_connections(1).connect(&self.database_url).await?;
        admin.execute(format!("DROP SCHEMA \"{}\" CASCADE", self.schema).as_str()).await?;
        admin.close().await;
        Ok(())
    }

    /// Move the shared clock so consecutive rows get distinct timestamps
    pub fn tick(&self) {
        self.clock.advance(chrono::Duration::seconds(1));
    }

    pub async fn request(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, Some(token), None).await
    }

    pub async fn register(&self, email: &str, extra: Value) -> Result<(StatusCode, Value)> {
        let mut body = json!({
            "email": email,
            "password": PASSWORD,
            "first_name": "Test",
            "last_name": "User",
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            body.extend(extra.clone());
        }
        let result = self.request(Method::POST, "/api/v1/auth/register", None, Some(body)).await;
        self.tick();
        result
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register then log in; returns (user id, bearer token)
    pub async fn signup(&self, email: &str) -> Result<(String, String)> {
        let (status, body) = self.register(email, json!({})).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        let (status, body) = self.login(email, PASSWORD).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        let id = body["data"]["user"]["id"].as_str().context("user id")?.to_string();
        let token = body["data"]["token"].as_str().context("token")?.to_string();
        Ok((id, token))
    }

    pub async fn create_project(&self, token: &str, name: &str) -> Result<String> {
        let (status, body) = self.post("/api/v1/projects", token, json!({ "name": name })).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create project failed: {} {}", status, body);
        self.tick();
        Ok(body["data"]["id"].as_str().context("project id")?.to_string())
    }

    pub async fn create_issue(&self, token: &str, body: Value) -> Result<Value> {
        let (status, body) = self.post("/api/v1/issues", token, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create issue failed: {} {}", status, body);
        self.tick();
        Ok(body["data"].clone())
    }
}

/// Bail out of a database test when no database is configured
macro_rules! test_app {
    () => {
        match common::TestApp::spawn().await? {
            Some(app) => app,
            None => return Ok(()),
        }
    };
}
