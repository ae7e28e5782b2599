#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use linkshelf::clients::{ExtractedMetadata, MetadataExtractor};
use linkshelf::config::Config;
use linkshelf::db::Store;
use linkshelf::domain::LinkType;
use linkshelf::services::{MailMessage, Mailer};
use linkshelf::state::SharedState;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse";

/// Returns canned metadata instead of fetching anything.
pub struct StubExtractor;

#[async_trait::async_trait]
impl MetadataExtractor for StubExtractor {
    async fn extract(&self, url: &str) -> ExtractedMetadata {
        if url.contains("unreachable") {
            return ExtractedMetadata::fallback(url);
        }

        ExtractedMetadata {
            title: format!("Title of {url}"),
            description: "ignored".to_string(),
            image: "https://cdn.example.com/cover.png".to_string(),
            link_type: LinkType::Website,
            url: url.to_string(),
        }
    }
}

/// Keeps every message so tests can read reset links back.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Each call gets its own database file under the temp dir.
pub fn test_config() -> Config {
    let path = std::env::temp_dir().join(format!("linkshelf-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}?mode=rwc", path.display());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
    .expect("Failed to open store");

    let mailer = Arc::new(RecordingMailer::default());
    let shared = Arc::new(SharedState::from_parts(
        config,
        store,
        Arc::new(StubExtractor),
        mailer.clone(),
    ));

    let state = linkshelf::api::create_app_state(shared, None);
    TestApp {
        router: linkshelf::api::router(state),
        mailer,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    pub async fn register(&self, username: &str, email: &str) {
        let (status, body) = self
            .request(
                "POST",
                "/api/register",
                None,
                Some(json!({ "username": username, "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    /// Returns `(access, refresh)`.
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        (
            body["data"]["access"].as_str().unwrap().to_string(),
            body["data"]["refresh"].as_str().unwrap().to_string(),
        )
    }

    /// Registers a fresh user and returns their access token.
    pub async fn user(&self, username: &str) -> String {
        self.register(username, &format!("{username}@example.com"))
            .await;
        self.login(username, PASSWORD).await.0
    }

    /// Creates a link and returns its id.
    pub async fn link(&self, token: &str, url: &str) -> i64 {
        let (status, body) = self
            .request("POST", "/api/links", Some(token), Some(json!({ "url": url })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }
}
