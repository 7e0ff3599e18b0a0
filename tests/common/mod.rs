#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use entity_gateway::config::AppConfig;
use entity_gateway::entity::{AttributeSpec, AttributeType, EntityRegistry, EntitySpec, Multiplicity};
use entity_gateway::session::MemorySessionStore;
use entity_gateway::store::MemoryStore;
use entity_gateway::{app, AppState};

pub const ACCESS_TOKEN: &str = "test_access_token";
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// A gateway running inside the test's runtime with its own empty store.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    session: Option<String>,
}

fn registry() -> Result<EntityRegistry> {
    let optional = |kind| AttributeSpec::new(kind).multiplicity(Multiplicity::Optional);

    EntityRegistry::builder()
        .entity(
            EntitySpec::new("City")
                .attribute("name", AttributeSpec::new(AttributeType::String))
                .attribute("streets", optional(AttributeType::Number)),
        )
        .entity(
            EntitySpec::new("District")
                .specializes("City")
                .attribute("type", optional(AttributeType::Number))
                .attribute(
                    "houses",
                    AttributeSpec::new(AttributeType::Association("House".into()))
                        .multiplicity(Multiplicity::Many),
                ),
        )
        .entity(
            EntitySpec::new("House")
                .attribute("valor", optional(AttributeType::Number))
                .attribute("garden", optional(AttributeType::Boolean))
                .attribute("built", optional(AttributeType::Date)),
        )
        .build()
        .context("test registry")
}

pub async fn spawn_server() -> Result<TestServer> {
    let mut config = AppConfig::development();
    config.security.access_token = ACCESS_TOKEN.to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_request_logging = false;

    let registry = Arc::new(registry()?);
    let state = AppState::new(
        config,
        Arc::clone(&registry),
        Arc::new(MemoryStore::new(registry)),
        Arc::new(MemorySessionStore::new()),
    );

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test port")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        session: None,
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Same server, requests sent with `token` as the session.
    pub fn as_session(&self, token: &str) -> TestServer {
        TestServer {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            session: Some(token.to_string()),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(ACCESS_TOKEN_HEADER, ACCESS_TOKEN);
        match &self.session {
            Some(token) => builder.header(SESSION_TOKEN_HEADER, token),
            None => builder,
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.get(self.url(path)))
    }

    pub fn post(&self, path: &str, body: &Value) -> RequestBuilder {
        self.authorized(self.client.post(self.url(path))).json(body)
    }

    pub fn put(&self, path: &str, body: &Value) -> RequestBuilder {
        self.authorized(self.client.put(self.url(path))).json(body)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.delete(self.url(path)))
    }

    /// POST /entities/:entity and return the created document.
    pub async fn create(&self, entity: &str, body: Value) -> Result<Value> {
        let res = self.post(&format!("/entities/{}/", entity), &body).send().await?;
        let status = res.status();
        let created = res.json::<Value>().await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create {} failed with {}: {}", entity, status, created);
        Ok(created)
    }

    /// Create a user and log in as them; returns (user id, session token).
    pub async fn login_new_user(&self, username: &str, password: &str) -> Result<(String, String)> {
        let user = self
            .create("User", json!({"username": username, "password": password}))
            .await?;
        let id = user["id"].as_str().context("user id")?.to_string();

        let res = self
            .post("/login", &json!({"username": username, "password": password}))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed with {}", res.status());
        let body = res.json::<Value>().await?;
        let token = body["sessionToken"].as_str().context("sessionToken")?.to_string();
        Ok((id, token))
    }
}

/// Assert an error envelope and its status.
pub async fn assert_error(res: reqwest::Response, status: StatusCode, code: u64) -> Result<()> {
    assert_eq!(res.status(), status, "unexpected status");
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], json!(code), "unexpected error body: {}", body);
    assert!(body["error"].is_string(), "error message missing: {}", body);
    Ok(())
}
