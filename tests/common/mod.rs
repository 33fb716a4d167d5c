#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

use todo_api::{app, AppConfig, AppState};

/// A server on its own port with its own in-memory database
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(AppConfig::test())
            .await
            .context("failed to build app state")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app(state)).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn signup(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/auth/signup"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Sign up and log in, returning the access token
    pub async fn register(&self, username: &str, password: &str) -> Result<String> {
        let res = self.signup(username, password).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed: {}", res.status());

        let res = self.login(username, password).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["accessToken"]
            .as_str()
            .map(str::to_string)
            .context("login response has no accessToken")
    }

    pub async fn create_todo(&self, token: &str, title: &str, description: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/todo"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "description": description }))
            .send()
            .await?)
    }

    pub async fn list_todos(&self, token: &str) -> Result<Vec<Value>> {
        let res = self
            .client
            .get(self.url("/todo"))
            .bearer_auth(token)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "list failed: {}", res.status());
        Ok(res.json().await?)
    }
}
