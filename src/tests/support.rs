//! Shared fixtures for the API tests: a temporary configuration directory,
//! an app built on top of it and a request helper.

use std::{fs, path::Path, sync::Arc};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{config::AppConfig, process::ProcessProbe, routes, state::AppState};

pub const CSRF_TOKEN: &str = "agentdeck-api-request";

/// Reports a fixed set of PIDs as running.
pub struct FixedProbe(pub Vec<u32>);

#[async_trait]
impl ProcessProbe for FixedProbe {
    async fn is_running(&self, pid: u32) -> bool {
        self.0.contains(&pid)
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    /// Kept alive for the lifetime of the test.
    pub dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), vec![])
    }

    pub fn with_config(config: AppConfig, running_pids: Vec<u32>) -> Self {
        let dir = TempDir::new().unwrap();
        let state = AppState::with_root(config, dir.path(), Arc::new(FixedProbe(running_pids))).unwrap();
        let app = routes::app(state.clone(), None);
        Self { app, state, dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `content` to `rel` under the configuration directory, creating parents.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    /// Sends a request with the CSRF header and an optional JSON body; returns
    /// the status and the parsed JSON body (`Null` for non-JSON bodies).
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri).header("X-CSRF-Token", CSRF_TOKEN);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

pub fn skill_md(name: &str, description: &str) -> String {
    format!("---\nname: {}\ndescription: {}\n---\n\n# {}\n", name, description, name)
}
