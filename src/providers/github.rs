use crate::core::credentials::AccessToken;
use crate::core::error::ReconcileError;
use crate::core::models::{Codespace, CodespaceList, Operation};
use crate::providers::CodespaceApi;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("codespace-keeper/", env!("CARGO_PKG_VERSION"));

pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GithubClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build GitHub HTTP client")?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn codespaces_url(&self) -> String {
        format!("{}/user/codespaces", self.api_url)
    }

    fn transition_url(&self, name: &str, action: &str) -> String {
        format!("{}/user/codespaces/{}/{}", self.api_url, name, action)
    }

    fn authorized(&self, request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        request
            .header(reqwest::header::AUTHORIZATION, token.bearer_header())
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    async fn transition(
        &self,
        token: &AccessToken,
        name: &str,
        operation: Operation,
        action: &str,
    ) -> Result<(), ReconcileError> {
        let response = self
            .authorized(self.http.post(self.transition_url(name, action)), token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|source| ReconcileError::Transport { operation, source })?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(codespace = name, %status, body = %body, "Transition rejected");
            return Err(ReconcileError::Status { operation, status });
        }

        tracing::debug!(codespace = name, ?operation, "Transition accepted");
        Ok(())
    }
}

#[async_trait]
impl CodespaceApi for GithubClient {
    async fn first_codespace(
        &self,
        token: &AccessToken,
    ) -> Result<Option<Codespace>, ReconcileError> {
        let operation = Operation::List;

        let response = self
            .authorized(self.http.get(self.codespaces_url()), token)
            .send()
            .await
            .map_err(|source| ReconcileError::Transport { operation, source })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, body = %body, "Codespace listing rejected");
            return Err(ReconcileError::Status { operation, status });
        }

        let list: CodespaceList = response
            .json()
            .await
            .map_err(|source| ReconcileError::Decode { operation, source })?;

        Ok(list.into_first())
    }

    async fn stop_codespace(&self, token: &AccessToken, name: &str) -> Result<(), ReconcileError> {
        self.transition(token, name, Operation::Stop, "stop").await
    }

    async fn start_codespace(
        &self,
        token: &AccessToken,
        name: &str,
    ) -> Result<(), ReconcileError> {
        self.transition(token, name, Operation::Start, "start").await
    }
}
