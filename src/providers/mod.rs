#[cfg(test)]
pub mod fake;
mod github;

use crate::core::credentials::AccessToken;
use crate::core::error::ReconcileError;
use crate::core::models::Codespace;
use async_trait::async_trait;

pub use github::GithubClient;

#[async_trait]
pub trait CodespaceApi: Send + Sync {
    async fn first_codespace(&self, token: &AccessToken)
        -> Result<Option<Codespace>, ReconcileError>;

    async fn stop_codespace(&self, token: &AccessToken, name: &str) -> Result<(), ReconcileError>;

    async fn start_codespace(&self, token: &AccessToken, name: &str)
        -> Result<(), ReconcileError>;
}
