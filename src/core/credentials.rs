use crate::core::error::ReconcileError;
use std::fmt;

pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Bearer token for the GitHub API. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

pub trait CredentialSource: Send + Sync {
    fn describe(&self) -> String;
    fn access_token(&self) -> Result<AccessToken, ReconcileError>;
}

pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

impl CredentialSource for EnvCredentials {
    fn describe(&self) -> String {
        format!("environment variable {}", self.var)
    }

    fn access_token(&self) -> Result<AccessToken, ReconcileError> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(AccessToken::new(value.trim())),
            _ => Err(ReconcileError::Configuration(format!(
                "GitHub access token is not set (expected in {})",
                self.var
            ))),
        }
    }
}

#[cfg(test)]
pub struct StaticCredentials {
    token: Option<AccessToken>,
}

#[cfg(test)]
impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(AccessToken::new(token)),
        }
    }

    pub fn missing() -> Self {
        Self { token: None }
    }
}

#[cfg(test)]
impl CredentialSource for StaticCredentials {
    fn describe(&self) -> String {
        "static token".to_string()
    }

    fn access_token(&self) -> Result<AccessToken, ReconcileError> {
        self.token.clone().ok_or_else(|| {
            ReconcileError::Configuration("GitHub access token is not set".to_string())
        })
    }
}
