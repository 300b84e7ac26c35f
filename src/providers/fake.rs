use crate::core::credentials::AccessToken;
use crate::core::error::ReconcileError;
use crate::core::models::{Codespace, Operation};
use crate::providers::CodespaceApi;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory provider that records every call in order.
#[derive(Default)]
pub struct FakeApi {
    codespace: Option<Codespace>,
    failures: HashMap<Operation, StatusCode>,
    list_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codespace(mut self, name: &str, state: &str) -> Self {
        self.codespace = Some(Codespace::new(name, state));
        self
    }

    pub fn failing(mut self, operation: Operation, status: StatusCode) -> Self {
        self.failures.insert(operation, status);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: Operation, call: String) -> Result<(), ReconcileError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.get(&operation) {
            Some(status) => Err(ReconcileError::Status {
                operation,
                status: *status,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CodespaceApi for FakeApi {
    async fn first_codespace(
        &self,
        _token: &AccessToken,
    ) -> Result<Option<Codespace>, ReconcileError> {
        self.record(Operation::List, "list".to_string())?;
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.codespace.clone())
    }

    async fn stop_codespace(&self, _token: &AccessToken, name: &str) -> Result<(), ReconcileError> {
        self.record(Operation::Stop, format!("stop {name}"))
    }

    async fn start_codespace(
        &self,
        _token: &AccessToken,
        name: &str,
    ) -> Result<(), ReconcileError> {
        self.record(Operation::Start, format!("start {name}"))
    }
}
