use crate::core::models::{ReconcileOutcome, Trigger};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PassResult {
    Succeeded { outcome: ReconcileOutcome },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PassRecord {
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: PassResult,
}

#[derive(Default)]
struct HistoryInner {
    last: Option<PassRecord>,
    last_success: Option<DateTime<Utc>>,
    passes: u64,
    failures: u64,
}

#[derive(Clone, Default)]
pub struct PassHistory {
    inner: Arc<RwLock<HistoryInner>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistorySummary {
    pub passes: u64,
    pub failures: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_pass: Option<PassRecord>,
}

impl PassHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, record: PassRecord) {
        let mut inner = self.inner.write().await;
        inner.passes = inner.passes.saturating_add(1);
        match record.result {
            PassResult::Succeeded { .. } => inner.last_success = Some(record.finished_at),
            PassResult::Failed { .. } => inner.failures = inner.failures.saturating_add(1),
        }
        inner.last = Some(record);
    }

    pub async fn passes(&self) -> u64 {
        self.inner.read().await.passes
    }

    pub async fn summary(&self) -> HistorySummary {
        let inner = self.inner.read().await;
        HistorySummary {
            passes: inner.passes,
            failures: inner.failures,
            last_success: inner.last_success,
            last_pass: inner.last.clone(),
        }
    }
}
