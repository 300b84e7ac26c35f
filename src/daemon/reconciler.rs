use crate::core::credentials::CredentialSource;
use crate::core::error::ReconcileError;
use crate::core::models::{Codespace, ReconcileOutcome, Trigger};
use crate::core::settings::OverlapPolicy;
use crate::core::store::{PassHistory, PassRecord, PassResult};
use crate::providers::CodespaceApi;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Brings the first codespace on the account to a running state.
pub struct Reconciler {
    api: Arc<dyn CodespaceApi>,
    credentials: Arc<dyn CredentialSource>,
    overlap: OverlapPolicy,
    in_flight: Mutex<()>,
    history: PassHistory,
}

impl Reconciler {
    pub fn new(
        api: Arc<dyn CodespaceApi>,
        credentials: Arc<dyn CredentialSource>,
        overlap: OverlapPolicy,
    ) -> Self {
        Self {
            api,
            credentials,
            overlap,
            in_flight: Mutex::new(()),
            history: PassHistory::new(),
        }
    }

    pub fn history(&self) -> &PassHistory {
        &self.history
    }

    pub fn credentials(&self) -> &dyn CredentialSource {
        self.credentials.as_ref()
    }

    pub async fn fetch_codespace(&self) -> Result<Option<Codespace>, ReconcileError> {
        let token = self.credentials.access_token()?;
        self.api.first_codespace(&token).await
    }

    pub async fn reconcile_once(
        &self,
        trigger: Trigger,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let _slot = match self.overlap {
            OverlapPolicy::Serialize => self.in_flight.lock().await,
            OverlapPolicy::Reject => match self.in_flight.try_lock() {
                Ok(slot) => slot,
                Err(_) => {
                    tracing::warn!(%trigger, "Reconcile pass already running, rejecting");
                    return Err(ReconcileError::InProgress);
                }
            },
        };

        let started_at = Utc::now();
        let result = self.run_pass().await;
        let finished_at = Utc::now();

        let record_result = match &result {
            Ok(outcome) => {
                tracing::info!(%trigger, outcome = %outcome, "Reconcile pass finished");
                PassResult::Succeeded {
                    outcome: outcome.clone(),
                }
            }
            Err(e) => {
                if e.is_configuration() {
                    tracing::error!(%trigger, error = %e, "Reconcile pass skipped");
                } else {
                    tracing::error!(
                        %trigger,
                        error = %e,
                        operation = ?e.operation(),
                        upstream = e.is_upstream(),
                        "Reconcile pass failed"
                    );
                }
                PassResult::Failed {
                    error: e.to_string(),
                }
            }
        };

        self.history
            .record(PassRecord {
                trigger,
                started_at,
                finished_at,
                result: record_result,
            })
            .await;

        result
    }

    async fn run_pass(&self) -> Result<ReconcileOutcome, ReconcileError> {
        let token = self.credentials.access_token()?;

        let Some(codespace) = self.api.first_codespace(&token).await? else {
            tracing::info!("No codespace found");
            return Ok(ReconcileOutcome::NoCodespace);
        };

        tracing::info!(codespace = %codespace.name, state = %codespace.state, "Found codespace");

        let was_running = codespace.is_running();
        let name = codespace.name;
        if was_running {
            tracing::info!(codespace = %name, "Stopping codespace");
            self.api.stop_codespace(&token, &name).await?;
            tracing::info!(codespace = %name, "Codespace stopped");
        }

        tracing::info!(codespace = %name, "Starting codespace");
        self.api.start_codespace(&token, &name).await?;
        tracing::info!(codespace = %name, "Codespace started");

        Ok(if was_running {
            ReconcileOutcome::Restarted { name }
        } else {
            ReconcileOutcome::Started { name }
        })
    }
}
