use crate::core::models::Operation;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{0}")]
    Configuration(String),

    #[error("GitHub API returned status code {} while {operation}", .status.as_u16())]
    Status {
        operation: Operation,
        status: StatusCode,
    },

    #[error("request failed while {operation}: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response body while {operation}: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("a reconcile pass is already in progress")]
    InProgress,
}

impl ReconcileError {
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ReconcileError::Status { .. }
                | ReconcileError::Transport { .. }
                | ReconcileError::Decode { .. }
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ReconcileError::Configuration(_))
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            ReconcileError::Status { operation, .. }
            | ReconcileError::Transport { operation, .. }
            | ReconcileError::Decode { operation, .. } => Some(*operation),
            ReconcileError::Configuration(_) | ReconcileError::InProgress => None,
        }
    }
}
