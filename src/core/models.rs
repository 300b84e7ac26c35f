use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const RUNNING_STATE: &str = "Running";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codespace {
    pub name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

impl Codespace {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            id: None,
            display_name: None,
            last_used_at: None,
            web_url: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RUNNING_STATE
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodespaceList {
    #[serde(default)]
    pub codespaces: Option<Vec<Codespace>>,
}

impl CodespaceList {
    pub fn into_first(self) -> Option<Codespace> {
        self.codespaces.unwrap_or_default().into_iter().next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Stop,
    Start,
}

impl Operation {
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::List => "listing codespaces",
            Operation::Stop => "stopping codespace",
            Operation::Start => "starting codespace",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    NoCodespace,
    Started { name: String },
    Restarted { name: String },
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::NoCodespace => f.write_str("no codespace found"),
            ReconcileOutcome::Started { name } => write!(f, "started codespace {name}"),
            ReconcileOutcome::Restarted { name } => {
                write!(f, "restarted codespace {name} (stopped, then started)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Request,
    Schedule,
    Startup,
    Cli,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Request => "request",
            Trigger::Schedule => "schedule",
            Trigger::Startup => "startup",
            Trigger::Cli => "cli",
        })
    }
}
