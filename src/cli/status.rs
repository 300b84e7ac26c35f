use crate::core::models::Codespace;
use crate::core::settings::Settings;
use crate::daemon::build_reconciler;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct StatusOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    codespace: Option<CodespaceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    fetched_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct CodespaceStatus {
    name: String,
    state: String,
    running: bool,
    next_action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_url: Option<String>,
}

pub async fn run(settings: &Settings, json: bool) -> Result<()> {
    let reconciler = build_reconciler(settings)?;

    let (codespace, error) = match reconciler.fetch_codespace().await {
        Ok(codespace) => (codespace.map(codespace_to_status), None),
        Err(e) => (None, Some(e.to_string())),
    };

    let output = StatusOutput {
        codespace,
        error,
        fetched_at: Utc::now(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if let Some(text) = format_text(&output) {
        print!("{text}");
    }

    // main prints the error once on the way out
    if let Some(error) = output.error {
        anyhow::bail!(error);
    }
    Ok(())
}

fn codespace_to_status(codespace: Codespace) -> CodespaceStatus {
    let running = codespace.is_running();
    CodespaceStatus {
        next_action: if running { "restart" } else { "start" },
        running,
        last_used: codespace.last_used_at.map(format_age),
        name: codespace.name,
        state: codespace.state,
        display_name: codespace.display_name,
        web_url: codespace.web_url,
    }
}

fn format_age(at: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(at);

    if duration.num_seconds() <= 0 {
        return "just now".to_string();
    }

    let total_minutes = duration.num_minutes();
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes % (24 * 60)) / 60;
    let minutes = total_minutes % 60;

    if days > 0 {
        format!("{}d {}h ago", days, hours)
    } else if hours > 0 {
        format!("{}h {:02}m ago", hours, minutes)
    } else {
        format!("{}m ago", minutes)
    }
}

fn format_text(output: &StatusOutput) -> Option<String> {
    if output.error.is_some() {
        return None;
    }

    let Some(codespace) = &output.codespace else {
        return Some("No codespace found\n".to_string());
    };

    let mut text = match &codespace.display_name {
        Some(display) => format!("{} ({})\n", codespace.name, display),
        None => format!("{}\n", codespace.name),
    };
    text.push_str(&format!("  {:<10} {}\n", "State:", codespace.state));
    text.push_str(&format!("  {:<10} {}\n", "Next pass:", codespace.next_action));
    if let Some(last_used) = &codespace.last_used {
        text.push_str(&format!("  {:<10} {}\n", "Last used:", last_used));
    }
    if let Some(url) = &codespace.web_url {
        text.push_str(&format!("  {:<10} {}\n", "URL:", url));
    }
    Some(text)
}
