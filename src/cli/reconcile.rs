use crate::core::models::Trigger;
use crate::core::settings::Settings;
use crate::daemon::build_reconciler;
use anyhow::{Context, Result};

pub async fn run(settings: &Settings) -> Result<()> {
    let reconciler = build_reconciler(settings)?;

    let outcome = reconciler
        .reconcile_once(Trigger::Cli)
        .await
        .context("Reconcile pass failed")?;

    println!("{}", capitalize(&outcome.to_string()));
    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
