pub mod reconciler;
pub mod scheduler;
pub mod server;

use crate::core::credentials::{CredentialSource, EnvCredentials};
use crate::core::models::Trigger;
use crate::core::settings::Settings;
use crate::providers::GithubClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub use reconciler::Reconciler;
pub use scheduler::{RecurringTask, RECHECK_INTERVAL};
pub use server::AppState;

pub fn build_reconciler(settings: &Settings) -> Result<Reconciler> {
    let credentials: Arc<dyn CredentialSource> =
        Arc::new(EnvCredentials::new(settings.github.token_env.clone()));
    let client = GithubClient::new(
        &settings.github.api_url,
        Duration::from_secs(settings.github.timeout_secs),
    )?;

    tracing::debug!(
        api_url = %settings.github.api_url,
        credentials = %credentials.describe(),
        "Reconciler configured"
    );

    Ok(Reconciler::new(
        Arc::new(client),
        credentials,
        settings.reconcile.overlap,
    ))
}

pub async fn run(settings: Settings) -> Result<()> {
    tracing::info!("Starting codespace-keeper daemon");

    let reconciler = Arc::new(build_reconciler(&settings)?);
    if let Err(e) = reconciler.credentials().access_token() {
        tracing::warn!(error = %e, "Passes will fail until the token is available");
    }

    let schedule = Arc::new(RecurringTask::new(
        Arc::clone(&reconciler),
        RECHECK_INTERVAL,
    ));

    if settings.schedule.reconcile_on_startup {
        let reconciler = Arc::clone(&reconciler);
        let schedule = Arc::clone(&schedule);
        tokio::spawn(async move {
            let _ = reconciler.reconcile_once(Trigger::Startup).await;
            schedule.arm().await;
        });
    }

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    let state = AppState::new(Arc::clone(&reconciler), Arc::clone(&schedule));
    let result = server::serve(listener, state, shutdown_signal()).await;

    schedule.shutdown().await;
    tracing::info!("codespace-keeper stopped");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Received shutdown signal, stopping gracefully");
}
