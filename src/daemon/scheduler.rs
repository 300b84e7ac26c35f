use crate::core::models::Trigger;
use crate::daemon::reconciler::Reconciler;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

pub const RECHECK_INTERVAL: Duration = Duration::from_secs(230 * 60);

/// Recurring reconcile timer. Each wait starts when the previous pass completes.
pub struct RecurringTask {
    reconciler: Arc<Reconciler>,
    interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RecurringTask {
    pub fn new(reconciler: Arc<Reconciler>, interval: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            reconciler,
            interval,
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn is_armed(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Starts the timer. Returns `false` if it was already armed or has been shut down.
    pub async fn arm(&self) -> bool {
        let mut handle = self.handle.lock().await;
        if handle.is_some() || *self.shutdown_tx.borrow() {
            return false;
        }

        let shutdown_rx = self.shutdown_tx.subscribe();
        *handle = Some(tokio::spawn(run_schedule(
            Arc::clone(&self.reconciler),
            self.interval,
            shutdown_rx,
        )));
        true
    }

    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Recurring reconcile task ended abnormally");
            }
        }
    }
}

async fn run_schedule(
    reconciler: Arc<Reconciler>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    tracing::info!(
        interval_minutes = interval.as_secs() / 60,
        "Recurring reconcile armed"
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown_rx.changed() => {
                tracing::info!("Recurring reconcile stopped");
                return;
            }
        }

        let previous_passes = reconciler.history().passes().await;
        tracing::info!(previous_passes, "Relaunching codespace check");
        let _ = reconciler.reconcile_once(Trigger::Schedule).await;
    }
}
