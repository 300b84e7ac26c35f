use crate::core::models::Trigger;
use crate::core::store::HistorySummary;
use crate::daemon::reconciler::Reconciler;
use crate::daemon::scheduler::RecurringTask;
use anyhow::{Context, Result};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const SUCCESS_BODY: &str = "The project is working fine";

#[derive(Clone)]
pub struct AppState {
    reconciler: Arc<Reconciler>,
    schedule: Arc<RecurringTask>,
    start_time: Instant,
}

impl AppState {
    pub fn new(reconciler: Arc<Reconciler>, schedule: Arc<RecurringTask>) -> Self {
        Self {
            reconciler,
            schedule,
            start_time: Instant::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub schedule_armed: bool,
    pub interval_minutes: u64,
    #[serde(flatten)]
    pub history: HistorySummary,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(reconcile_now).post(reconcile_now))
        .route(
            "/api/launchCodespace",
            get(reconcile_now).post(reconcile_now),
        )
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!(%addr, "Reconcile trigger listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Runs one pass now, then makes sure the recurring timer is armed.
async fn reconcile_now(State(state): State<AppState>) -> (StatusCode, String) {
    let result = state.reconciler.reconcile_once(Trigger::Request).await;

    if state.schedule.arm().await {
        info!("Recurring reconcile scheduled after first request");
    }

    match result {
        Ok(_) => (StatusCode::OK, SUCCESS_BODY.to_string()),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}")),
    }
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        schedule_armed: state.schedule.is_armed().await,
        interval_minutes: state.schedule.interval().as_secs() / 60,
        history: state.reconciler.history().summary().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::StaticCredentials;
    use crate::core::models::Operation;
    use crate::core::settings::OverlapPolicy;
    use crate::providers::fake::FakeApi;
    use crate::providers::CodespaceApi;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    const INTERVAL: Duration = Duration::from_secs(600);

    struct Harness {
        api: Arc<FakeApi>,
        reconciler: Arc<Reconciler>,
        schedule: Arc<RecurringTask>,
        router: Router,
    }

    fn harness(api: FakeApi) -> Harness {
        let api = Arc::new(api);
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&api) as Arc<dyn CodespaceApi>,
            Arc::new(StaticCredentials::new("ghp_test")),
            OverlapPolicy::Serialize,
        ));
        let schedule = Arc::new(RecurringTask::new(Arc::clone(&reconciler), INTERVAL));
        let router = router(AppState::new(Arc::clone(&reconciler), Arc::clone(&schedule)));
        Harness {
            api,
            reconciler,
            schedule,
            router,
        }
    }

    async fn call(router: &Router, method: Method, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_running_codespace_is_restarted() {
        let h = harness(FakeApi::new().with_codespace("cs-1", "Running"));

        let (status, body) = call(&h.router, Method::GET, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, SUCCESS_BODY);
        assert_eq!(h.api.calls(), vec!["list", "stop cs-1", "start cs-1"]);
    }

    #[tokio::test]
    async fn test_empty_listing_responds_ok() {
        let h = harness(FakeApi::new());

        let (status, body) = call(&h.router, Method::POST, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, SUCCESS_BODY);
        assert_eq!(h.api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_shutdown_codespace_is_only_started() {
        let h = harness(FakeApi::new().with_codespace("cs-2", "Shutdown"));

        let (status, body) = call(&h.router, Method::POST, "/api/launchCodespace").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, SUCCESS_BODY);
        assert_eq!(h.api.calls(), vec!["list", "start cs-2"]);
    }

    #[tokio::test]
    async fn test_forbidden_listing_responds_500() {
        let h = harness(
            FakeApi::new()
                .with_codespace("cs-1", "Running")
                .failing(Operation::List, reqwest::StatusCode::FORBIDDEN),
        );

        let (status, body) = call(&h.router, Method::GET, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.starts_with("Error: "));
        assert!(body.contains("403"), "body: {body}");
        assert_eq!(h.api.calls(), vec!["list"]);
        assert!(h.schedule.is_armed().await);
    }

    #[tokio::test]
    async fn test_missing_token_responds_500() {
        let api = Arc::new(FakeApi::new().with_codespace("cs-1", "Running"));
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&api) as Arc<dyn CodespaceApi>,
            Arc::new(StaticCredentials::missing()),
            OverlapPolicy::Serialize,
        ));
        let schedule = Arc::new(RecurringTask::new(Arc::clone(&reconciler), INTERVAL));
        let router = router(AppState::new(reconciler, Arc::clone(&schedule)));

        let (status, body) = call(&router, Method::GET, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error: GitHub access token is not set");
        assert!(api.calls().is_empty());
        assert!(schedule.is_armed().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_arms_timer_for_one_more_pass() {
        let h = harness(FakeApi::new().with_codespace("cs-2", "Shutdown"));
        assert!(!h.schedule.is_armed().await);

        let (status, _) = call(&h.router, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(h.schedule.is_armed().await);
        assert_eq!(h.reconciler.history().passes().await, 1);

        settle().await;
        tokio::time::advance(INTERVAL).await;
        settle().await;

        assert_eq!(h.reconciler.history().passes().await, 2);
        assert_eq!(
            h.api.calls(),
            vec!["list", "start cs-2", "list", "start cs-2"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_request_still_arms_timer() {
        let h = harness(FakeApi::new().failing(Operation::List, reqwest::StatusCode::FORBIDDEN));

        let (status, _) = call(&h.router, Method::GET, "/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(h.schedule.is_armed().await);

        settle().await;
        tokio::time::advance(INTERVAL).await;
        settle().await;

        let summary = h.reconciler.history().summary().await;
        assert_eq!(summary.passes, 2);
        assert_eq!(summary.failures, 2);
        assert_eq!(summary.last_pass.map(|r| r.trigger), Some(Trigger::Schedule));
        assert_eq!(h.api.calls(), vec!["list", "list"]);
    }

    #[tokio::test]
    async fn test_repeated_requests_arm_a_single_timer() {
        let h = harness(FakeApi::new());

        call(&h.router, Method::GET, "/").await;
        call(&h.router, Method::GET, "/").await;

        assert!(h.schedule.is_armed().await);
        assert!(!h.schedule.arm().await);
    }

    #[tokio::test]
    async fn test_health_reports_schedule_and_last_pass() {
        let h = harness(FakeApi::new().with_codespace("cs-2", "Shutdown"));

        let (_, body) = call(&h.router, Method::GET, "/health").await;
        let health: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["schedule_armed"], false);
        assert_eq!(health["interval_minutes"], 10);
        assert_eq!(health["passes"], 0);

        call(&h.router, Method::GET, "/").await;

        let (status, body) = call(&h.router, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["schedule_armed"], true);
        assert_eq!(health["passes"], 1);
        assert_eq!(health["last_pass"]["trigger"], "request");
        assert_eq!(health["last_pass"]["outcome"]["name"], "cs-2");
    }
}
