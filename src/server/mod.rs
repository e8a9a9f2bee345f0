// server/mod.rs - HTTP API over the timer, preferences and voice playback

mod handlers;
pub mod types;

use crate::timer::TimerController;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub timer: TimerController,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {0}")]
    Bind(String),

    #[error("Server error: {0}")]
    Serve(String),
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/rest-suggestions", post(handlers::rest_suggestions))
        .route("/api/timer", get(handlers::timer))
        .route("/api/timer/start", post(handlers::start))
        .route("/api/timer/pause", post(handlers::pause))
        .route("/api/timer/reset", post(handlers::reset))
        .route("/api/timer/add-time", post(handlers::add_time))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).put(handlers::update_preferences),
        )
        .route("/api/voices", get(handlers::list_voices))
        .route("/api/voice/test", post(handlers::test_voice))
        .route("/api/voice/suggestions", post(handlers::play_suggestions))
        .route("/api/voice/stop", post(handlers::stop_voice))
        .with_state(state)
}

/// Serve until Ctrl-C, then stop the timer.
pub async fn serve(bind_addr: &str, state: AppState) -> Result<(), ServerError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| ServerError::Bind(format!("{}: {}", bind_addr, e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("{}: {}", bind_addr, e)))?;

    tracing::info!("Focus Rest listening on http://{}", local_addr);

    let timer = state.timer.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))?;

    timer.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryStore, Preferences};
    use crate::suggestions::{is_fallback, LLMAdapter, OpenRouterAdapter, SuggestionEngine};
    use crate::voice::{NoopChime, NoopSynthesizer, VoicePlayer};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_with(llm: Option<Box<dyn LLMAdapter>>, prefs: Preferences) -> Router {
        let timer = TimerController::new(
            prefs,
            Arc::new(MemoryStore::new()),
            Arc::new(SuggestionEngine::new(llm)),
            Arc::new(VoicePlayer::new(Arc::new(NoopSynthesizer), Arc::new(NoopChime))),
        );
        router(AppState { timer })
    }

    fn app() -> Router {
        app_with(None, Preferences::default())
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = call(app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn rest_suggestions_without_key_is_500() {
        let body = json!({ "currentTask": "write report", "timerDuration": 1500 });
        let (status, body) = call(app(), "POST", "/api/rest-suggestions", Some(body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "OpenRouter API key not configured");
    }

    #[tokio::test]
    async fn rest_suggestions_rejects_bad_bodies() {
        let (status, body) = call(app(), "POST", "/api/rest-suggestions", Some(json!({ "currentTask": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = call(app(), "POST", "/api/rest-suggestions", None).await;
        assert!(status.is_client_error());

        let bad = json!({ "currentTask": "x", "timerDuration": -5 });
        let (status, _) = call(app(), "POST", "/api/rest-suggestions", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rest_suggestions_proxies_to_openrouter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content":
                    "1. Walk to the window\n2. Roll your shoulders\n3. Drink a glass of water" } }]
            })))
            .mount(&server)
            .await;
        let adapter = OpenRouterAdapter::new(
            "sk-test".to_string(),
            server.uri(),
            "test-model".to_string(),
            "http://localhost:3000".to_string(),
        );

        let app = app_with(Some(Box::new(adapter)), Preferences::default());
        let body = json!({ "currentTask": "write report", "timerDuration": 1500 });
        let (status, body) = call(app, "POST", "/api/rest-suggestions", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["suggestions"],
            json!(["Walk to the window", "Roll your shoulders", "Drink a glass of water"])
        );
    }

    #[tokio::test]
    async fn upstream_failure_still_returns_three() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let adapter = OpenRouterAdapter::new(
            "sk-test".to_string(),
            server.uri(),
            "test-model".to_string(),
            "http://localhost:3000".to_string(),
        );

        let app = app_with(Some(Box::new(adapter)), Preferences::default());
        let body = json!({ "timerDuration": 600 });
        let (status, body) = call(app, "POST", "/api/rest-suggestions", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        let items = body["suggestions"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|s| is_fallback(s.as_str().unwrap())));
    }

    #[tokio::test]
    async fn start_without_task_returns_warning() {
        let (status, body) = call(app(), "POST", "/api/timer/start", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["started"], false);
        assert!(body["warning"].as_str().unwrap().contains("task"));
        assert_eq!(body["timer"]["state"], "idle");
    }

    #[tokio::test]
    async fn start_and_reset_round_trip() {
        let prefs = Preferences {
            task: "write report".to_string(),
            ..Preferences::default()
        };
        let app = app_with(None, prefs);

        let (_, body) = call(app.clone(), "POST", "/api/timer/start", None).await;
        assert_eq!(body["started"], true);
        assert!(body.get("warning").is_none());
        assert_eq!(body["timer"]["state"], "running");

        let (_, body) = call(app.clone(), "PUT", "/api/preferences", Some(json!({ "durationMinutes": 5 }))).await;
        assert!(body["error"].is_string());

        let (_, body) = call(app.clone(), "POST", "/api/timer/reset", None).await;
        assert_eq!(body["state"], "idle");
        assert_eq!(body["clock"], "25:00");
        assert_eq!(body["progress"], 100.0);
    }

    #[tokio::test]
    async fn duration_change_while_running_is_409() {
        let prefs = Preferences {
            task: "write report".to_string(),
            ..Preferences::default()
        };
        let app = app_with(None, prefs);
        call(app.clone(), "POST", "/api/timer/start", None).await;

        let (status, _) = call(app, "PUT", "/api/preferences", Some(json!({ "durationMinutes": 5 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn preferences_update_and_add_time() {
        let app = app();

        let update = json!({ "task": "read papers", "durationMinutes": 90, "autoPlay": true });
        let (status, body) = call(app.clone(), "PUT", "/api/preferences", Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["durationSeconds"], 5400);
        assert_eq!(body["autoPlay"], true);

        let (_, body) = call(app.clone(), "POST", "/api/timer/add-time", Some(json!({ "minutes": 5 }))).await;
        assert_eq!(body["applied"], true);
        assert_eq!(body["timer"]["durationSeconds"], 5700);
        assert_eq!(body["timer"]["clock"], "01:35:00");

        let (_, body) = call(app, "GET", "/api/preferences", None).await;
        assert_eq!(body["task"], "read papers");
        assert_eq!(body["durationSeconds"], 5700);
    }

    #[tokio::test]
    async fn add_time_never_exceeds_longest_duration() {
        let app = app();

        let huge = json!({ "minutes": u64::MAX });
        let (status, body) = call(app.clone(), "POST", "/api/timer/add-time", Some(huge)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], true);
        assert_eq!(body["timer"]["durationSeconds"], 720 * 60);

        let (_, body) = call(app.clone(), "POST", "/api/timer/add-time", Some(json!({ "minutes": 5 }))).await;
        assert_eq!(body["applied"], false);

        let (_, body) = call(app, "GET", "/api/preferences", None).await;
        assert_eq!(body["durationSeconds"], 720 * 60);
    }

    #[tokio::test]
    async fn voice_routes_respond() {
        let app = app();

        let (status, body) = call(app.clone(), "GET", "/api/voices?refresh=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["voices"], json!([]));
        assert!(body["selected"].is_null());

        let (_, body) = call(app.clone(), "POST", "/api/voice/suggestions", None).await;
        assert_eq!(body["playing"], false);

        let (status, _) = call(app.clone(), "POST", "/api/voice/suggestions", Some(json!({ "layer": "yes" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(app.clone(), "POST", "/api/voice/test", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(app, "POST", "/api/voice/stop", None).await;
        assert_eq!(body["playing"], false);
    }
}
