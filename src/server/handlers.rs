// server/handlers.rs - Route handlers

use super::types::*;
use super::AppState;
use crate::config::{Preferences, UpdatePreferencesPayload};
use crate::suggestions::SuggestionError;
use crate::timer::{TimerError, TimerSnapshot};
use crate::voice::{voices, PlayMode};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn rest_suggestions(
    State(state): State<AppState>,
    payload: Result<Json<RestSuggestionsRequest>, JsonRejection>,
) -> Result<Json<RestSuggestionsResponse>, ApiError> {
    let Json(request) = payload?;

    if !request.timer_duration.is_finite() || request.timer_duration < 0.0 {
        return Err(ApiError::bad_request(
            "timerDuration must be a non-negative number of seconds",
        ));
    }
    let task = request.current_task.unwrap_or_default();
    let duration_secs = request.timer_duration.floor() as u64;

    match state.timer.suggestions().generate(&task, duration_secs).await {
        Ok(set) => Ok(Json(RestSuggestionsResponse {
            suggestions: set.into_items(),
        })),
        Err(e @ SuggestionError::MissingCredential) => {
            tracing::error!("Rest suggestions unavailable: {}", e);
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub async fn timer(State(state): State<AppState>) -> Json<TimerSnapshot> {
    Json(state.timer.snapshot().await)
}

pub async fn start(State(state): State<AppState>) -> Json<StartResponse> {
    let (outcome, timer) = state.timer.start().await;
    let warning = match outcome {
        crate::timer::StartOutcome::Rejected(reason) => Some(reason.warning()),
        _ => None,
    };

    Json(StartResponse {
        started: outcome.is_running(),
        warning,
        timer,
    })
}

pub async fn pause(State(state): State<AppState>) -> Json<TimerSnapshot> {
    Json(state.timer.pause().await)
}

pub async fn reset(State(state): State<AppState>) -> Json<TimerSnapshot> {
    Json(state.timer.reset().await)
}

pub async fn add_time(
    State(state): State<AppState>,
    payload: Result<Json<AddTimeRequest>, JsonRejection>,
) -> Result<Json<AddTimeResponse>, ApiError> {
    let Json(request) = payload?;
    let (applied, timer) = state.timer.add_time(request.minutes).await;
    Ok(Json(AddTimeResponse { applied, timer }))
}

pub async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.timer.preferences().await)
}

pub async fn update_preferences(
    State(state): State<AppState>,
    payload: Result<Json<UpdatePreferencesPayload>, JsonRejection>,
) -> Result<Json<Preferences>, ApiError> {
    let Json(update) = payload?;

    state
        .timer
        .update_preferences(update)
        .await
        .map(Json)
        .map_err(|e| match e {
            TimerError::DurationLocked => ApiError::new(StatusCode::CONFLICT, e.to_string()),
        })
}

pub async fn list_voices(
    State(state): State<AppState>,
    Query(query): Query<VoicesQuery>,
) -> Json<VoicesResponse> {
    let (available, selected) = state.timer.voices(query.refresh).await;

    let voices = available
        .iter()
        .map(|voice| VoiceEntry {
            id: voice.id.clone(),
            lang: voice.lang.clone(),
            display_name: voices::display_name(voice),
        })
        .collect();

    Json(VoicesResponse { voices, selected })
}

pub async fn test_voice(State(state): State<AppState>) -> Json<PlaybackResponse> {
    state.timer.test_voice().await;
    Json(PlaybackResponse { playing: true })
}

/// Body is optional: `{}` or no body plays with restart semantics.
pub async fn play_suggestions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let request: PlaySuggestionsRequest = if body.iter().all(u8::is_ascii_whitespace) {
        PlaySuggestionsRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?
    };

    let mode = if request.layer {
        PlayMode::Layer
    } else {
        PlayMode::Restart
    };
    let playing = state.timer.play_suggestions(mode).await;
    Ok(Json(PlaybackResponse { playing }))
}

pub async fn stop_voice(State(state): State<AppState>) -> Json<PlaybackResponse> {
    state.timer.stop_voice();
    Json(PlaybackResponse { playing: false })
}
