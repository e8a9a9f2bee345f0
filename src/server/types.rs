// server/types.rs - Request and response bodies for the HTTP API

use crate::timer::TimerSnapshot;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestSuggestionsRequest {
    #[serde(default)]
    pub current_task: Option<String>,
    /// Seconds
    pub timer_duration: f64,
}

#[derive(Debug, Serialize)]
pub struct RestSuggestionsResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
    pub timer: TimerSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct AddTimeRequest {
    pub minutes: u64,
}

#[derive(Debug, Serialize)]
pub struct AddTimeResponse {
    pub applied: bool,
    pub timer: TimerSnapshot,
}

#[derive(Debug, Default, Deserialize)]
pub struct VoicesQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceEntry {
    pub id: String,
    pub lang: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceEntry>,
    pub selected: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaySuggestionsRequest {
    #[serde(default)]
    pub layer: bool,
}

#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    pub playing: bool,
}

/// Error reply rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
