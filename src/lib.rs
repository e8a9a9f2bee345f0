pub mod config;
pub mod server;
pub mod settings;
pub mod suggestions;
pub mod timer;
pub mod voice;

use config::{JsonFileStore, KeyValueStore, MemoryStore};
use server::{AppState, ServerError};
use settings::Settings;
use std::sync::Arc;
use suggestions::SuggestionEngine;
use timer::TimerController;
use voice::VoicePlayer;

/// Open the preference store, falling back to memory when no data directory
/// is usable.
fn open_store(settings: &Settings) -> Arc<dyn KeyValueStore> {
    let Some(dir) = settings.data_dir.clone().or_else(config::default_data_dir) else {
        tracing::warn!("No data directory available, preferences will not persist");
        return Arc::new(MemoryStore::new());
    };

    match JsonFileStore::open_in(&dir) {
        Ok(store) => {
            tracing::info!("Preferences stored at {}", store.path().display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Failed to open preference store: {}, using memory", e);
            Arc::new(MemoryStore::new())
        }
    }
}

/// Call after `dotenvy::dotenv()` so `.env` values are visible.
pub async fn run() -> Result<(), ServerError> {
    let settings = Settings::from_env();

    let store = open_store(&settings);
    let prefs = config::load(store.as_ref());

    let suggestions = Arc::new(SuggestionEngine::from_settings(&settings));
    let voice = Arc::new(VoicePlayer::from_settings(&settings));
    let timer = TimerController::new(prefs, store, suggestions, voice);
    timer.ensure_voice_selected().await;

    server::serve(&settings.bind_addr, AppState { timer }).await
}
