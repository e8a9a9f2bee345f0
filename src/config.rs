use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const STORE_DIR: &str = "focus-rest";
const STORE_FILE: &str = "preferences.json";

pub const KEY_TASK: &str = "currentTask";
pub const KEY_DURATION: &str = "timerDuration";
pub const KEY_VOICE_ENABLED: &str = "voiceReminderEnabled";
pub const KEY_AUTO_PLAY: &str = "autoPlaySuggestions";
pub const KEY_SELECTED_VOICE: &str = "selectedVoice";

pub const DEFAULT_DURATION_SECS: u64 = 25 * 60;
pub const MIN_DURATION_MINUTES: u64 = 1;
pub const MAX_DURATION_MINUTES: u64 = 720;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read store: {0}")]
    Read(String),

    #[error("Failed to write store: {0}")]
    Write(String),
}

/// String-keyed scalar storage, the moral equivalent of browser `localStorage`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write several entries at once. Backends that flush per write override this.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Volatile store used in tests and when no data directory can be resolved.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat JSON object of string entries, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating it if missing. An unreadable file is
    /// moved aside to `*.json.bak` and replaced with an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| StoreError::Write(format!("Failed to create store dir: {}", e)))?;
        }

        if !path.exists() {
            let entries = BTreeMap::new();
            save_raw(&path, &entries)?;
            return Ok(Self {
                path,
                entries: Mutex::new(entries),
            });
        }

        let raw = fs::read_to_string(&path)
            .map_err(|e| StoreError::Read(format!("Failed to read {}: {}", path.display(), e)))?;
        let entries = match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Preference store {} is corrupt ({}), starting fresh",
                    path.display(),
                    e
                );
                let backup = path.with_extension("json.bak");
                let _ = fs::copy(&path, backup);
                let entries = BTreeMap::new();
                save_raw(&path, &entries)?;
                entries
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open `preferences.json` inside `dir`.
    pub fn open_in(dir: &Path) -> Result<Self, StoreError> {
        Self::open(dir.join(STORE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value.to_string())])
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut current = self
            .entries
            .lock()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        for (key, value) in entries {
            current.insert((*key).to_string(), value.clone());
        }
        save_raw(&self.path, &current)
    }
}

/// Platform data directory for the store (`~/.local/share/focus-rest` on Linux).
pub fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", STORE_DIR).map(|dirs| dirs.data_dir().to_path_buf())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub task: String,
    pub duration_seconds: u64,
    pub voice_enabled: bool,
    pub auto_play: bool,
    pub selected_voice: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            task: String::new(),
            duration_seconds: DEFAULT_DURATION_SECS,
            voice_enabled: true,
            auto_play: false,
            selected_voice: None,
        }
    }
}

/// Partial update from the settings panel. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesPayload {
    pub task: Option<String>,
    pub duration_minutes: Option<i64>,
    pub voice_enabled: Option<bool>,
    pub auto_play: Option<bool>,
    pub selected_voice: Option<String>,
}

/// Read preferences, substituting defaults for missing or malformed entries.
pub fn load(store: &dyn KeyValueStore) -> Preferences {
    let defaults = Preferences::default();

    let duration_seconds = match store.get(KEY_DURATION) {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                tracing::warn!("Ignoring stored duration '{}'", raw);
                defaults.duration_seconds
            }
        },
        None => defaults.duration_seconds,
    };

    Preferences {
        task: store.get(KEY_TASK).unwrap_or_default(),
        duration_seconds,
        voice_enabled: store
            .get(KEY_VOICE_ENABLED)
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.voice_enabled),
        auto_play: store
            .get(KEY_AUTO_PLAY)
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.auto_play),
        selected_voice: normalize_voice_name(store.get(KEY_SELECTED_VOICE)),
    }
}

/// Overwrite every preference entry.
pub fn save(store: &dyn KeyValueStore, prefs: &Preferences) -> Result<(), StoreError> {
    store.set_many(&[
        (KEY_TASK, prefs.task.clone()),
        (KEY_DURATION, prefs.duration_seconds.to_string()),
        (KEY_VOICE_ENABLED, prefs.voice_enabled.to_string()),
        (KEY_AUTO_PLAY, prefs.auto_play.to_string()),
        (
            KEY_SELECTED_VOICE,
            prefs.selected_voice.clone().unwrap_or_default(),
        ),
    ])
}

/// Clamp a user-entered duration to 1-720 minutes and return seconds.
pub fn clamp_duration_minutes(minutes: i64) -> u64 {
    let clamped = minutes.clamp(MIN_DURATION_MINUTES as i64, MAX_DURATION_MINUTES as i64);
    clamped as u64 * 60
}

pub fn normalize_voice_name(name: Option<String>) -> Option<String> {
    name.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn save_raw(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| StoreError::Write(format!("Failed to serialize preferences: {}", e)))?;
    fs::write(path, json).map_err(|e| StoreError::Write(format!("Failed to save preferences: {}", e)))
}
