// settings.rs - Process configuration read from the environment

use std::path::PathBuf;

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324";
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Which host text-to-speech backend to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsBackend {
    None,
    Espeak,
    Say,
}

impl TtsBackend {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "espeak" | "espeak-ng" => TtsBackend::Espeak,
            "say" => TtsBackend::Say,
            "" | "none" | "off" => TtsBackend::None,
            other => {
                tracing::warn!("Unknown FOCUS_REST_TTS '{}', speech disabled", other);
                TtsBackend::None
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_model: String,
    pub public_url: String,
    pub bind_addr: String,
    pub data_dir: Option<PathBuf>,
    pub tts: TtsBackend,
    pub sound_path: Option<PathBuf>,
}

impl Settings {
    /// Read settings from process environment (call after `dotenvy::dotenv()`).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            openrouter_api_key: non_empty("OPENROUTER_API_KEY"),
            openrouter_base_url: non_empty("OPENROUTER_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            openrouter_model: non_empty("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            public_url: non_empty("FOCUS_REST_PUBLIC_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
            bind_addr: non_empty("FOCUS_REST_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            data_dir: non_empty("FOCUS_REST_DATA_DIR").map(PathBuf::from),
            tts: non_empty("FOCUS_REST_TTS")
                .map(|v| TtsBackend::parse(&v))
                .unwrap_or(TtsBackend::None),
            sound_path: non_empty("FOCUS_REST_SOUND").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let s = settings(&[]);
        assert_eq!(s.openrouter_api_key, None);
        assert_eq!(s.openrouter_base_url, DEFAULT_OPENROUTER_BASE_URL);
        assert_eq!(s.openrouter_model, DEFAULT_MODEL);
        assert_eq!(s.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(s.tts, TtsBackend::None);
        assert!(s.sound_path.is_none());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let s = settings(&[("OPENROUTER_API_KEY", "   ")]);
        assert_eq!(s.openrouter_api_key, None);
    }

    #[test]
    fn overrides_are_applied() {
        let s = settings(&[
            ("OPENROUTER_API_KEY", "sk-or-123"),
            ("OPENROUTER_BASE_URL", "http://localhost:9000/v1/"),
            ("FOCUS_REST_TTS", "espeak-ng"),
            ("FOCUS_REST_DATA_DIR", "/tmp/focus"),
        ]);
        assert_eq!(s.openrouter_api_key.as_deref(), Some("sk-or-123"));
        assert_eq!(s.openrouter_base_url, "http://localhost:9000/v1");
        assert_eq!(s.tts, TtsBackend::Espeak);
        assert_eq!(s.data_dir, Some(PathBuf::from("/tmp/focus")));
    }
}
