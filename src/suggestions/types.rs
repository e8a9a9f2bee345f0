// suggestions/types.rs - Core types for the suggestion fetcher

use super::fallback;
use rand::Rng;
use serde::Serialize;

/// Every suggestion set holds exactly this many entries.
pub const SUGGESTION_COUNT: usize = 3;

/// Where the entries of a set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// All entries parsed from the model reply.
    Model,
    /// Model reply was short and was topped up from the pool.
    Padded,
    /// Model unavailable or unusable, entries drawn from the pool.
    Fallback,
}

/// Exactly three trimmed, non-empty break activities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionSet {
    items: Vec<String>,
    source: SuggestionSource,
}

impl SuggestionSet {
    /// Returns `None` unless `items` satisfies the set's post-condition.
    pub(crate) fn new(items: Vec<String>, source: SuggestionSource) -> Option<Self> {
        let valid = items.len() == SUGGESTION_COUNT && items.iter().all(|s| !s.trim().is_empty());
        valid.then_some(Self { items, source })
    }

    /// Three distinct entries drawn from the static pool.
    pub(crate) fn from_pool<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            items: fallback::pick(rng, SUGGESTION_COUNT),
            source: SuggestionSource::Fallback,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn source(&self) -> SuggestionSource {
        self.source
    }

    pub fn into_items(self) -> Vec<String> {
        self.items
    }
}

/// Errors the suggestion endpoint reports. Everything else degrades to fallback.
#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("OpenRouter API key not configured")]
    MissingCredential,
}

/// LLM adapter errors
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid response from LLM")]
    InvalidResponse,

    #[error("Timeout")]
    Timeout,
}
