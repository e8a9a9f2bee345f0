// suggestions/mod.rs - Break-suggestion fetcher

mod fallback;
mod llm;
mod parser;
mod types;

pub use fallback::{is_fallback, FALLBACK_POOL};
pub use llm::openrouter::OpenRouterAdapter;
pub use llm::LLMAdapter;
pub use types::{LLMError, SuggestionError, SuggestionSet, SuggestionSource, SUGGESTION_COUNT};

use crate::settings::Settings;
use rand::Rng;

/// Stand-in for an empty task description in the prompt.
pub const TASK_PLACEHOLDER: &str = "focused work";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that suggests short 5-10 minute break \
activities. Keep each suggestion concise, practical and relaxing. Always answer with exactly \
three suggestions in this format:\n1. [first suggestion]\n2. [second suggestion]\n3. [third suggestion]";

/// Suggestion engine - asks the model for three break activities and never
/// returns fewer.
pub struct SuggestionEngine {
    llm: Option<Box<dyn LLMAdapter>>,
}

impl SuggestionEngine {
    pub fn new(llm: Option<Box<dyn LLMAdapter>>) -> Self {
        Self { llm }
    }

    /// Create from settings. Without an API key only fallback content is served.
    pub fn from_settings(settings: &Settings) -> Self {
        let llm = OpenRouterAdapter::from_settings(settings)
            .map(|adapter| Box::new(adapter) as Box<dyn LLMAdapter>);

        match &llm {
            Some(adapter) => tracing::info!(
                "Suggestions: {} adapter loaded (model={})",
                adapter.name(),
                settings.openrouter_model
            ),
            None => tracing::warn!("Suggestions: OPENROUTER_API_KEY not set, using fallback pool only"),
        }

        Self::new(llm)
    }

    /// One model round-trip. Only a missing credential is reported; upstream
    /// and parse failures degrade to pool content.
    pub async fn generate(
        &self,
        task: &str,
        duration_secs: u64,
    ) -> Result<SuggestionSet, SuggestionError> {
        let llm = self.llm.as_ref().ok_or(SuggestionError::MissingCredential)?;

        let seed: u32 = rand::thread_rng().gen();
        let prompt = build_user_prompt(task, duration_secs, seed);

        let reply = match llm.generate(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("LLM '{}' failed, using fallback suggestions: {:?}", llm.name(), e);
                return Ok(SuggestionSet::from_pool(&mut rand::thread_rng()));
            }
        };

        let parsed = parser::parse(&reply);
        if parsed.len() < SUGGESTION_COUNT {
            tracing::warn!(
                "LLM '{}' reply yielded {} usable suggestions ({} chars), padding",
                llm.name(),
                parsed.len(),
                reply.len()
            );
        }

        let set = parser::finalize(parsed, &mut rand::thread_rng());
        tracing::info!("Suggestions ready: source={:?}", set.source());
        Ok(set)
    }

    /// Like [`generate`](Self::generate) but infallible: a missing credential
    /// also yields pool content.
    pub async fn suggest_or_fallback(&self, task: &str, duration_secs: u64) -> SuggestionSet {
        match self.generate(task, duration_secs).await {
            Ok(set) => set,
            Err(e) => {
                tracing::info!("Serving fallback suggestions: {}", e);
                SuggestionSet::from_pool(&mut rand::thread_rng())
            }
        }
    }
}

fn build_user_prompt(task: &str, duration_secs: u64, seed: u32) -> String {
    let task = match task.trim() {
        "" => TASK_PLACEHOLDER,
        trimmed => trimmed,
    };

    format!(
        "I just finished working on \"{}\" and stayed focused for {} minutes. \
        Suggest 3 quick break activities I can do in 5-10 minutes to relax and recharge. \
        Keep each suggestion to one or two sentences. (variation seed: {})",
        task,
        duration_secs / 60,
        seed
    )
}
