//! AI text transformation: original text → refined or summarized text.
//!
//! The core only depends on [`TextTransformer`]; [`LlmTransformer`] is the
//! pluggable adapter over any `edgequake-llm` provider. All prompt text lives
//! in [`crate::prompts`].
//!
//! ## Retry Strategy
//!
//! The reader never retries on its own. The adapter can be configured to
//! retry transient failures with exponential backoff
//! (`retry_backoff_ms * 2^attempt`); the default is a single attempt.

use crate::config::ReaderConfig;
use crate::error::ServiceError;
use crate::pipeline::normalize;
use crate::prompts::{user_message, TransformKind};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// Given text, return transformed text or fail.
///
/// Implementations must never return silently corrupted text: an unusable
/// answer is an error, not an empty string.
#[async_trait]
pub trait TextTransformer: Send + Sync {
    async fn transform(&self, text: &str, kind: TransformKind) -> Result<String, ServiceError>;
}

/// [`TextTransformer`] backed by an LLM chat completion.
pub struct LlmTransformer {
    provider: Arc<dyn LLMProvider>,
    system_prompt: Option<String>,
    temperature: f32,
    max_tokens: usize,
    max_retries: u32,
    retry_backoff_ms: u64,
    api_timeout_secs: u64,
}

impl LlmTransformer {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ReaderConfig) -> Self {
        Self {
            provider,
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            api_timeout_secs: config.api_timeout_secs,
        }
    }

    /// Resolve the provider from config and environment, then build.
    pub fn from_config(config: &ReaderConfig) -> Result<Self, ServiceError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }

    fn build_messages(&self, text: &str, kind: TransformKind) -> Vec<ChatMessage> {
        let system = self
            .system_prompt
            .as_deref()
            .unwrap_or_else(|| kind.default_prompt());
        vec![
            ChatMessage::system(system),
            ChatMessage::user(user_message(text)),
        ]
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }

    async fn call_once(&self, messages: &[ChatMessage]) -> Result<String, ServiceError> {
        let options = self.build_options();
        let call = self.provider.chat(messages, Some(&options));
        match timeout(Duration::from_secs(self.api_timeout_secs), call).await {
            Err(_) => Err(ServiceError::Timeout {
                secs: self.api_timeout_secs,
            }),
            Ok(Err(e)) => Err(ServiceError::LlmApiError {
                message: e.to_string(),
            }),
            Ok(Ok(response)) => {
                debug!(
                    "{} input tokens, {} output tokens",
                    response.prompt_tokens, response.completion_tokens
                );
                Ok(response.content)
            }
        }
    }
}

#[async_trait]
impl TextTransformer for LlmTransformer {
    async fn transform(&self, text: &str, kind: TransformKind) -> Result<String, ServiceError> {
        let start = Instant::now();
        let messages = self.build_messages(text, kind);
        info!("LLM {}: {} chars in", kind, text.len());

        let mut last_err = ServiceError::EmptyResponse;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "LLM {}: retry {}/{} after {}ms",
                    kind, attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.call_once(&messages).await {
                Ok(content) => {
                    let cleaned = normalize::clean_transformed(&content);
                    if cleaned.is_empty() {
                        warn!("LLM {}: attempt {} returned nothing", kind, attempt + 1);
                        last_err = ServiceError::EmptyResponse;
                        continue;
                    }
                    info!(
                        "LLM {}: {} chars out in {:?}",
                        kind,
                        cleaned.len(),
                        start.elapsed()
                    );
                    return Ok(cleaned);
                }
                Err(e) => {
                    warn!("LLM {}: attempt {} failed: {}", kind, attempt + 1, e);
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
fn resolve_provider(config: &ReaderConfig) -> Result<Arc<dyn LLMProvider>, ServiceError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    // Honour EDGEQUAKE_LLM_PROVIDER + EDGEQUAKE_MODEL when both set
    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _) =
        ProviderFactory::from_env().map_err(|e| ServiceError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!("No LLM provider auto-detected: {e}"),
        })?;

    Ok(llm_provider)
}

const DEFAULT_MODEL: &str = "gpt-4.1-nano";

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, ServiceError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ServiceError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
