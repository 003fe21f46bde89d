//! Configuration for the reader and its text collaborators.
//!
//! All tunables live in [`ReaderConfig`], built via [`ReaderConfigBuilder`].
//! The pacing constants (base delay, punctuation multipliers) are fixed and
//! deliberately absent here; only the speed preset is configurable.

use crate::error::FocusReadError;
use crate::speed::Speed;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a reading session and the collaborators feeding it.
///
/// # Example
/// ```rust
/// use focusread::{ReaderConfig, Speed};
///
/// let config = ReaderConfig::builder()
///     .speed(Speed::Wpm500)
///     .model("gpt-4.1-nano")
///     .build()
///     .unwrap();
/// assert_eq!(config.speed, Speed::Wpm500);
/// ```
#[derive(Clone)]
pub struct ReaderConfig {
    /// Initial reading speed. Default: 300 WPM.
    pub speed: Speed,

    /// How long a collaborator status message stays visible. Default: 3000 ms.
    pub status_ttl_ms: u64,

    /// LLM model identifier, e.g. "gpt-4.1-nano". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "gemini", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for refine/summarize. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate. Default: 4096.
    pub max_tokens: usize,

    /// Retries on a failed LLM call, inside the collaborator. Default: 0.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-LLM-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom system prompt replacing the built-in refine/summarize prompt.
    pub system_prompt: Option<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit path to a pdfium shared library (file or containing directory).
    pub pdfium_library_path: Option<PathBuf>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            speed: Speed::default(),
            status_ttl_ms: 3000,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 4096,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            system_prompt: None,
            password: None,
            pdfium_library_path: None,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for ReaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderConfig")
            .field("speed", &self.speed)
            .field("status_ttl_ms", &self.status_ttl_ms)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl ReaderConfig {
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReaderConfig`].
#[derive(Debug)]
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    pub fn speed(mut self, speed: Speed) -> Self {
        self.config.speed = speed;
        self
    }

    pub fn status_ttl_ms(mut self, ms: u64) -> Self {
        self.config.status_ttl_ms = ms;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReaderConfig, FocusReadError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(FocusReadError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(FocusReadError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(FocusReadError::InvalidConfig(
                "download_timeout_secs must be ≥ 1".into(),
            ));
        }
        if let Some(ref prompt) = c.system_prompt {
            if prompt.trim().is_empty() {
                return Err(FocusReadError::InvalidConfig(
                    "system_prompt must not be blank".into(),
                ));
            }
        }
        Ok(self.config)
    }
}
