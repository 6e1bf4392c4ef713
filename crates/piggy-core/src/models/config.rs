//! Configuration structures for the extraction pipeline and ledger.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PiggyError, Result};

/// Main configuration for piggybank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PiggyConfig {
    /// Generation service connection.
    pub llm: LlmConfig,

    /// Sampling parameters sent with every prompt.
    pub generation: GenerationConfig,

    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,

    /// Ledger storage and progression.
    pub ledger: LedgerConfig,
}

/// Generation service endpoint and transport policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Scheme, host and port of the service.
    pub base_url: String,

    /// Path of the prompt endpoint.
    pub endpoint: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Extra attempts after a transport error or 5xx reply.
    pub max_retries: u32,

    /// Pause before a retry, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            endpoint: "/prompt".to_string(),
            timeout_secs: 60,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

impl LlmConfig {
    /// Full URL of the prompt endpoint.
    pub fn prompt_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

/// Sampling parameters for the text generation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Return only the continuation, not the prompt.
    pub return_full_text: bool,

    /// Upper bound on generated tokens.
    pub max_new_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Penalty applied to repeated tokens.
    pub repetition_penalty: f32,

    /// Top-k sampling cutoff.
    pub top_k: u32,

    /// Nucleus sampling cutoff.
    pub top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            return_full_text: false,
            max_new_tokens: 400,
            temperature: 0.3,
            repetition_penalty: 1.3,
            top_k: 50,
            top_p: 0.95,
        }
    }
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum similarity (0.0 - 1.0) for accepting a fuzzy category match.
    pub similarity_threshold: f64,

    /// Read ambiguous slash dates as DD/MM/YYYY instead of MM/DD/YYYY.
    pub day_first: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
            day_first: false,
        }
    }
}

/// Ledger storage and progression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON snapshot of all accounts.
    pub store_path: PathBuf,

    /// Highest reachable level.
    pub max_level: u32,

    /// Coins granted on registration.
    pub starting_coins: u64,

    /// Coins granted for each recorded expense.
    pub coins_per_receipt: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("ledger.json"),
            max_level: 10,
            starting_coins: 3,
            coins_per_receipt: 1,
        }
    }
}

const ENV_LLM_URL: &str = "PIGGY_LLM_URL";
const ENV_LLM_HOST: &str = "LLM_HOST";
const ENV_LLM_PORT: &str = "LLM_PORT";
const ENV_LEDGER_PATH: &str = "PIGGY_LEDGER_PATH";

impl PiggyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PiggyError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    ///
    /// `PIGGY_LLM_URL` wins over `LLM_HOST`/`LLM_PORT`; a host without a port
    /// keeps the configured port.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_LLM_URL).filter(|v| !v.is_empty()) {
            self.llm.base_url = url;
        } else if let Some(host) = lookup(ENV_LLM_HOST).filter(|v| !v.is_empty()) {
            let port = lookup(ENV_LLM_PORT)
                .filter(|v| !v.is_empty())
                .or_else(|| {
                    self.llm
                        .base_url
                        .rsplit_once(':')
                        .map(|(_, p)| p.to_string())
                        .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
                })
                .unwrap_or_else(|| "8000".to_string());
            self.llm.base_url = format!("http://{}:{}", host, port);
        }

        if let Some(path) = lookup(ENV_LEDGER_PATH).filter(|v| !v.is_empty()) {
            self.ledger.store_path = PathBuf::from(path);
        }
    }
}
