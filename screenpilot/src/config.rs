//! Explicit agent configuration.
//!
//! Credentials, endpoints and pacing are passed in at construction. Business
//! logic never reads ambient process state; a caller that wants environment
//! lookups does them itself and hands the values over.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Vision model identifier, e.g. `gpt-4o`.
    pub model: String,
    /// OpenAI-compatible API base, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: String,
    /// Upper bound for one model round trip. Expiry surfaces as
    /// `ModelUnavailable`, never a hang.
    pub request_timeout: Duration,
    /// Pause after each dispatched input action, giving the target UI time to
    /// react before the next action or the next capture.
    pub settle_delay: Duration,
    /// Pause performed for a `WAIT` control symbol.
    pub wait_delay: Duration,
    pub temperature: f64,
    pub max_completion_tokens: u32,
    /// When set, captured and annotated frames are persisted here as
    /// timestamped PNGs for chronological review.
    pub output_dir: Option<PathBuf>,
}

impl AgentConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_secs(1),
            wait_delay: Duration::from_secs(1),
            temperature: 0.1,
            max_completion_tokens: 1000,
            output_dir: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_wait_delay(mut self, delay: Duration) -> Self {
        self.wait_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
