use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::client::http::DEFAULT_BASE_URL;
use crate::runtime::policy::{MIN_PROMPT_CHARS, PollPolicy};

pub mod loader;

pub const DEFAULT_TRIGGER: &str = "veo3";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Everything the bot reads from its YAML file. Every field has a default,
/// so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub service: ServiceSettings,
    pub bot: BotSettings,
    pub polling: PollPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,
    /// Per HTTP request, not per task
    pub request_timeout_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ServiceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Case-insensitive prefix that marks a generation request
    pub trigger: String,
    pub min_prompt_chars: usize,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            min_prompt_chars: MIN_PROMPT_CHARS,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.service.base_url.trim().is_empty() {
            bail!("service.base_url must not be empty");
        }
        if self.bot.trigger.trim().is_empty() {
            bail!("bot.trigger must not be empty");
        }
        if self.polling.max_attempts == 0 {
            bail!("polling.max_attempts must be at least 1");
        }
        Ok(())
    }
}
