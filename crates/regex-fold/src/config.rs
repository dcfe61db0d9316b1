//! Engine configuration.
//!
//! ```toml
//! placeholder = "..."
//! owner = "regex-fold"
//!
//! [retry]
//! slow_extensions = ["py"]
//!
//! [retry.default]
//! max_attempts = 5
//! base_delay_ms = 500
//! step_ms = 300
//!
//! [retry.slow]
//! max_attempts = 8
//! base_delay_ms = 1000
//! step_ms = 500
//! ```
//!
//! A partially written policy table takes its missing keys from the default policy.

use crate::error::ConfigError;
use crate::host::OwnerMarker;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Attempt budget and linear backoff for attach-time application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the immediate one.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Extra delay per failed attempt, in milliseconds.
    pub step_ms: u64,
}

impl RetryPolicy {
    /// Policy for ordinary files: 5 attempts, `500 + n * 300` ms.
    pub const DEFAULT: Self = Self {
        max_attempts: 5,
        base_delay_ms: 500,
        step_ms: 300,
    };

    /// Policy for files whose editors take longer to initialize: 8 attempts, `1000 + n * 500` ms.
    pub const SLOW_INIT: Self = Self {
        max_attempts: 8,
        base_delay_ms: 1000,
        step_ms: 500,
    };

    /// Delay before the attempt following failed attempt `attempt` (0-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        Duration::from_millis(
            self.base_delay_ms
                .saturating_add(self.step_ms.saturating_mul(u64::from(attempt))),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Coarse classification of the edited file, used to pick a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Anything not listed as slow.
    Default,
    /// Files whose editor scaffolding initializes slowly.
    SlowInit,
}

impl FileKind {
    /// Classify `file_name` by its extension (case-insensitive).
    pub fn classify(file_name: Option<&str>, slow_extensions: &[String]) -> Self {
        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str());

        match extension {
            Some(ext) if slow_extensions.iter().any(|s| s.eq_ignore_ascii_case(ext)) => {
                Self::SlowInit
            }
            _ => Self::Default,
        }
    }
}

/// Retry policies per file kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Policy for [`FileKind::Default`].
    pub default: RetryPolicy,
    /// Policy for [`FileKind::SlowInit`].
    pub slow: RetryPolicy,
    /// Extensions classified as [`FileKind::SlowInit`].
    pub slow_extensions: Vec<String>,
}

impl RetryConfig {
    /// The policy for a file kind.
    pub fn policy(&self, kind: FileKind) -> RetryPolicy {
        match kind {
            FileKind::Default => self.default,
            FileKind::SlowInit => self.slow,
        }
    }

    /// Classify `file_name` and return its policy.
    pub fn policy_for_file(&self, file_name: Option<&str>) -> RetryPolicy {
        self.policy(FileKind::classify(file_name, &self.slow_extensions))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            default: RetryPolicy::DEFAULT,
            slow: RetryPolicy::SLOW_INIT,
            slow_extensions: vec!["py".to_string()],
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FoldConfig {
    /// Text shown in place of a collapsed region.
    pub placeholder: String,
    /// Tag identifying regions created by this engine.
    pub owner: String,
    /// Attach-time retry policies.
    pub retry: RetryConfig,
}

impl FoldConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid TOML or holds unusable values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O, parse or validation failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The owner marker for created regions.
    pub fn owner_marker(&self) -> OwnerMarker {
        OwnerMarker::new(self.owner.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_empty() {
            return Err(ConfigError::Invalid("owner must not be empty".to_string()));
        }
        for (name, policy) in [("default", self.retry.default), ("slow", self.retry.slow)] {
            if policy.max_attempts == 0 {
                return Err(ConfigError::Invalid(format!(
                    "retry.{name}.max_attempts must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            placeholder: "...".to_string(),
            owner: OwnerMarker::default().0,
            retry: RetryConfig::default(),
        }
    }
}
