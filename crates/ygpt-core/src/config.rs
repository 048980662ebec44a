use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::matcher::MatchMode;

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV: &str = "YGPT_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("At least one fallback answer is required")]
    NoFallbackAnswers,

    #[error("Stream delay range is inverted: min {min_ms}ms > max {max_ms}ms")]
    InvalidDelay { min_ms: u64, max_ms: u64 },
}

/// Inclusive range of milliseconds to pause between revealed characters
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// No pause at all. Handy for tests and non-interactive output.
    pub const fn instant() -> Self {
        Self::new(0, 0)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_ms >= self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(10, 25)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub subtitle: String,
    pub badge: String,
    /// Hex colour (`#rrggbb`) or a terminal colour name
    pub accent: String,
    /// First assistant message; empty means the transcript starts blank
    pub greeting: String,

    pub trigger_mode: MatchMode,
    pub trigger: String,
    pub special_answer: String,
    pub fallback_answers: Vec<String>,
    pub stream_delay: DelayRange,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Ygpt".to_string(),
            subtitle: "totally real and extremely helpful ai 🤖".to_string(),
            badge: "Ygpt-1.0".to_string(),
            accent: "#10b981".to_string(),
            greeting: "Hi! Ask me anything… or better yet, ask me that *one* question I love."
                .to_string(),

            trigger_mode: MatchMode::Contains,
            trigger: "Do engineers have common traits?".to_string(),
            special_answer: "Engineers do have common traits, they all get unfairly accused of \
                             being the same. But Yasser stands out. Engineers might share a \
                             toolkit, but how they use it is what makes each unique."
                .to_string(),
            fallback_answers: vec![
                "Sorry, I can only answer one very specific question.".to_string(),
                "Hmm… my training prevents me from answering that. Try the *special* one."
                    .to_string(),
                "As an AI, I'm laser-focused today. Ask the **right** question ;)".to_string(),
            ],
            stream_delay: DelayRange::default(),
        }
    }
}

impl Config {
    /// Load the config from `$YGPT_CONFIG` or the user config directory.
    ///
    /// A missing file yields the built-in defaults. A file that exists but
    /// does not parse or validate is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::get_config_path()?,
        };

        if !config_path.exists() {
            tracing::info!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&config_content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback_answers.is_empty() {
            return Err(ConfigError::NoFallbackAnswers);
        }
        if self.stream_delay.min_ms > self.stream_delay.max_ms {
            return Err(ConfigError::InvalidDelay {
                min_ms: self.stream_delay.min_ms,
                max_ms: self.stream_delay.max_ms,
            });
        }
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("ygpt").join("config.json"))
    }
}
