use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cogq_srs::{DEFAULT_INTERVAL_DAYS, IntervalTable};
use cogq_store::{Difficulty, JsonFileStore, KeyValueStore, MemoryStore, StoreError};
use serde::Deserialize;

use crate::error::ConfigError;

/// Prefix of every environment variable read by [`StudyConfig::from_env`].
pub const ENV_PREFIX: &str = "COGQ_";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

const fn default_question_count() -> usize {
    10
}

fn default_srs_intervals_days() -> Vec<u32> {
    DEFAULT_INTERVAL_DAYS.to_vec()
}

const fn default_easy_duration_secs() -> u64 {
    420 // 7 minutes
}

const fn default_medium_duration_secs() -> u64 {
    300 // 5 minutes
}

const fn default_hard_duration_secs() -> u64 {
    240 // 4 minutes
}

/// Application configuration, read from `COGQ_*` environment variables
#[derive(Clone, Debug, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub env: Environment,
    /// Questions per quiz; a generated batch with fewer is rejected
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Review intervals in days, comma separated in the environment
    #[serde(default = "default_srs_intervals_days")]
    pub srs_intervals_days: Vec<u32>,
    #[serde(default = "default_easy_duration_secs")]
    pub easy_duration_secs: u64,
    #[serde(default = "default_medium_duration_secs")]
    pub medium_duration_secs: u64,
    #[serde(default = "default_hard_duration_secs")]
    pub hard_duration_secs: u64,
    /// JSON file backing the key-value store; in-memory when unset
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            question_count: default_question_count(),
            srs_intervals_days: default_srs_intervals_days(),
            easy_duration_secs: default_easy_duration_secs(),
            medium_duration_secs: default_medium_duration_secs(),
            hard_duration_secs: default_hard_duration_secs(),
            store_path: None,
        }
    }
}

impl StudyConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from explicit `(name, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.question_count == 0 {
            return Err(ConfigError::QuestionCount);
        }

        self.interval_table()?;

        for difficulty in Difficulty::ALL {
            if self.quiz_duration(difficulty).is_zero() {
                return Err(ConfigError::Duration(difficulty.as_str()));
            }
        }

        Ok(())
    }

    pub fn interval_table(&self) -> Result<IntervalTable, ConfigError> {
        Ok(IntervalTable::from_days(&self.srs_intervals_days)?)
    }

    /// Time allowed for a quiz at `difficulty`.
    pub const fn quiz_duration(&self, difficulty: Difficulty) -> Duration {
        let secs = match difficulty {
            Difficulty::Easy => self.easy_duration_secs,
            Difficulty::Medium => self.medium_duration_secs,
            Difficulty::Hard => self.hard_duration_secs,
        };
        Duration::from_secs(secs)
    }

    /// Open the configured key-value backend.
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        match &self.store_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using JSON file store");
                Ok(Arc::new(JsonFileStore::open(path)?))
            }
            None => {
                tracing::warn!("No store path configured, progress will not be persisted");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}
