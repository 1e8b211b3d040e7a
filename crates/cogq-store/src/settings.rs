//! Saved API credential and theme preference.
//!
//! Both are stored as raw strings, not JSON.

use std::sync::Arc;

use crate::kv::{KeyValueStore, Result};
use crate::models::Theme;

pub const CREDENTIAL_KEY: &str = "geminiApiKey";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone)]
pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// The saved credential; blank values count as absent.
    pub fn load_credential(&self) -> Result<Option<String>> {
        Ok(self
            .kv
            .get(CREDENTIAL_KEY)?
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()))
    }

    pub fn save_credential(&self, credential: &str) -> Result<()> {
        self.kv.set(CREDENTIAL_KEY, credential.trim())
    }

    pub fn clear_credential(&self) -> Result<()> {
        self.kv.remove(CREDENTIAL_KEY)
    }

    /// The saved theme, if one was saved and is recognised.
    pub fn load_theme(&self) -> Result<Option<Theme>> {
        Ok(self.kv.get(THEME_KEY)?.as_deref().and_then(Theme::parse))
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.kv.set(THEME_KEY, theme.as_str())
    }
}
