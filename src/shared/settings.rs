use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::shared::error::{AppError, AppResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub preferences: UserPreferences,
    pub provider: ProviderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub default_source_lang: String,
    pub default_target_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub endpoint: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            preferences: UserPreferences {
                default_source_lang: "en-GB".to_string(),
                default_target_lang: "yo-NG".to_string(),
            },
            provider: ProviderSettings {
                endpoint: DEFAULT_ENDPOINT.to_string(),
            },
        }
    }
}

impl AppSettings {
    pub fn settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "lingo-widgets")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::Io("Failed to determine config directory".to_string()))
    }

    pub async fn load() -> AppResult<Self> {
        Self::load_from(&Self::settings_path()?).await
    }

    pub async fn save(&self) -> AppResult<()> {
        self.save_to(&Self::settings_path()?).await
    }

    /// First run writes the defaults so the user has a file to edit.
    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path).await?;
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }
}
