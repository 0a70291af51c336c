use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use todo::GenerationSettings;
use tracing::{debug, info, warn};

pub const CONFIG_FILE: &str = "config.toml";

/// Настройки приложения из `config.toml` в домашнем каталоге
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Task file; relative paths resolve against the home directory
    pub data_file: Option<PathBuf>,
    pub color: bool,
    pub assistant: AssistantConfig,
}

/// Unset values fall through to the model client's own defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            color: true,
            assistant: AssistantConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `config.toml` from `home`; a missing file gives the defaults
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `TASKPILOT_DATA_FILE`, `NO_COLOR`, `MAX_TOKENS` and
    /// `TEMPERATURE` from `lookup`. Unparsable numbers are ignored.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(file) = lookup("TASKPILOT_DATA_FILE").filter(|f| !f.trim().is_empty()) {
            self.data_file = Some(PathBuf::from(file));
        }
        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.color = false;
        }
        if let Some(raw) = lookup("MAX_TOKENS") {
            match raw.trim().parse::<u32>() {
                Ok(tokens) => self.assistant.max_tokens = Some(tokens),
                Err(_) => warn!("Ignoring MAX_TOKENS={:?}", raw),
            }
        }
        if let Some(raw) = lookup("TEMPERATURE") {
            match raw.trim().parse::<f32>() {
                Ok(temperature) => self.assistant.temperature = Some(temperature),
                Err(_) => warn!("Ignoring TEMPERATURE={:?}", raw),
            }
        }
        self
    }

    pub fn data_path(&self, home: &Path) -> PathBuf {
        match &self.data_file {
            Some(file) if file.is_absolute() => file.clone(),
            Some(file) => home.join(file),
            None => home.join("tasks.json"),
        }
    }

    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings {
            max_tokens: self.assistant.max_tokens,
            temperature: self.assistant.temperature,
        }
    }
}
