use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::deck::sequencer::Mode;
use crate::deck::source::QuestionSource;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "promptdeck";

pub const VALID_KEYS: &[&str] = &[
    "defaults.source",
    "defaults.fallback",
    "defaults.mode",
    "defaults.categories",
    "defaults.show_intro",
    "defaults.windowed",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Spreadsheet CSV export URL or local CSV path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Local CSV used when the remote source cannot be fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Default category selection. Absent means all categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_intro: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windowed: Option<bool>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid value for {key}: {value}. Must be 'true' or 'false'."),
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `promptdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# promptdeck configuration\n{yaml}");
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn defaults_mut(&mut self) -> &mut DefaultsConfig {
        self.defaults.get_or_insert_with(DefaultsConfig::default)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.source" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid source: must be a URL or a CSV path.");
                }
                self.defaults_mut().source = Some(value.trim().to_string());
            }
            "defaults.fallback" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid fallback: must be a CSV path.");
                }
                self.defaults_mut().fallback = Some(PathBuf::from(value.trim()));
            }
            "defaults.mode" => {
                match value {
                    "mixed" | "questions" => {}
                    _ => anyhow::bail!("Invalid mode: {value}. Must be 'mixed' or 'questions'."),
                }
                self.defaults_mut().mode = Some(value.to_string());
            }
            "defaults.categories" => {
                let names: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                // An empty list clears the default selection.
                self.defaults_mut().categories = if names.is_empty() { None } else { Some(names) };
            }
            "defaults.show_intro" => {
                self.defaults_mut().show_intro = Some(parse_bool(key, value)?);
            }
            "defaults.windowed" => {
                self.defaults_mut().windowed = Some(parse_bool(key, value)?);
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {}", VALID_KEYS.join(", ")),
        }
        Ok(())
    }

    /// Source from the CLI argument if given, else from the config.
    pub fn question_source(&self, arg: Option<&str>) -> QuestionSource {
        let defaults = self.defaults.clone().unwrap_or_default();
        let mut source = match arg.or(defaults.source.as_deref()) {
            Some(arg) => QuestionSource::from_arg(arg),
            None => QuestionSource::default(),
        };
        if source.fallback.is_none() {
            source.fallback = defaults.fallback;
        }
        source
    }

    pub fn mode(&self) -> Mode {
        self.defaults
            .as_ref()
            .and_then(|d| d.mode.as_deref())
            .map(Mode::from_name)
            .unwrap_or(Mode::Mixed)
    }

    pub fn categories(&self) -> Option<&[String]> {
        self.defaults.as_ref().and_then(|d| d.categories.as_deref())
    }

    pub fn show_intro(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.show_intro)
            .unwrap_or(false)
    }

    pub fn windowed(&self) -> bool {
        self.defaults.as_ref().and_then(|d| d.windowed).unwrap_or(false)
    }
}
