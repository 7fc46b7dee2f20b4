use crate::error::AppError;
use crate::model::LoadLevel;
use crate::timeline::DEFAULT_PADDING_DAYS;
use crate::workload::LoadThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "PLANNER_CONFIG_PATH";
const DEFAULT_WEEK_COUNT: u32 = 4;

#[derive(Debug, Clone)]
pub struct Palette {
    pub overloaded: &'static str,
    pub high: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    /// Wrap `text` in the colour used for `level`. Normal and low loads stay
    /// uncoloured apart from the muted tone for idle weeks.
    pub fn paint(&self, level: LoadLevel, text: &str) -> String {
        let colour = match level {
            LoadLevel::Overloaded => self.overloaded,
            LoadLevel::High => self.high,
            LoadLevel::Normal => "",
            LoadLevel::Low => self.muted,
        };
        if colour.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", colour, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match canonical_theme_name_option(theme) {
        Some(ref name) if name == "noir" => Palette {
            overloaded: "\x1b[38;5;196m",
            high: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Some(ref name) if name == "solarized" => Palette {
            overloaded: "\x1b[38;5;160m",
            high: "\x1b[38;5;136m",
            muted: "\x1b[38;5;246m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            overloaded: "",
            high: "",
            muted: "",
            reset: "",
        },
    }
}

fn canonical_theme_name_option(theme: Option<&str>) -> Option<String> {
    theme.and_then(canonical_theme_name)
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        return Some("default".into());
    }

    match trimmed {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

fn default_padding_days() -> u32 {
    DEFAULT_PADDING_DAYS
}

fn default_week_count() -> u32 {
    DEFAULT_WEEK_COUNT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub thresholds: LoadThresholds,
    #[serde(default = "default_padding_days")]
    pub padding_days: u32,
    #[serde(default = "default_week_count")]
    pub week_count: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            thresholds: LoadThresholds::default(),
            padding_days: default_padding_days(),
            week_count: default_week_count(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), AppError> {
        self.thresholds.validate()?;
        if self.week_count == 0 {
            return Err(AppError::invalid_input("week_count must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub overloaded: Option<f64>,
    pub high: Option<f64>,
    pub normal: Option<f64>,
    pub padding_days: Option<u32>,
    pub week_count: Option<u32>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("planner")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("planner")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "falling back to default config");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config
        .validate()
        .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err.message())))?;
    Ok(normalize_config_theme(config))
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }

    if let Some(value) = overrides.overloaded {
        merged.thresholds.overloaded = value;
    }
    if let Some(value) = overrides.high {
        merged.thresholds.high = value;
    }
    if let Some(value) = overrides.normal {
        merged.thresholds.normal = value;
    }
    if let Some(value) = overrides.padding_days {
        merged.padding_days = value;
    }
    if let Some(value) = overrides.week_count {
        merged.week_count = value;
    }

    merged
}
