use anyhow::{Context, Result};
use directories::ProjectDirs;
use facematch_vision::DetectorOptions;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::matcher::DEFAULT_THRESHOLD;

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("", "", "facematch"));

pub static CONFIG_PATH: Lazy<PathBuf> = Lazy::new(|| match option_env!("FACEMATCH_CONFIG_PATH") {
    Some(p) => PathBuf::from(p),
    None => PROJECT_DIRS
        .as_ref()
        .map(|d| d.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("facematch.toml")),
});

pub static DEFAULT_STORE: Lazy<PathBuf> = Lazy::new(|| {
    PROJECT_DIRS
        .as_ref()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".facematch"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Largest descriptor distance still counted as the same face
    pub threshold: f32,
    /// Detection cycle period
    pub interval_ms: u64,
    pub display_width: u32,
    pub display_height: u32,
    pub input_size: u32,
    pub score_threshold: f32,
    /// Where the reference descriptor is kept
    pub store: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            interval_ms: 500,
            display_width: 940,
            display_height: 720,
            input_size: 416,
            score_threshold: 0.5,
            store: DEFAULT_STORE.clone(),
        }
    }
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn display_size(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            input_size: self.input_size,
            score_threshold: self.score_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            anyhow::bail!("threshold must be a non-negative number, got {}", self.threshold);
        }
        if self.interval_ms == 0 {
            anyhow::bail!("interval_ms must be positive");
        }
        if self.display_width == 0 || self.display_height == 0 || self.input_size == 0 {
            anyhow::bail!("display and input sizes must be positive");
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(CONFIG_PATH.as_path());
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(CONFIG_PATH.as_path());
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
