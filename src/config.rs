use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::dates::current_year;
use crate::render::{RendererKind, ViewMode};
use crate::{plog_debug, plog_warn, Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Active renderer. An unknown name in the file falls back to the
    /// default with a warning.
    #[serde(default, deserialize_with = "lenient_renderer")]
    pub renderer: RendererKind,
    /// Year used for default dates and the timeline window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Days between a dependency's end and its dependent's start when
    /// auto-scheduling.
    #[serde(default = "default_min_gap_days")]
    pub min_gap_days: i64,
}

fn default_min_gap_days() -> i64 {
    1
}

fn lenient_renderer<'de, D>(deserializer: D) -> std::result::Result<RendererKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|_| {
        plog_warn!("Config: unknown renderer {:?}, using {}", raw, RendererKind::default());
        RendererKind::default()
    }))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            reference_year: None,
            view_mode: ViewMode::default(),
            title: None,
            min_gap_days: default_min_gap_days(),
        }
    }
}

impl Config {
    pub fn planline_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".planline"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::planline_dir()?.join("planline.toml"))
    }

    pub fn effective_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(current_year)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        plog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            plog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        plog_debug!(
            "Config loaded: renderer={}, reference_year={:?}, view_mode={}, min_gap_days={}",
            config.renderer,
            config.reference_year,
            config.view_mode,
            config.min_gap_days
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                plog_debug!("Creating config directory: {}", dir.display());
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        plog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
