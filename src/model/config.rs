use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Project name for config, data and log directories.
pub const APP_NAME: &str = "screensaver-installer";

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub screensaver: ScreensaverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub log_filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreensaverConfig {
    pub bundle_name: String,
    /// Empty means "next to the running executable".
    #[serde(default)]
    pub bundled_path: String,
    /// Empty means the platform's user screensaver directory.
    #[serde(default)]
    pub install_dir: String,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let user_path = project_dirs().map(|d| d.config_dir().join("config.toml"));

        Self::load_from(user_path.as_deref())
    }

    /// Same as [`AppConfig::load`], with an explicit user config location.
    pub fn load_from(user_path: Option<&Path>) -> Result<Self> {
        let mut merged: toml::Value =
            toml::from_str(DEFAULT_CONFIG).context("built-in default config is invalid")?;

        if let Some(config_path) = user_path
            && config_path.exists()
        {
            let user_str = fs::read_to_string(config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let user_value: toml::Value = toml::from_str(&user_str)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            merge_tables(&mut merged, user_value);
        }

        let mut config: AppConfig = merged.try_into()?;

        config.screensaver.install_dir = expand_home(&config.screensaver.install_dir)?;
        config.screensaver.bundled_path = expand_home(&config.screensaver.bundled_path)?;

        Ok(config)
    }

    pub fn install_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.screensaver.install_dir)
    }

    pub fn bundled_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.screensaver.bundled_path)
    }
}

/// Overlay `overlay` onto `base`, recursing into tables so a user file only
/// needs the keys it changes.
fn merge_tables(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_tables(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn expand_home(path: &str) -> Result<String> {
    if !path.starts_with('~') {
        return Ok(path.to_string());
    }

    let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(path.replacen('~', &home.to_string_lossy(), 1))
}

fn non_empty_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

/// Config, data and log directories all hang off this one project name.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

pub(crate) fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
