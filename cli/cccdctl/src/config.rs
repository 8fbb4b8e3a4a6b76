//! CLI settings.
//!
//! Stored as JSON under the platform config directory. `CCCD_OUTPUT_DIR`
//! overrides the saved export directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

const OUTPUT_DIR_ENV: &str = "CCCD_OUTPUT_DIR";

/// Get the config directory path.
fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("vn", "cccd", "cccd")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/cccd")
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory that relative export paths are resolved against.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load config from disk, or return default, then apply the environment.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&config_dir()?.join(CONFIG_FILE))?;
        Ok(config.with_env_override(std::env::var(OUTPUT_DIR_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_dir()?.join(CONFIG_FILE);
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("Failed to write config to {:?}", path))
    }

    fn with_env_override(mut self, output_dir: Option<String>) -> Self {
        if let Some(dir) = output_dir.filter(|d| !d.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Resolves an export path: absolute paths are kept, relative ones land
    /// under the output directory.
    pub fn resolve_output(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.output_dir.join(file)
        }
    }
}
