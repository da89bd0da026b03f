use crate::error::{Result, WifiError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime tunables. Loaded from `config.toml` when one exists next to the
/// binary; every field falls back to a default, so the file is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where raw JSON snapshots are written.
    pub raw_data_dir: PathBuf,
    /// Where cleaned/aggregate CSV snapshots are written.
    pub processed_data_dir: PathBuf,
    /// Where charts and the map land.
    pub viz_dir: PathBuf,
    /// Records requested per API page.
    pub page_size: u64,
    /// HTTP timeout for a single page fetch.
    pub timeout_seconds: u64,
    /// Fraction of cleaned rows shown on the interactive map.
    pub sample_ratio: f64,
    /// RNG seed for the map subsample, fixed for reproducible output.
    pub sample_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from("data/raw"),
            processed_data_dir: PathBuf::from("data/processed"),
            viz_dir: PathBuf::from("results/visualizations"),
            page_size: 1000,
            timeout_seconds: 10,
            sample_ratio: 0.1,
            sample_seed: 42,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Path::new("config.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(config_path).map_err(|e| {
            WifiError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Creates every directory the pipeline writes into.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.raw_data_dir, &self.processed_data_dir, &self.viz_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
