//! Client settings with persistence
//!
//! Settings are saved to `~/.config/mirage/settings.toml`

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mirage_assets::TransferConfig;

/// All client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSettings {
    pub transfer: TransferConfig,
    pub simulation: SimSettings,
}

impl ClientSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mirage"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Parameters of the simulated lossy server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSettings {
    /// RNG seed, for reproducible runs
    pub seed: u64,
    /// Probability that a chunk is dropped in flight
    pub loss: f64,
    /// Probability that a chunk is delivered twice
    pub duplicate: f64,
    /// Chunk size the simulated server uses
    pub chunk_size: u32,
    /// Number of assets the demo session requests
    pub asset_count: usize,
    /// Seconds of simulated time per tick
    pub tick_seconds: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            seed: 7,
            loss: 0.05,
            duplicate: 0.05,
            chunk_size: 1000,
            asset_count: 6,
            tick_seconds: 0.5,
        }
    }
}
