//! Configuration file support for IronCore.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ironcore/config.toml`.

use crate::catalog::{get_default_catalog, Catalog};
use crate::goals::GoalMap;
use crate::index::ExerciseIndex;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub recommendation: RecommendationConfig,

    #[serde(default)]
    pub occupancy: OccupancyConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Exercise catalog source
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// JSON catalog replacing the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Goal mapping configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendationConfig {
    #[serde(default = "default_fallback_categories")]
    pub fallback_categories: Vec<String>,

    /// Extra or replacement goal → categories entries
    #[serde(default)]
    pub goals: HashMap<String, Vec<String>>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            fallback_categories: default_fallback_categories(),
            goals: HashMap::new(),
        }
    }
}

/// Occupancy view configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OccupancyConfig {
    #[serde(default = "default_recent_log_len")]
    pub recent_log_len: usize,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            recent_log_len: default_recent_log_len(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("ironcore")
}

fn default_fallback_categories() -> Vec<String> {
    crate::goals::FALLBACK_CATEGORIES
        .iter()
        .map(|c| (*c).to_string())
        .collect()
}

fn default_recent_log_len() -> usize {
    10
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("ironcore").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Build the exercise index from the configured catalog
    ///
    /// The catalog is validated first; an unknown level fails the build.
    pub fn build_index(&self) -> Result<ExerciseIndex> {
        let loaded;
        let catalog = match &self.catalog.path {
            Some(path) => {
                loaded = Catalog::load_from(path)?;
                &loaded
            }
            None => get_default_catalog(),
        };

        catalog.ensure_valid()?;
        ExerciseIndex::build(catalog)
    }

    /// Goal map with the configured overrides applied
    pub fn goal_map(&self) -> GoalMap {
        GoalMap::with_overrides(
            &self.recommendation.goals,
            Some(&self.recommendation.fallback_categories),
        )
    }
}
