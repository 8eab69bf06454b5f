//! User configuration.
//!
//! Config file location: `<config dir>/blastview/config.toml`. Command-line flags override
//! individual values for a single run and are never written back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_RESULT_LIMIT, DEFAULT_TRANSITION_SECS, ViewMode,
};
use crate::graph::{DEFAULT_HOPS, DEFAULT_NODE_LIMIT, MAX_HOPS, MIN_HOPS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_hops: u8,
    pub node_limit: usize,
    pub default_view: ViewMode,
    /// Vertical offset per hop ring in the 3D view.
    pub vertical_lift: f32,
    pub layout_jitter: f32,
    pub search_result_limit: usize,
    pub color_cache_capacity: usize,
    pub camera_transition_secs: f32,
    /// Catalog to load instead of the bundled demo organization.
    pub catalog_path: Option<PathBuf>,
    pub organization_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_hops: DEFAULT_HOPS,
            node_limit: DEFAULT_NODE_LIMIT,
            default_view: ViewMode::ThreeD,
            vertical_lift: 1.2,
            layout_jitter: 0.35,
            search_result_limit: DEFAULT_RESULT_LIMIT,
            color_cache_capacity: DEFAULT_CACHE_CAPACITY,
            camera_transition_secs: DEFAULT_TRANSITION_SECS,
            catalog_path: None,
            organization_id: None,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("blastview");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, creating it with defaults on first run
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            let config = Config::default();
            config.save_to(&path)?;
            return Ok(config);
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write config to {:?}", path))
    }

    /// Parses and sanitizes; out-of-range numbers fall back to or are clamped toward defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid config TOML")?;
        Ok(config.sanitized())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.default_hops = self.default_hops.clamp(MIN_HOPS, MAX_HOPS);
        if self.node_limit == 0 {
            self.node_limit = defaults.node_limit;
        }
        self.node_limit = self.node_limit.min(DEFAULT_NODE_LIMIT);
        if !self.vertical_lift.is_finite() || self.vertical_lift < 0.0 {
            self.vertical_lift = defaults.vertical_lift;
        }
        if !self.layout_jitter.is_finite() || self.layout_jitter < 0.0 {
            self.layout_jitter = defaults.layout_jitter;
        }
        if self.search_result_limit == 0 {
            self.search_result_limit = defaults.search_result_limit;
        }
        if self.color_cache_capacity == 0 {
            self.color_cache_capacity = defaults.color_cache_capacity;
        }
        if !self.camera_transition_secs.is_finite() || self.camera_transition_secs < 0.0 {
            self.camera_transition_secs = defaults.camera_transition_secs;
        }
        self.organization_id = self
            .organization_id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty());
        self
    }
}
