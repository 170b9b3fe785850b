// Harvest limits and the relevance prefilter
// Loaded from an optional JSON config file, overridden by CLI flags

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Bodies longer than this many bytes are rejected before parsing
pub const DEFAULT_BODY_LIMIT: usize = 2_000_000;

/// Ceiling on container nodes visited per walk
pub const DEFAULT_MAX_NODES: usize = 100_000;

/// How many leading characters the prefilter inspects
pub const DEFAULT_PREFILTER_WINDOW: usize = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Maximum response body size in bytes
    pub body_limit_bytes: usize,
    /// Hard ceiling on JSON nodes visited per response
    pub max_nodes: usize,
    /// Cheap relevance prefilter; `None` disables it
    pub prefilter: Option<PrefilterConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefilterConfig {
    /// Number of leading characters to inspect
    pub window: usize,
    /// At least one must occur (case-insensitive) within the window
    pub needles: Vec<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            body_limit_bytes: DEFAULT_BODY_LIMIT,
            max_nodes: DEFAULT_MAX_NODES,
            prefilter: Some(PrefilterConfig::default()),
        }
    }
}

impl Default for PrefilterConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_PREFILTER_WINDOW,
            needles: vec!["legal".to_string(), "template".to_string()],
        }
    }
}

impl HarvestConfig {
    /// Per-user config file location
    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("holdscan")
            .join("config.json")
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("could not read {}: {}", path.display(), e))?;
        let config: HarvestConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow!("malformed config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Load the per-user config if present, defaults otherwise
    pub fn load_default() -> Result<Self> {
        let path = Self::config_file_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
