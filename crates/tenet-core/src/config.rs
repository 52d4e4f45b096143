//! Configuration file loading for tenet.
//!
//! Reads `tenet.json` from a config directory and provides typed access to the
//! enforcement toggles. Falls back to defaults when the file is missing or incomplete.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level tenet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenetConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub coverage: CoverageConfig,
    #[serde(default)]
    pub signature: SignatureConfig,
}

/// Abstract coverage behavior at instantiation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Run the coverage scan on the first instantiation of a concrete entity.
    #[serde(default = "default_true")]
    pub check_on_instantiate: bool,
    /// Remember entities that already passed the scan.
    #[serde(default = "default_true")]
    pub cache_verified: bool,
}

/// Argument-shape comparison toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureConfig {
    #[serde(default = "default_true")]
    pub check_shapes: bool,
}

fn default_true() -> bool {
    true
}
fn default_version() -> String {
    "0.1.0".to_string()
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            check_on_instantiate: true,
            cache_verified: true,
        }
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self { check_shapes: true }
    }
}

impl Default for TenetConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            coverage: CoverageConfig::default(),
            signature: SignatureConfig::default(),
        }
    }
}

impl TenetConfig {
    /// Load configuration from `tenet.json` inside the given directory.
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load(config_dir: &Path) -> Self {
        let config_path = config_dir.join("tenet.json");
        let content = match std::fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "failed to parse tenet config, using defaults"
                );
                Self::default()
            }
        }
    }
}
