//! Framework configuration
//!
//! Settings are plain serde structs. Every field has a default, so a config
//! file only needs to name what it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ai::{CrowdConfig, PathfindingConfig};

/// Configuration for an [`AiFramework`](crate::ai::AiFramework)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Defaults for grid searches and flow fields
    pub pathfinding: PathfindingConfig,
    /// Steering weights for newly created crowds
    pub crowd: CrowdConfig,
}

impl AiConfig {
    /// Set pathfinding defaults
    #[must_use]
    pub fn with_pathfinding(mut self, pathfinding: PathfindingConfig) -> Self {
        self.pathfinding = pathfinding;
        self
    }

    /// Set crowd steering weights
    #[must_use]
    pub fn with_crowd(mut self, crowd: CrowdConfig) -> Self {
        self.crowd = crowd;
        self
    }

    /// Parse a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsing fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsing fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Malformed document
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
