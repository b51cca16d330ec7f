//! Configuration types for the localization engine
//!
//! Every field has a serde default so partial JSON objects from the host
//! application deserialize cleanly.

use serde::{Deserialize, Serialize};

use crate::error::GlossError;

/// Matching and anchor-lookup policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Minimum trimmed prefix length (UTF-16 units) for prefix recovery
    #[serde(default = "default_min_prefix_len")]
    pub anchor_min_prefix_len: usize,

    /// Prefix length (UTF-16 units) taken from an anchor for prefix recovery
    #[serde(default = "default_prefix_len")]
    pub anchor_prefix_len: usize,

    /// Trim whitespace around glossary terms before building the automaton
    #[serde(default = "default_true")]
    pub trim_patterns: bool,
}

fn default_min_prefix_len() -> usize { 20 }
fn default_prefix_len() -> usize { 100 }
fn default_true() -> bool { true }

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            anchor_min_prefix_len: default_min_prefix_len(),
            anchor_prefix_len: default_prefix_len(),
            trim_patterns: true,
        }
    }
}

/// Background matching service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name given to the worker thread
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_thread_name() -> String { "glosscore-scan".to_string() }

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlossConfig {
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

impl GlossConfig {
    /// Parse and validate a JSON configuration object
    pub fn from_json(json: &str) -> Result<Self, GlossError> {
        let config: GlossConfig =
            serde_json::from_str(json).map_err(|e| GlossError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GlossError> {
        let locator = &self.locator;
        if locator.anchor_prefix_len == 0 {
            return Err(GlossError::InvalidConfig(
                "anchor_prefix_len must be positive".to_string(),
            ));
        }
        if locator.anchor_prefix_len < locator.anchor_min_prefix_len {
            return Err(GlossError::InvalidConfig(format!(
                "anchor_prefix_len ({}) is shorter than anchor_min_prefix_len ({})",
                locator.anchor_prefix_len, locator.anchor_min_prefix_len
            )));
        }
        if self.service.thread_name.is_empty() {
            return Err(GlossError::InvalidConfig("thread_name is empty".to_string()));
        }
        Ok(())
    }
}
