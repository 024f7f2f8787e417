//! Solver configuration.
//!
//! TOML on disk, every field defaulted so a partial (or missing) file
//! still yields a working deterministic solver. The model fallback is
//! opt-in: the deterministic path needs no credentials and no network.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::llm::LlmConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Model backend settings, used only when `model_fallback` is on
    #[serde(default)]
    pub llm: LlmConfig,

    /// Try the model extractor when deterministic extraction finds
    /// too few numbers
    #[serde(default = "default_model_fallback")]
    pub model_fallback: bool,
}

fn default_model_fallback() -> bool {
    false
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            model_fallback: default_model_fallback(),
        }
    }
}

impl SolverConfig {
    /// Load from a TOML file, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    /// Write the config out as TOML.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write config at {}", path.display()))
    }
}
