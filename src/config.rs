use std::path::Path;

use anyhow::{Context, Result};
use regime_calendar::Period;
use serde::Deserialize;

/// Top-level model file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Calendar date of model time 0, as `YYYY-MM-DD`.
    #[serde(default = "default_start_date")]
    pub start_date: String,

    /// Length of one model time step, e.g. `"1Y"` or `"3M"`.
    #[serde(default = "default_period")]
    pub period: Period,

    /// Number of time steps whose distributions are precomputed.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// How segments are joined: `"ordinal"` or `"explicit"`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Regimes in time order.
    pub segments: Vec<SegmentToml>,
}

fn default_start_date() -> String {
    "2000-01-01".to_string()
}
fn default_period() -> Period {
    Period::years(1)
}
fn default_cache_size() -> usize {
    50
}
fn default_mode() -> String {
    "ordinal".to_string()
}

/// One regime. Matrix rows are destination states, columns origin states.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentToml {
    /// State distribution at the start of the segment.
    #[serde(default)]
    pub initial: Option<Vec<f64>>,

    /// Intra-segment transition matrix.
    pub transition: Vec<Vec<f64>>,

    /// Number of steps in the segment; omitted on the last one.
    #[serde(default)]
    pub length: Option<u64>,

    /// Matrix linking this segment to the next (explicit mode).
    #[serde(default)]
    pub inter: Option<Vec<Vec<f64>>>,
}

impl ModelToml {
    /// Reads and parses a model file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model file: {}", path.display()))?;
        toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse model file: {}", path.display()))
    }
}
