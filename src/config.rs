// src/config.rs

//! Defines the configuration structures for the table generator.
//!
//! Every section can be deserialized from a JSON file. Missing fields fall
//! back to the defaults below, which reproduce the reference output: the
//! four brightness multipliers `[0.71, 0.86, 1.0, 0.53]`, the first four
//! variants excluded, and the table written to `extracted/closest_colours.dat`.
//! Command-line flags are applied on top of the loaded values in `main.rs`.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::lut::{self, Strategy, DEFAULT_EXCLUDE_COUNT};
use crate::palette::DEFAULT_MULTIPLIERS;
use crate::render::{self, RenderOptions, VectorStyle};

// --- Top-Level Configuration Structure ---

/// Root of the configuration tree.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)] // Missing sections use their defaults.
pub struct Config {
    /// How base colors are expanded into variants.
    pub palette: PaletteConfig,
    /// Dense table build and output settings.
    pub table: TableConfig,
    /// Constant-table rendering settings.
    pub render: RenderConfig,
}

// --- Palette Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaletteConfig {
    /// Brightness multipliers, in variant index order.
    /// Order matters: it fixes the index of every variant.
    pub multipliers: Vec<f32>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        PaletteConfig {
            multipliers: DEFAULT_MULTIPLIERS.to_vec(),
        }
    }
}

// --- Table Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    /// Leading variants that never win a match (the reserved first color).
    pub exclude_count: usize,
    /// Destination of the 16 MiB table file.
    pub output: PathBuf,
    /// Worker threads for the scan. `None` uses one per core; `Some(1)`
    /// runs the plain sequential scan.
    pub threads: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            exclude_count: DEFAULT_EXCLUDE_COUNT,
            output: PathBuf::from("extracted/closest_colours.dat"),
            threads: None,
        }
    }
}

impl TableConfig {
    pub fn strategy(&self) -> Strategy {
        match self.threads {
            None => Strategy::Parallel,
            Some(1) => Strategy::Sequential,
            Some(threads) => Strategy::ParallelWith { threads },
        }
    }
}

// --- Render Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Identifier of the generated constant.
    pub const_name: String,
    /// `array` for `[f32; 3]` elements, `vec3` for `Vec3::new(..)`.
    pub style: VectorStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let defaults = RenderOptions::default();
        RenderConfig {
            const_name: defaults.const_name,
            style: defaults.style,
        }
    }
}

impl RenderConfig {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            const_name: self.const_name.clone(),
            style: self.style,
        }
    }
}

impl Config {
    /// Loads a configuration file. Unknown fields are ignored.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Rejects settings that cannot produce a meaningful table.
    pub fn validate(&self) -> anyhow::Result<()> {
        let multipliers = &self.palette.multipliers;
        if multipliers.is_empty() {
            bail!("palette.multipliers must not be empty");
        }
        if let Some(bad) = multipliers
            .iter()
            .find(|m| !m.is_finite() || **m <= 0.0 || **m > 1.0)
        {
            bail!("palette.multipliers entries must be in (0, 1], got {}", bad);
        }
        if multipliers.len() > lut::MAX_VARIANTS {
            bail!(
                "{} multipliers exceed the {}-variant table capacity",
                multipliers.len(),
                lut::MAX_VARIANTS
            );
        }
        if self.table.threads == Some(0) {
            bail!("table.threads must be at least 1");
        }
        if !render::is_valid_const_name(&self.render.const_name) {
            bail!(
                "render.const_name '{}' is not a valid Rust identifier",
                self.render.const_name
            );
        }
        Ok(())
    }
}
