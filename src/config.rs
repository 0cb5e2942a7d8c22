//! Tool configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged over it, so a
//! config file only needs the keys it wants to change. CLI flags override the
//! `[defaults]` section afterwards.
//!
//! ## Config File Location
//!
//! `config.toml` is read from the config directory (`--config-dir`, default
//! the current directory). A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [textures]
//! dir = "textures"          # Holds background-<name>.<ext> assets
//!
//! [defaults]
//! variant = "red"
//! border = false
//! border_size = 2           # 0-20
//! invert = false
//! crop = true
//! smooth_blend = true
//! contrast = "auto"         # "auto", "black-white" or "greyscale"
//! remove_background = false
//! padding = false
//! # output_size = 512       # 100-4000, omit for natural size
//! drop_shadow = false
//! horizontal_adjustment = 0 # -160-160, traveller variants only
//!
//! [background_removal]
//! # command = "remove-bg -"  # stdin -> stdout filter
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::ProcessingOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconConfig {
    /// Where texture assets are looked up.
    pub textures: TexturesConfig,
    /// Processing options applied unless a CLI flag says otherwise.
    pub defaults: ProcessingOptions,
    /// External background-removal tool.
    pub background_removal: BackgroundRemovalConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl IconConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.textures.dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "textures.dir must not be empty".into(),
            ));
        }
        self.defaults
            .check_ranges()
            .map_err(|msg| ConfigError::Validation(format!("defaults.{msg}")))?;
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if matches!(&self.background_removal.command, Some(c) if c.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "background_removal.command must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the texture directory relative to the config directory.
    pub fn texture_dir(&self, config_dir: &Path) -> std::path::PathBuf {
        config_dir.join(&self.textures.dir)
    }
}

/// Texture asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TexturesConfig {
    /// Directory with `background-<name>.<ext>` files, relative to the
    /// config directory unless absolute.
    pub dir: String,
}

impl Default for TexturesConfig {
    fn default() -> Self {
        Self {
            dir: "textures".to_string(),
        }
    }
}

/// Background removal settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundRemovalConfig {
    /// Command line of a filter that reads an image on stdin and writes the
    /// cut-out RGBA image to stdout. When absent, background removal is
    /// unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel icon workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(IconConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<IconConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IconConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<IconConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(dir = %dir.display(), ?config, "config loaded");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Clocktower Icons Configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Textures
# ---------------------------------------------------------------------------
[textures]
# Directory holding background-<name>.<ext> texture assets, relative to the
# directory this file lives in. Needs background-white plus one texture per
# colour variant (red, gold, blue, green, traveller, travellergood,
# travellerevil).
dir = "textures"

# ---------------------------------------------------------------------------
# Default processing options (each can be overridden on the command line)
# ---------------------------------------------------------------------------
[defaults]
# Colour variant: red, gold, blue, green, traveller, travellergood, travellerevil
variant = "red"

# Draw a white border around the artwork, border_size pixels wide (0-20).
border = false
border_size = 2

# Invert the greyscale artwork before texturing.
invert = false

# Crop the result to its visible content.
crop = true

# Blend textures by brightness (true) or pick one per pixel by threshold (false).
smooth_blend = true

# Contrast handling: "auto", "black-white" (leave as is) or "greyscale" (boost).
# "auto" boosts contrast unless the artwork is already two-tone.
contrast = "auto"

# Run the background-removal command before processing.
remove_background = false

# Pad the icon so the artwork sits inside a larger transparent square.
padding = false

# Resize the working square to this many pixels (100-4000).
# Omit to keep the artwork's natural size.
# output_size = 512

# Add a soft drop shadow.
drop_shadow = false

# Shift traveller artwork sideways by this many pixels (-160 to 160).
# Negative pads on the left, positive on the right.
horizontal_adjustment = 0

# ---------------------------------------------------------------------------
# Background removal
# ---------------------------------------------------------------------------
[background_removal]
# Command that reads an image on stdin and writes the RGBA cut-out to stdout.
# Results are cached by content hash for the duration of a run.
# command = "remove-bg -"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel icon workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
