//! Plugin configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! form the base layer; a user `config.toml` overrides just the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [temp]
//! base_dir = ""             # Parent of the artifact directory ("" = system temp dir)
//! dir_name = "TempImgs"     # Artifact directory name
//!
//! [compression]
//! format = "jpeg"           # jpeg | png
//! max_decode_bytes = 268435456
//! compress_picked = false   # Normalize images delivered by pickImages
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{NormalizeOptions, OutputFormat, operations::DEFAULT_MAX_DECODE_BYTES};
use crate::workdir::{DEFAULT_DIR_NAME, WorkDir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// File looked up inside the `--config` directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

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

/// Plugin configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// Where normalized artifacts are written.
    pub temp: TempConfig,
    /// Normalizer knobs that are not per-call arguments.
    pub compression: CompressionConfig,
}

impl PluginConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.temp.dir_name;
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "temp.dir_name must not be empty".into(),
            ));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ConfigError::Validation(format!(
                "temp.dir_name must be a single directory name, got {name:?}"
            )));
        }
        if self.compression.max_decode_bytes == 0 {
            return Err(ConfigError::Validation(
                "compression.max_decode_bytes must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn work_dir(&self) -> WorkDir {
        self.temp.work_dir()
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            format: self.compression.format,
            max_decode_bytes: self.compression.max_decode_bytes,
        }
    }
}

/// Artifact directory settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TempConfig {
    /// Parent directory. Empty means the system temp directory.
    pub base_dir: String,
    pub dir_name: String,
}

impl Default for TempConfig {
    fn default() -> Self {
        Self {
            base_dir: String::new(),
            dir_name: DEFAULT_DIR_NAME.to_string(),
        }
    }
}

impl TempConfig {
    pub fn work_dir(&self) -> WorkDir {
        if self.base_dir.is_empty() {
            WorkDir::in_system_temp(&self.dir_name)
        } else {
            WorkDir::new(Path::new(&self.base_dir).join(&self.dir_name))
        }
    }
}

/// Normalizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    pub format: OutputFormat,
    /// Allocation ceiling for a single decode.
    pub max_decode_bytes: u64,
    /// Run images returned by `pickImages` through the normalizer before
    /// delivering them.
    pub compress_picked: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            max_decode_bytes: DEFAULT_MAX_DECODE_BYTES,
            compress_picked: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// `PluginConfig::default()` as a TOML table: the layer a user file is
/// laid over.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PluginConfig::default())?)
}

/// Lay `overlay` over `base` in place.
///
/// A table in both merges entry by entry, so `[compression] format = "png"`
/// leaves the other compression keys at their base values. Anything else
/// (scalars, arrays, a table meeting a scalar) is replaced outright.
pub fn merge_into(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_into(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, overlay) => *slot = overlay,
    }
}

/// Parse `<dir>/config.toml` without interpreting it.
///
/// A missing file is `Ok(None)`. Any other read failure, including `dir`
/// not being a directory, is an error.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using stock defaults");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Some(toml::from_str(&content)?))
}

/// Apply the optional user layer to `base`, then deserialize and validate.
///
/// Unknown keys surface here as [`ConfigError::Toml`], since `base` itself
/// only ever holds known ones.
pub fn resolve_config(
    mut base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PluginConfig, ConfigError> {
    if let Some(overlay) = overlay {
        merge_into(&mut base, overlay);
    }
    let config: PluginConfig = base.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Stock defaults, overridden by `<dir>/config.toml` when present.
pub fn load_config(dir: &Path) -> Result<PluginConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# medias-picker configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Artifact directory
# ---------------------------------------------------------------------------
[temp]
# Parent directory for normalized images. Empty = the system temp directory.
base_dir = ""

# Name of the directory created under base_dir. deleteAllTempFiles removes
# this directory and every file directly inside it.
dir_name = "TempImgs"

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# Output encoding: "jpeg" (honours the quality argument) or "png" (lossless).
format = "jpeg"

# Largest allocation a single decode may make, in bytes. Images that need
# more are returned unchanged instead of being compressed.
max_decode_bytes = 268435456

# When true, images returned by pickImages are normalized with the call's
# maxWidth/maxHeight/quality before being delivered. Videos pass through.
compress_picked = false
"##
}
