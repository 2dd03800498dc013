//! # Configuration
//!
//! Optional TOML configuration for the estimator. Every setting has a
//! built-in default, so running without a config file is normal.
//!
//! ## Precedence
//!
//! Highest first:
//!
//! 1. command-line flags ([`CliOverrides`])
//! 2. environment (`ESTIMATOR_DATA_DIR`, `ESTIMATOR_PRESET`)
//! 3. the config file: `--config`, else `ESTIMATOR_CONFIG`, else
//!    `./estimator.toml` when it exists
//! 4. defaults
//!
//! ## File Format
//!
//! ```toml
//! data_dir = ".estimator"
//! storage_key = "xmas-estimator-v4"
//! default_preset = "Standard"
//! export_dir = "."
//!
//! [company]
//! name = "Bright Nights Lighting"
//! phone = "555-0100"
//!
//! [[presets]]
//! name = "Premium"
//! linear = { base = 16, steep = 20 }
//! count = { bush = 45, smallTree = 45, largeTree = 60, trim = 55, generic = 55 }
//! ```
//!
//! Presets in the file are added to the built-in catalog, replacing a
//! built-in preset of the same name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::Contact;
use crate::presets::{Preset, PresetCatalog, DEFAULT_PRESET};
use crate::store::{validate_key, DEFAULT_STORAGE_KEY};

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "estimator.toml";

pub const ENV_CONFIG: &str = "ESTIMATOR_CONFIG";
pub const ENV_DATA_DIR: &str = "ESTIMATOR_DATA_DIR";
pub const ENV_PRESET: &str = "ESTIMATOR_PRESET";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding the document store
    pub data_dir: PathBuf,
    /// Key the estimate is stored under
    pub storage_key: String,
    /// Preset chosen initially and after a reset
    pub default_preset: String,
    /// Where exports are written unless told otherwise
    pub export_dir: PathBuf,
    /// Copied into the starter template
    pub company: Contact,
    /// Extra or replacement presets
    pub presets: Vec<Preset>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from(".estimator"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_preset: DEFAULT_PRESET.to_string(),
            export_dir: PathBuf::from("."),
            company: Contact::default(),
            presets: Vec::new(),
        }
    }
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub preset: Option<String>,
}

/// The resolved configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// Built-in presets merged with the configured ones
    pub catalog: PresetCatalog,
    pub config_file_used: Option<PathBuf>,
    pub env_keys_used: Vec<&'static str>,
}

/// Parse a config file's contents.
pub fn parse_config(source_name: &str, text: &str) -> EstimateResult<AppConfig> {
    toml::from_str(text).map_err(|e| EstimateError::config_error(source_name, e.to_string()))
}

/// Resolve the configuration.
///
/// `env` looks up environment variables; `cwd` is where `estimator.toml` is
/// searched for when no path is given.
pub fn load_config(
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
    cwd: &Path,
) -> EstimateResult<LoadedConfig> {
    let mut env_keys_used = Vec::new();

    let explicit_path = match &cli.config_path {
        Some(path) => Some(path.clone()),
        None => env(ENV_CONFIG).map(|value| {
            env_keys_used.push(ENV_CONFIG);
            PathBuf::from(value)
        }),
    };

    let config_file = match explicit_path {
        Some(path) => Some(path),
        None => Some(cwd.join(CONFIG_FILE_NAME)).filter(|path| path.is_file()),
    };

    let mut config = match &config_file {
        Some(path) => {
            let source_name = path.display().to_string();
            let text = fs::read_to_string(path).map_err(|e| EstimateError::config_error(&source_name, e.to_string()))?;
            parse_config(&source_name, &text)?
        }
        None => AppConfig::default(),
    };

    if let Some(dir) = env(ENV_DATA_DIR) {
        env_keys_used.push(ENV_DATA_DIR);
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(preset) = env(ENV_PRESET) {
        env_keys_used.push(ENV_PRESET);
        config.default_preset = preset;
    }

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(preset) = &cli.preset {
        config.default_preset = preset.clone();
    }

    let source_name = config_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let catalog = build_catalog(&config, &source_name)?;

    info!(
        config_file_used = ?config_file,
        env_keys_used = ?env_keys_used,
        data_dir = %config.data_dir.display(),
        presets = catalog.len(),
        "estimator configuration loaded"
    );

    Ok(LoadedConfig {
        config,
        catalog,
        config_file_used: config_file,
        env_keys_used,
    })
}

/// Merge configured presets into the built-in catalog and check the
/// settings that depend on it.
fn build_catalog(config: &AppConfig, source_name: &str) -> EstimateResult<PresetCatalog> {
    let to_config_error = |e: EstimateError| EstimateError::config_error(source_name, e.to_string());

    validate_key(&config.storage_key).map_err(to_config_error)?;

    let mut catalog = PresetCatalog::builtin();
    for preset in &config.presets {
        catalog.upsert(preset.clone()).map_err(to_config_error)?;
    }

    if catalog.get(&config.default_preset).is_none() {
        return Err(EstimateError::config_error(
            source_name,
            format!(
                "default_preset '{}' is not one of: {}",
                config.default_preset,
                catalog.names().join(", ")
            ),
        ));
    }

    Ok(catalog)
}
