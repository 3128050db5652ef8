//! Service configuration loader for the ATV toolchain.
//!
//! `defaults/atv.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer an operator file (TOML or
//! YAML) on top of those defaults via [`Loader`] before deserializing into
//! [`ServiceConfig`].

use atv::{Dialect, Version, VersionError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../defaults/atv.default.toml");

pub const BASE_CONFIGURATION_PATH: &str = "input.base_configuration.path";
pub const MERGE_CONFIGURATION_PATH: &str = "input.merge_configuration.path";
pub const HOTFOLDER_PATH: &str = "input.hotfolder.path";
pub const MERGED_CONFIGURATIONS_PATH: &str = "output.merged_configurations.path";
pub const WRITE_ATV: &str = "output.merged_configurations.write_atv";
pub const WRITE_ECS: &str = "output.merged_configurations.write_ecs";
pub const TARGET_VERSION: &str = "migration.target_version";

#[derive(Debug, Error)]
pub enum ServiceConfigError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("setting '{0}' is not set")]
    MissingSetting(&'static str),

    #[error("setting '{key}' is invalid: {source}")]
    InvalidVersion {
        key: &'static str,
        #[source]
        source: VersionError,
    },
}

/// Top-level configuration of the ATV service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub migration: MigrationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub base_configuration: PathConfig,
    pub merge_configuration: PathConfig,
    pub hotfolder: PathConfig,
}

/// A single path setting. An empty path means "not set".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathConfig {
    #[serde(default)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub merged_configurations: MergedConfigurationsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergedConfigurationsConfig {
    #[serde(default)]
    pub path: PathBuf,
    pub write_atv: bool,
    pub write_ecs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    #[serde(default)]
    pub target_version: String,
}

fn resolve(path: &mut PathBuf, dir: &Path) {
    if !path.as_os_str().is_empty() && path.is_relative() {
        *path = dir.join(&*path);
    }
}

fn is_unset(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

impl ServiceConfig {
    /// Make relative paths absolute against `dir`, usually the directory of
    /// the configuration file. Empty paths stay empty.
    pub fn resolve_paths(mut self, dir: &Path) -> Self {
        resolve(&mut self.input.base_configuration.path, dir);
        resolve(&mut self.input.merge_configuration.path, dir);
        resolve(&mut self.input.hotfolder.path, dir);
        resolve(&mut self.output.merged_configurations.path, dir);
        self
    }

    /// Reject empty required settings (base configuration, hotfolder) and an
    /// unparsable target version.
    pub fn validate(&self) -> Result<(), ServiceConfigError> {
        let required = [
            (BASE_CONFIGURATION_PATH, &self.input.base_configuration.path),
            (HOTFOLDER_PATH, &self.input.hotfolder.path),
        ];
        if let Some((key, _)) = required.iter().find(|(_, path)| is_unset(path)) {
            return Err(ServiceConfigError::MissingSetting(*key));
        }
        self.target_version()?;
        Ok(())
    }

    /// Path of the override file, if one is configured
    pub fn merge_configuration_path(&self) -> Option<&Path> {
        let path = self.input.merge_configuration.path.as_path();
        (!is_unset(path)).then_some(path)
    }

    /// Directory merged configurations are written to, if one is configured
    pub fn merged_configurations_path(&self) -> Option<&Path> {
        let path = self.output.merged_configurations.path.as_path();
        (!is_unset(path)).then_some(path)
    }

    /// Dialects merged configurations are written in
    pub fn output_dialects(&self) -> Vec<Dialect> {
        let merged = &self.output.merged_configurations;
        let mut dialects = Vec::new();
        if merged.write_atv {
            dialects.push(Dialect::Atv);
        }
        if merged.write_ecs {
            dialects.push(Dialect::Ecs);
        }
        dialects
    }

    /// The configured migration target, `None` when documents keep their version
    pub fn target_version(&self) -> Result<Option<Version>, ServiceConfigError> {
        let text = self.migration.target_version.trim();
        if text.is_empty() {
            return Ok(None);
        }
        text.parse()
            .map(Some)
            .map_err(|source| ServiceConfigError::InvalidVersion {
                key: TARGET_VERSION,
                source,
            })
    }

    fn log_settings(&self) {
        let merged = &self.output.merged_configurations;
        let paths = [
            (BASE_CONFIGURATION_PATH, &self.input.base_configuration.path),
            (MERGE_CONFIGURATION_PATH, &self.input.merge_configuration.path),
            (HOTFOLDER_PATH, &self.input.hotfolder.path),
            (MERGED_CONFIGURATIONS_PATH, &merged.path),
        ];
        for (key, path) in paths {
            tracing::debug!("Setting '{}': '{}'", key, path.display());
        }
        tracing::debug!("Setting '{}': '{}'", WRITE_ATV, merged.write_atv);
        tracing::debug!("Setting '{}': '{}'", WRITE_ECS, merged.write_ecs);
        tracing::debug!("Setting '{}': '{}'", TARGET_VERSION, self.migration.target_version);
    }
}

fn file_format(path: &Path) -> FileFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        _ => FileFormat::Toml,
    }
}

/// Helper for layering operator files over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    ///
    /// `.yaml`/`.yml` files are read as YAML, everything else as TOML.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let source = File::from(path).format(file_format(path)).required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let source = File::from(path).format(file_format(path)).required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let config: ServiceConfig = self.builder.build()?.try_deserialize()?;
        config.log_settings();
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ServiceConfig, ConfigError> {
    Loader::new().build()
}

/// Load `path` over the defaults, resolve relative paths against the file's
/// directory and validate the result.
pub fn load_service_config(path: impl AsRef<Path>) -> Result<ServiceConfig, ServiceConfigError> {
    let path = path.as_ref();
    tracing::debug!("Loading configuration file '{}'...", path.display());

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = Loader::new().with_file(path).build()?.resolve_paths(dir);
    config.validate()?;
    Ok(config)
}
