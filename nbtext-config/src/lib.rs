//! Shared configuration loader for the nbtext toolchain.
//!
//! `defaults/nbtext.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`NbTextConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use nbtext_babel::HeaderOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/nbtext.default.toml");

/// Top-level configuration consumed by nbtext applications.
#[derive(Debug, Clone, Deserialize)]
pub struct NbTextConfig {
    pub filters: FiltersConfig,
    pub render: RenderConfig,
}

/// Default metadata filters, used when a notebook does not set its own.
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    pub notebook_metadata: String,
    pub cell_metadata: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub hide_notebook_metadata: bool,
}

impl From<&NbTextConfig> for HeaderOptions {
    fn from(config: &NbTextConfig) -> Self {
        HeaderOptions {
            default_notebook_metadata_filter: config.filters.notebook_metadata.clone(),
            ..HeaderOptions::default()
        }
    }
}

impl From<NbTextConfig> for HeaderOptions {
    fn from(config: NbTextConfig) -> Self {
        HeaderOptions::from(&config)
    }
}

/// Helper for layering user overrides over the built-in defaults.
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
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
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
    pub fn build(self) -> Result<NbTextConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<NbTextConfig, ConfigError> {
    Loader::new().build()
}
