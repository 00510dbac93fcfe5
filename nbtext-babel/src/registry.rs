//! Format registry for format discovery and selection
//!
//! This module provides a centralized registry of text format implementations,
//! keyed by extension. Several variants may share an extension (`.py` has
//! `light`, `percent`, `hydrogen`, ...); the first one registered is the default.

use crate::error::FormatError;
use crate::format::{builtin_formats, FormatImplementation};
use once_cell::sync::Lazy;

static DEFAULT_REGISTRY: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::with_defaults);

/// Registry of text format implementations
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let fmt = registry.get(".py", Some("percent"))?;
/// assert_eq!(fmt.header_prefix, "#");
/// ```
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<FormatImplementation>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: Vec::new(),
        }
    }

    /// The process-wide registry holding the built-in formats
    pub fn global() -> &'static FormatRegistry {
        &DEFAULT_REGISTRY
    }

    /// Register a format
    ///
    /// If a format with the same extension and name already exists, it is replaced
    /// in place (so the extension's default does not change).
    pub fn register(&mut self, format: FormatImplementation) {
        match self.formats.iter_mut().find(|f| {
            f.extension == format.extension && f.format_name == format.format_name
        }) {
            Some(existing) => *existing = format,
            None => self.formats.push(format),
        }
    }

    /// Get a format implementation by extension and optional variant name.
    ///
    /// Without a name, the default variant for the extension is returned.
    pub fn get(
        &self,
        extension: &str,
        format_name: Option<&str>,
    ) -> Result<&FormatImplementation, FormatError> {
        let mut candidates = self.formats.iter().filter(|f| f.extension == extension);
        let found = match format_name {
            Some(name) => candidates.find(|f| f.format_name == name),
            None => candidates.next(),
        };
        found.ok_or_else(|| {
            FormatError::FormatNotFound(match format_name {
                Some(name) => format!("{}:{name}", extension.trim_start_matches('.')),
                None => extension.to_string(),
            })
        })
    }

    /// Check if any format handles this extension
    pub fn has(&self, extension: &str) -> bool {
        self.formats.iter().any(|f| f.extension == extension)
    }

    /// Variant names registered for an extension, default first
    pub fn variant_names(&self, extension: &str) -> Vec<&str> {
        self.formats
            .iter()
            .filter(|f| f.extension == extension)
            .map(|f| f.format_name.as_str())
            .collect()
    }

    /// Distinct header prefixes in use for an extension (`.R` has `#` and `#'`)
    pub fn header_prefixes(&self, extension: &str) -> Vec<&str> {
        let mut prefixes: Vec<&str> = Vec::new();
        for f in self.formats.iter().filter(|f| f.extension == extension) {
            if !prefixes.contains(&f.header_prefix.as_str()) {
                prefixes.push(&f.header_prefix);
            }
        }
        prefixes
    }

    /// All registered extensions, in registration order
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = Vec::new();
        for f in &self.formats {
            if !extensions.contains(&f.extension.as_str()) {
                extensions.push(&f.extension);
            }
        }
        extensions
    }

    /// List all formats as sorted `ext:name` labels
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.iter().map(|f| f.label()).collect();
        names.sort();
        names
    }

    /// Detect the registered extension of a filename
    ///
    /// Returns the extension (with leading dot) if a format handles it, or None otherwise.
    pub fn detect_extension_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;
        let extension = format!(".{extension}");
        self.has(&extension).then_some(extension)
    }

    /// Create a registry with the built-in formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for format in builtin_formats() {
            registry.register(format);
        }
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
