//! Compact format strings
//!
//! Notebook metadata stores the set of paired formats as a compact string such
//! as `ipynb,py:percent,.pct.py:percent,notebooks//md`. This module converts
//! between that string and a list of [`FormatDescriptor`]s.
//!
//! Token grammar: `[prefix/]extension[:format_name]`, where the extension may
//! carry a suffix (`.pct.py` has suffix `.pct` and extension `.py`).

use crate::error::FormatError;
use crate::languages::extension_for_language;
use crate::metadata::{jupytext_str, Metadata};
use crate::registry::FormatRegistry;
use serde_json::Value;

/// Extensions accepted in format strings that are not text formats
const NON_TEXT_EXTENSIONS: &[&str] = &[".ipynb", ".auto"];

/// One entry of a multi-format specification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatDescriptor {
    /// File extension, always with a leading dot
    pub extension: String,
    /// Optional dot segment placed before the extension (`.pct` in `nb.pct.py`)
    pub suffix: Option<String>,
    /// Optional path prefix (`notebooks/` in `notebooks//ipynb`)
    pub prefix: Option<String>,
    /// Optional variant name
    pub format_name: Option<String>,
}

impl FormatDescriptor {
    pub fn new(extension: &str) -> Self {
        FormatDescriptor {
            extension: extension.to_string(),
            ..Default::default()
        }
    }

    pub fn with_format_name(mut self, name: &str) -> Self {
        self.format_name = Some(name.to_string());
        self
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }
}

fn common_name_to_ext(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "notebook" => Some("ipynb"),
        "rmarkdown" => Some("Rmd"),
        "markdown" => Some("md"),
        "c++" => Some("cpp"),
        _ => None,
    }
}

/// Resolve `.auto` from the notebook language, if known
fn auto_ext_from_metadata(metadata: &Metadata) -> Option<String> {
    let from_language_info = metadata
        .get("language_info")
        .and_then(|info| info.get("file_extension"))
        .and_then(Value::as_str)
        .map(|ext| {
            if ext.starts_with('.') {
                ext.to_string()
            } else {
                format!(".{ext}")
            }
        });
    if from_language_info.is_some() {
        return from_language_info;
    }

    let language = jupytext_str(metadata, "main_language").or_else(|| {
        metadata
            .get("kernelspec")
            .and_then(|k| k.get("language"))
            .and_then(Value::as_str)
    })?;
    extension_for_language(language).map(str::to_string)
}

fn validate_one_format(
    fmt: &FormatDescriptor,
    token: &str,
    registry: &FormatRegistry,
) -> Result<(), FormatError> {
    let known_extension =
        NON_TEXT_EXTENSIONS.contains(&fmt.extension.as_str()) || registry.has(&fmt.extension);
    if !known_extension {
        return Err(FormatError::invalid_format(
            token,
            format!("extension '{}' is not supported", fmt.extension),
        ));
    }
    if let Some(name) = &fmt.format_name {
        if registry.has(&fmt.extension) && registry.get(&fmt.extension, Some(name)).is_err() {
            return Err(FormatError::invalid_format(
                token,
                format!(
                    "format name '{name}' is not one of {:?}",
                    registry.variant_names(&fmt.extension)
                ),
            ));
        }
    }
    Ok(())
}

/// Parse a single compact format token (`py:percent`, `.pct.py`, `notebooks//ipynb`)
pub fn long_form_one_format(
    token: &str,
    metadata: Option<&Metadata>,
) -> Result<FormatDescriptor, FormatError> {
    long_form_one_format_with(token, metadata, FormatRegistry::global())
}

/// As [`long_form_one_format`], validating against a specific registry
pub fn long_form_one_format_with(
    token: &str,
    metadata: Option<&Metadata>,
    registry: &FormatRegistry,
) -> Result<FormatDescriptor, FormatError> {
    let token = token.trim();
    let mut rest = common_name_to_ext(token).unwrap_or(token);
    let mut fmt = FormatDescriptor::default();

    if let Some(pos) = rest.rfind('/').filter(|pos| *pos > 0) {
        fmt.prefix = Some(rest[..pos].to_string());
        rest = &rest[pos + 1..];
    }

    if let Some(pos) = rest.rfind(':') {
        let name = &rest[pos + 1..];
        if !name.is_empty() {
            fmt.format_name = Some(name.to_string());
        }
        rest = &rest[..pos];
    }

    let mut extension = match rest.rfind('.').filter(|pos| *pos > 0) {
        Some(pos) => {
            fmt.suffix = Some(rest[..pos].to_string());
            rest[pos..].to_string()
        }
        None if rest.starts_with('.') => rest.to_string(),
        None => format!(".{rest}"),
    };

    if extension == ".auto" {
        if let Some(resolved) = metadata.and_then(auto_ext_from_metadata) {
            extension = resolved;
        }
    }
    fmt.extension = extension;

    validate_one_format(&fmt, token, registry)?;
    Ok(fmt)
}

/// Parse a compact multi-format string (`ipynb,py:light,md`)
pub fn long_form_multiple_formats(
    formats: &str,
    metadata: Option<&Metadata>,
) -> Result<Vec<FormatDescriptor>, FormatError> {
    let tokens: Vec<&str> = formats.split(',').collect();
    long_form_format_list(&tokens, metadata)
}

/// Parse an already split list of compact format tokens
pub fn long_form_format_list<S: AsRef<str>>(
    tokens: &[S],
    metadata: Option<&Metadata>,
) -> Result<Vec<FormatDescriptor>, FormatError> {
    tokens
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(|t| long_form_one_format(t, metadata))
        .collect()
}

/// Compact form of a single format
pub fn short_form_one_format(fmt: &FormatDescriptor) -> String {
    let mut short = match &fmt.suffix {
        Some(suffix) => format!("{suffix}{}", fmt.extension),
        None => fmt.extension.trim_start_matches('.').to_string(),
    };
    if let Some(prefix) = &fmt.prefix {
        short = format!("{prefix}/{short}");
    }
    if let Some(name) = fmt.format_name.as_deref().filter(|n| !n.is_empty()) {
        let markdown_like = matches!(fmt.extension.as_str(), ".md" | ".markdown" | ".Rmd");
        if !markdown_like {
            short = format!("{short}:{name}");
        }
    }
    short
}

/// Compact form of a list of formats
pub fn short_form_multiple_formats(formats: &[FormatDescriptor]) -> String {
    formats
        .iter()
        .map(short_form_one_format)
        .collect::<Vec<_>>()
        .join(",")
}

/// Do two formats describe the same file path?
pub fn identical_format_path(a: &FormatDescriptor, b: &FormatDescriptor) -> bool {
    a.extension == b.extension && a.suffix == b.suffix && a.prefix == b.prefix
}

/// Update the format name of `new_format` in the `jupytext.formats` metadata,
/// if the notebook is paired with that format's path.
pub fn update_jupytext_formats_metadata(
    metadata: &mut Metadata,
    new_format: &str,
) -> Result<(), FormatError> {
    let new_format = long_form_one_format(new_format, Some(&*metadata))?;
    let Some(current) = jupytext_str(metadata, "formats") else {
        return Ok(());
    };
    let mut formats = long_form_multiple_formats(current, Some(&*metadata))?;
    if formats.is_empty() {
        return Ok(());
    }
    if let Some(fmt) = formats
        .iter_mut()
        .find(|fmt| identical_format_path(fmt, &new_format))
    {
        fmt.format_name = new_format.format_name.clone();
    }
    crate::metadata::jupytext_section_mut(metadata).insert(
        "formats".to_string(),
        Value::String(short_form_multiple_formats(&formats)),
    );
    Ok(())
}
