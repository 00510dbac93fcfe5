//! Error types for format and header operations

use thiserror::Error;

/// Errors that can occur while reading or writing text notebook headers
#[derive(Debug, Error)]
pub enum FormatError {
    /// No format registered for this extension / format name
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    /// A format string (`py:percent`, `.pct.py`, ...) could not be understood
    #[error("Invalid format '{format}': {reason}")]
    InvalidFormat { format: String, reason: String },

    /// An encoding pragma declared something other than utf-8
    #[error("Encodings other than utf-8 are not supported (found '{0}')")]
    UnsupportedEncoding(String),

    /// The YAML between the header markers did not parse
    #[error("Invalid YAML header: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// The YAML header parsed, but is not a mapping
    #[error("YAML header must be a mapping, found {0}")]
    HeaderNotMapping(String),

    /// The header was written by an incompatible version of the format
    #[error(
        "File uses format '{format_name}' version {version}, but only versions \
         {min_readable} to {current} can be read"
    )]
    IncompatibleVersion {
        format_name: String,
        version: String,
        min_readable: String,
        current: String,
    },

    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FormatError {
    pub(crate) fn invalid_format(format: impl Into<String>, reason: impl Into<String>) -> Self {
        FormatError::InvalidFormat {
            format: format.into(),
            reason: reason.into(),
        }
    }
}
