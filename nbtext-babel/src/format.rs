//! Format implementation descriptors
//!
//! A [`FormatImplementation`] is the immutable description of one text format
//! variant for one extension: what it is called, how its header lines are
//! commented, and which schema versions it writes and can read back.

use crate::languages::SCRIPT_LANGUAGES;

/// One text format variant for one extension (e.g. `.py` in the `percent` variant)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatImplementation {
    /// Variant name (`light`, `percent`, `markdown`, ...)
    pub format_name: String,
    /// File extension, with leading dot
    pub extension: String,
    /// Comment token placed before each header line; empty for Markdown
    pub header_prefix: String,
    /// Schema version stamped into written headers
    pub current_version_number: String,
    /// Oldest schema version this implementation can still read
    pub min_readable_version_number: Option<String>,
}

impl FormatImplementation {
    pub fn new(
        format_name: &str,
        extension: &str,
        header_prefix: &str,
        current_version_number: &str,
    ) -> Self {
        FormatImplementation {
            format_name: format_name.to_string(),
            extension: extension.to_string(),
            header_prefix: header_prefix.to_string(),
            current_version_number: current_version_number.to_string(),
            min_readable_version_number: None,
        }
    }

    pub fn with_min_readable_version(mut self, version: &str) -> Self {
        self.min_readable_version_number = Some(version.to_string());
        self
    }

    /// Short `ext:name` label, e.g. `py:percent`
    pub fn label(&self) -> String {
        format!(
            "{}:{}",
            self.extension.trim_start_matches('.'),
            self.format_name
        )
    }
}

/// The built-in text formats, in registration order.
///
/// Within an extension the first registered implementation is the default.
pub fn builtin_formats() -> Vec<FormatImplementation> {
    let mut formats = vec![
        FormatImplementation::new("markdown", ".md", "", "1.2").with_min_readable_version("1.0"),
        FormatImplementation::new("markdown", ".markdown", "", "1.2")
            .with_min_readable_version("1.0"),
        FormatImplementation::new("rmarkdown", ".Rmd", "", "1.2").with_min_readable_version("1.0"),
    ];

    for variant in ["light", "nomarker", "percent", "hydrogen"] {
        let (current, min_readable) = match variant {
            "light" => ("1.5", "1.1"),
            "nomarker" => ("1.0", "1.0"),
            _ => ("1.3", "1.1"),
        };
        formats.extend(SCRIPT_LANGUAGES.iter().map(|lang| {
            FormatImplementation::new(variant, lang.extension, lang.comment, current)
                .with_min_readable_version(min_readable)
        }));
    }

    formats.push(
        FormatImplementation::new("sphinx", ".py", "#", "1.1").with_min_readable_version("1.1"),
    );
    for ext in [".R", ".r"] {
        formats.push(
            FormatImplementation::new("spin", ext, "#'", "0.3").with_min_readable_version("0.1"),
        );
    }

    formats
}
