//! Text notebook headers
//!
//!     A text notebook starts with an optional header, in this order:
//!
//!     - a shebang line (`#!/usr/bin/env python`), kept as `jupytext.executable`
//!     - an encoding pragma (`# -*- coding: utf-8 -*-`), kept as `jupytext.encoding`
//!     - a YAML block between two `---` lines, each line commented with the
//!       format's header prefix. In Markdown the block can be wrapped in an
//!       HTML comment (`<!--` ... `-->`) to hide it from renderers.
//!
//!     The notebook metadata lives under the `jupyter` key of the YAML block.
//!     Other top-level YAML keys (a document title, for instance) are preserved
//!     as `jupytext.root_level_metadata` and written back at the YAML root.
//!
//!     [`header_to_metadata`] and [`metadata_to_header`] are inverse to each
//!     other, up to the version stamp and the keys removed by the notebook
//!     metadata filter.

use crate::error::FormatError;
use crate::format::FormatImplementation;
use crate::guess::format_name_for_ext;
use crate::languages::{comment_for_extension, comment_lines, uncomment_line};
use crate::metadata::filter::{filter_metadata, DEFAULT_NOTEBOOK_METADATA_FILTER};
use crate::metadata::merge::recursive_update;
use crate::metadata::{
    jupytext_section_mut, jupytext_str, rearrange_jupytext_metadata, text_representation_str,
    Metadata, JUPYTEXT,
};
use crate::notebook::Notebook;
use crate::registry::FormatRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

/// Version of this codec, stamped into `text_representation.jupytext_version`
pub const CODEC_VERSION: &str = env!("CARGO_PKG_VERSION");

const UTF8_HEADER: &str = " -*- coding: utf-8 -*-";

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^---\s*$").expect("valid header regex"));
static BLANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").expect("valid blank regex"));

/// Settings for writing headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Stamp `jupytext.text_representation` (format name and versions) into headers,
    /// and check the stamped version on read. Off only for reproducible test output.
    pub insert_version_number: bool,
    /// Notebook metadata filter used when the notebook does not set one
    pub default_notebook_metadata_filter: String,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        HeaderOptions {
            insert_version_number: true,
            default_notebook_metadata_filter: DEFAULT_NOTEBOOK_METADATA_FILTER.to_string(),
        }
    }
}

impl HeaderOptions {
    /// Options that leave out the version stamp
    pub fn without_version_number(mut self) -> Self {
        self.insert_version_number = false;
        self
    }
}

/// Result of reading a header
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderParse {
    /// Metadata found in the header (empty if there is none)
    pub metadata: Metadata,
    /// Whether the YAML block had a `jupyter` section
    pub jupyter_found: bool,
    /// Index of the first line after the header
    pub next_line: usize,
}

fn encoding_regex(comment: &str) -> Regex {
    let pattern = format!(
        r"^[ \t\f]*{}.*?coding[:=][ \t]*([-_.a-zA-Z0-9]+)",
        regex::escape(comment)
    );
    Regex::new(&pattern).expect("escaped comment makes a valid regex")
}

fn is_utf8(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8")
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Read the header at the top of `lines`.
///
/// `header_prefix` is the comment token each header line starts with (empty
/// for Markdown). When no complete `---` block is found, the returned metadata
/// holds only what the shebang and encoding lines gave, and `next_line` points
/// after those lines.
pub fn header_to_metadata<S: AsRef<str>>(
    lines: &[S],
    header_prefix: &str,
) -> Result<HeaderParse, FormatError> {
    let comment = if header_prefix == "#'" { "#" } else { header_prefix };
    let encoding_re = (!comment.is_empty()).then(|| encoding_regex(comment));
    let encoding_of = |line: &str| -> Option<String> {
        let captures = encoding_re.as_ref()?.captures(line)?;
        Some(captures[1].to_string())
    };
    let first_line_is_encoding = lines
        .first()
        .is_some_and(|line| encoding_of(line.as_ref()).is_some());

    let mut metadata = Metadata::new();
    let mut header: Vec<&str> = Vec::new();
    let mut in_html_div = false;
    let mut started = false;
    let mut ended = false;
    let mut start = 0;
    let mut last = 0;

    for (i, line) in lines.iter().map(AsRef::as_ref).enumerate() {
        last = i;
        if i == 0 && line.starts_with("#!") {
            jupytext_section_mut(&mut metadata)
                .insert("executable".to_string(), Value::String(line[2..].to_string()));
            start = i + 1;
            continue;
        }
        if i == 0 || (i == 1 && !first_line_is_encoding) {
            if let Some(encoding) = encoding_of(line) {
                if !is_utf8(&encoding) {
                    return Err(FormatError::UnsupportedEncoding(encoding));
                }
                jupytext_section_mut(&mut metadata)
                    .insert("encoding".to_string(), Value::String(line.to_string()));
                start = i + 1;
                continue;
            }
        }
        if !line.starts_with(header_prefix) {
            break;
        }
        if comment.is_empty() && !started && line.trim() == "<!--" {
            in_html_div = true;
            continue;
        }
        if in_html_div && ended {
            if line.contains("-->") {
                break;
            }
            continue;
        }

        let line = uncomment_line(line, header_prefix);
        if HEADER_RE.is_match(line) {
            if !started {
                started = true;
                continue;
            }
            ended = true;
            if in_html_div {
                continue;
            }
            break;
        }
        if !started {
            if line.trim().is_empty() {
                continue;
            }
            // something else than a YAML header
            break;
        }
        trace!(line, "header line");
        header.push(line);
    }

    if !ended {
        return Ok(HeaderParse {
            metadata,
            jupyter_found: false,
            next_line: start,
        });
    }

    // keep the document's final newline, block scalars with `|+` depend on it
    let mut yaml = header.join("\n");
    yaml.push('\n');
    let parsed: Value = if yaml.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(&yaml)?
    };
    let mut root_level_metadata = match parsed {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            // two thematic breaks around some prose, not a YAML header
            debug!(kind = value_kind(&other), "ignoring a header that is not a mapping");
            return Ok(HeaderParse {
                metadata,
                jupyter_found: false,
                next_line: start,
            });
        }
    };

    let mut jupyter_found = false;
    if let Some(jupyter) = root_level_metadata.remove("jupyter") {
        jupyter_found = true;
        match jupyter {
            Value::Object(update) => recursive_update(&mut metadata, update),
            Value::Null => {}
            other => {
                return Err(FormatError::HeaderNotMapping(format!(
                    "{} under 'jupyter'",
                    value_kind(&other)
                )))
            }
        }
    }

    let mut next_line = last + 1;
    if lines
        .get(next_line)
        .is_some_and(|line| BLANK_RE.is_match(uncomment_line(line.as_ref(), header_prefix)))
    {
        next_line += 1;
    }

    if !root_level_metadata.is_empty() {
        jupytext_section_mut(&mut metadata).insert(
            "root_level_metadata".to_string(),
            Value::Object(root_level_metadata),
        );
    }

    debug!(next_line, jupyter_found, "read text notebook header");
    Ok(HeaderParse {
        metadata,
        jupyter_found,
        next_line,
    })
}

/// Stamp the text representation, drop an empty `jupytext` section, and apply
/// the notebook metadata filter.
fn insert_jupytext_info_and_filter_metadata(
    metadata: &mut Metadata,
    fmt: &FormatImplementation,
    ext: &str,
    options: &HeaderOptions,
) {
    if options.insert_version_number {
        jupytext_section_mut(metadata).insert(
            "text_representation".to_string(),
            json!({
                "extension": ext,
                "format_name": fmt.format_name,
                "format_version": fmt.current_version_number,
                "jupytext_version": CODEC_VERSION,
            }),
        );
    }

    if metadata
        .get(JUPYTEXT)
        .is_some_and(|j| j.as_object().map_or(true, Map::is_empty))
    {
        metadata.remove(JUPYTEXT);
    }

    let user_filter = jupytext_str(metadata, "notebook_metadata_filter").map(str::to_string);
    filter_metadata(
        metadata,
        user_filter.as_deref(),
        &options.default_notebook_metadata_filter,
    );
}

/// Deterministic YAML value: mappings are written with sorted keys
fn to_yaml_value(value: &Value) -> serde_yaml::Value {
    use serde_yaml::Value as Yaml;
    match value {
        Value::Null => Yaml::Null,
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Yaml::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Yaml::Number(u.into())
            } else {
                n.as_f64().map_or(Yaml::Null, |f| Yaml::Number(f.into()))
            }
        }
        Value::String(s) => Yaml::String(s.clone()),
        Value::Array(items) => Yaml::Sequence(items.iter().map(to_yaml_value).collect()),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut mapping = serde_yaml::Mapping::new();
            for key in keys {
                mapping.insert(Yaml::String(key.clone()), to_yaml_value(&map[key]));
            }
            Yaml::Mapping(mapping)
        }
    }
}

/// Lines of the header that represents `metadata` in format `fmt`.
///
/// `metadata` is not modified. Returns no lines at all when nothing is left to
/// write after filtering.
pub fn metadata_to_header(
    metadata: &Metadata,
    fmt: &FormatImplementation,
    ext: &str,
    options: &HeaderOptions,
) -> Result<Vec<String>, FormatError> {
    let mut metadata = metadata.clone();
    let mut root = match metadata
        .get_mut(JUPYTEXT)
        .and_then(Value::as_object_mut)
        .and_then(|jupytext| jupytext.remove("root_level_metadata"))
    {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    insert_jupytext_info_and_filter_metadata(&mut metadata, fmt, ext, options);

    let hide_notebook_metadata = metadata
        .get(JUPYTEXT)
        .and_then(|j| j.get("hide_notebook_metadata"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !metadata.is_empty() {
        root.insert("jupyter".to_string(), Value::Object(metadata));
    }
    if root.is_empty() {
        return Ok(Vec::new());
    }

    let yaml = serde_yaml::to_string(&to_yaml_value(&Value::Object(root)))
        .map_err(|e| FormatError::SerializationError(e.to_string()))?;

    let mut header = vec!["---".to_string()];
    header.extend(yaml.lines().map(str::to_string));
    header.push("---".to_string());

    if hide_notebook_metadata && fmt.format_name == "markdown" {
        let mut wrapped = vec!["<!--".to_string(), String::new()];
        wrapped.append(&mut header);
        wrapped.extend(["".to_string(), "-->".to_string()]);
        header = wrapped;
    }

    Ok(comment_lines(&header, &fmt.header_prefix))
}

/// Shebang and encoding lines for `notebook` written as a script with extension `ext`.
///
/// The `executable` and `encoding` entries are taken out of `metadata`, so that
/// they do not appear again in the YAML header. A notebook with non-ASCII
/// sources and no declared encoding gets a utf-8 pragma.
pub fn encoding_and_executable(
    notebook: &Notebook,
    metadata: &mut Metadata,
    ext: &str,
) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(comment) = comment_for_extension(ext) else {
        return lines;
    };

    let mut jupytext = metadata.get_mut(JUPYTEXT).and_then(Value::as_object_mut);

    if let Some(executable) = jupytext.as_mut().and_then(|j| j.remove("executable")) {
        lines.push(format!("#!{}", executable.as_str().unwrap_or_default()));
    }

    match jupytext.as_mut().and_then(|j| j.remove("encoding")) {
        Some(encoding) => lines.push(encoding.as_str().unwrap_or_default().to_string()),
        None => {
            if notebook.cells.iter().any(|cell| !cell.source.is_ascii()) {
                lines.push(format!("{comment}{UTF8_HEADER}"));
            }
        }
    }

    lines
}

/// Every header line for `notebook`: shebang, encoding, then the YAML block.
pub fn notebook_header(
    notebook: &Notebook,
    fmt: &FormatImplementation,
    ext: &str,
    options: &HeaderOptions,
) -> Result<Vec<String>, FormatError> {
    let mut metadata = notebook.metadata.clone();
    let mut lines = encoding_and_executable(notebook, &mut metadata, ext);
    lines.extend(metadata_to_header(&metadata, fmt, ext, options)?);
    Ok(lines)
}

/// Read the header of `text` in format `fmt`, and bring its metadata to the
/// canonical shape.
pub fn read_header(text: &str, fmt: &FormatImplementation) -> Result<HeaderParse, FormatError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut parse = header_to_metadata(&lines, &fmt.header_prefix)?;
    rearrange_jupytext_metadata(&mut parse.metadata)?;
    Ok(parse)
}

fn version_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(0))
        .collect()
}

/// Check that a header read from a file with extension `ext` was written in a
/// format version this codec can read.
pub fn check_file_version(
    metadata: &Metadata,
    ext: &str,
    registry: &FormatRegistry,
    options: &HeaderOptions,
) -> Result<(), FormatError> {
    if !options.insert_version_number || ext.ends_with(".ipynb") {
        return Ok(());
    }

    let format_name = format_name_for_ext(metadata, ext, registry)?;
    let fmt = registry.get(ext, format_name.as_deref())?;
    let current = fmt.current_version_number.as_str();
    let version = match text_representation_str(metadata, "format_version") {
        Some(version) => version,
        None if !metadata.is_empty() => current,
        None => return Ok(()),
    };
    if version == current {
        return Ok(());
    }

    let min_readable = fmt
        .min_readable_version_number
        .as_deref()
        .unwrap_or(current);
    let key = version_key(version);
    if version_key(min_readable) <= key && key <= version_key(current) {
        return Ok(());
    }

    Err(FormatError::IncompatibleVersion {
        format_name: fmt.format_name.clone(),
        version: version.to_string(),
        min_readable: min_readable.to_string(),
        current: current.to_string(),
    })
}
