//! Migration of historical metadata shapes
//!
//! Older text notebooks stored their settings under different keys and in
//! different shapes. [`rearrange_jupytext_metadata`] rewrites all of them into
//! the current canonical form. Running it on canonical metadata changes nothing.

use super::filter::MetadataFilter;
use super::{Metadata, JUPYTEXT};
use crate::error::FormatError;
use crate::format_spec::{long_form_format_list, short_form_multiple_formats};
use serde_json::{Map, Value};
use tracing::debug;

/// Root-level keys from earlier releases, and where they now live
const RENAMED_ROOT_KEYS: &[(&str, &str)] = &[
    ("nbrmd_formats", "jupytext_formats"),
    ("nbrmd_format_version", "jupytext_format_version"),
];

/// Root-level entries that moved into the `jupytext` section unchanged
const MOVED_ROOT_KEYS: &[&str] = &["main_language", "encoding", "executable"];

const FILTER_LEVELS: &[&str] = &["notebook_metadata_filter", "cell_metadata_filter"];

/// Compact string form of a filter given as a legacy object or boolean
fn metadata_filter_as_string(value: Value) -> Value {
    match MetadataFilter::from_legacy(&value) {
        Some(filter) => Value::String(filter.to_string()),
        None => value,
    }
}

/// Add the leading dot to suffixes written without one (`pct.py` -> `.pct.py`)
fn dot_suffix(token: &str) -> String {
    let token = token.trim();
    let (head, path) = match token.rfind('/') {
        Some(pos) if pos > 0 => token.split_at(pos + 1),
        _ => ("", token),
    };
    let ext_part = path.split(':').next().unwrap_or(path);
    if !path.starts_with('.') && ext_part.rfind('.').is_some_and(|pos| pos > 0) {
        format!("{head}.{path}")
    } else {
        token.to_string()
    }
}

fn formats_tokens(formats: &Value) -> Option<Vec<String>> {
    match formats {
        Value::String(s) => Some(s.split(',').map(dot_suffix).collect()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(dot_suffix)
                .collect(),
        ),
        _ => None,
    }
}

/// Rewrite legacy metadata keys and shapes into the canonical form, in place.
///
/// - `nbrmd_*` / `jupytext_formats` / `jupytext_format_version` root keys move
///   into the `jupytext` section;
/// - root `main_language`, `encoding` and `executable` move into `jupytext`;
/// - a `metadata_filter` object becomes the compact `notebook_metadata_filter`
///   and `cell_metadata_filter` strings;
/// - `formats` gains dotted suffixes and is normalized.
pub fn rearrange_jupytext_metadata(metadata: &mut Metadata) -> Result<(), FormatError> {
    for (old, new) in RENAMED_ROOT_KEYS {
        if let Some(value) = metadata.remove(*old) {
            debug!(from = old, to = new, "renamed legacy metadata key");
            metadata.insert(new.to_string(), value);
        }
    }

    let mut jupytext = match metadata.remove(JUPYTEXT) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    if let Some(formats) = metadata.remove("jupytext_formats") {
        jupytext.insert("formats".to_string(), formats);
    }
    if let Some(version) = metadata.remove("jupytext_format_version") {
        let mut text_representation = Map::new();
        text_representation.insert("format_version".to_string(), version);
        jupytext.insert(
            "text_representation".to_string(),
            Value::Object(text_representation),
        );
    }
    for key in MOVED_ROOT_KEYS {
        if let Some(value) = metadata.remove(*key) {
            debug!(key, "moved root metadata entry into jupytext section");
            jupytext.insert(key.to_string(), value);
        }
    }

    if let Some(Value::Object(mut filters)) = jupytext.remove("metadata_filter") {
        debug!("converting legacy metadata_filter object");
        if let Some(notebook) = filters.remove("notebook") {
            jupytext.insert("notebook_metadata_filter".to_string(), notebook);
        }
        if let Some(cells) = filters.remove("cells") {
            jupytext.insert("cell_metadata_filter".to_string(), cells);
        }
    }
    for level in FILTER_LEVELS {
        if let Some(value) = jupytext.remove(*level) {
            jupytext.insert(level.to_string(), metadata_filter_as_string(value));
        }
    }

    if let Some(tokens) = jupytext.get("formats").and_then(formats_tokens) {
        let formats = long_form_format_list(&tokens, Some(&*metadata))?;
        jupytext.insert(
            "formats".to_string(),
            Value::String(short_form_multiple_formats(&formats)),
        );
    }

    if !jupytext.is_empty() {
        metadata.insert(JUPYTEXT.to_string(), Value::Object(jupytext));
    }
    Ok(())
}
