//! Metadata filters
//!
//! A filter is written as a compact comma-separated string: a bare token keeps
//! a key, a `-token` drops it, and `all` / `-all` set the baseline for keys that
//! are not mentioned. `"a,b,-all"` keeps only `a` and `b`; `"all,-c"` keeps
//! everything but `c`.

use super::Metadata;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Default filter for notebook-level metadata
pub const DEFAULT_NOTEBOOK_METADATA_FILTER: &str = "all,-widgets,-varInspector";

/// Default filter for cell-level metadata
pub const DEFAULT_CELL_METADATA_FILTER: &str =
    "all,-autoscroll,-collapsed,-scrolled,-trusted,-ExecuteTime";

/// Either every key, or an explicit list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    All,
    Keys(Vec<String>),
}

impl KeySelection {
    fn contains(&self, key: &str) -> bool {
        match self {
            KeySelection::All => false,
            KeySelection::Keys(keys) => keys.iter().any(|k| k == key),
        }
    }

    fn is_all(&self) -> bool {
        matches!(self, KeySelection::All)
    }

    fn push(slot: &mut Option<KeySelection>, key: &str) {
        match slot {
            Some(KeySelection::All) => {}
            Some(KeySelection::Keys(keys)) => keys.push(key.to_string()),
            None => *slot = Some(KeySelection::Keys(vec![key.to_string()])),
        }
    }

    /// Read the legacy `additional` / `excluded` value (`"all"` or a list of keys)
    fn from_legacy(value: &Value) -> Option<KeySelection> {
        match value {
            Value::String(s) if s == "all" => Some(KeySelection::All),
            Value::String(s) => Some(KeySelection::Keys(vec![s.clone()])),
            Value::Array(items) => {
                if items.iter().any(|item| item.as_str() == Some("all")) {
                    return Some(KeySelection::All);
                }
                Some(KeySelection::Keys(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                ))
            }
            _ => None,
        }
    }
}

/// A parsed metadata filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub additional: Option<KeySelection>,
    pub excluded: Option<KeySelection>,
}

/// Outcome of checking one key against one filter
enum Decision {
    Keep,
    Drop,
    Undecided,
}

impl MetadataFilter {
    /// Filter that keeps everything
    pub fn all() -> Self {
        MetadataFilter {
            additional: Some(KeySelection::All),
            excluded: None,
        }
    }

    /// Filter that drops everything
    pub fn none() -> Self {
        MetadataFilter {
            additional: None,
            excluded: Some(KeySelection::All),
        }
    }

    /// Build a filter from its legacy object form `{additional, excluded}`,
    /// or from a boolean (`true` keeps all, `false` drops all).
    pub fn from_legacy(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Self::all()),
            Value::Bool(false) => Some(Self::none()),
            Value::Object(map) => Some(MetadataFilter {
                additional: map.get("additional").and_then(KeySelection::from_legacy),
                excluded: map.get("excluded").and_then(KeySelection::from_legacy),
            }),
            _ => None,
        }
    }

    fn decide(&self, key: &str) -> Decision {
        let additional = self.additional.as_ref();
        let excluded = self.excluded.as_ref();
        if additional.is_some_and(|s| s.contains(key)) {
            Decision::Keep
        } else if excluded.is_some_and(|s| s.contains(key)) {
            Decision::Drop
        } else if additional.is_some_and(KeySelection::is_all) {
            Decision::Keep
        } else if excluded.is_some_and(KeySelection::is_all) {
            Decision::Drop
        } else {
            Decision::Undecided
        }
    }

    /// Should `key` be kept, given the `fallback` filter for undecided keys?
    pub fn keeps(&self, key: &str, fallback: &MetadataFilter) -> bool {
        match self.decide(key) {
            Decision::Keep => true,
            Decision::Drop => false,
            Decision::Undecided => !matches!(fallback.decide(key), Decision::Drop),
        }
    }
}

impl FromStr for MetadataFilter {
    type Err = std::convert::Infallible;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut filter = MetadataFilter::default();
        for token in spec.split(',').map(str::trim) {
            if let Some(key) = token.strip_prefix('-') {
                let key = key.trim();
                if key == "all" {
                    filter.excluded = Some(KeySelection::All);
                } else if !key.is_empty() {
                    KeySelection::push(&mut filter.excluded, key);
                }
            } else if token == "all" {
                filter.additional = Some(KeySelection::All);
            } else if !token.is_empty() {
                KeySelection::push(&mut filter.additional, token);
            }
        }
        Ok(filter)
    }
}

impl fmt::Display for MetadataFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<String> = Vec::new();
        match &self.additional {
            Some(KeySelection::All) => entries.push("all".to_string()),
            Some(KeySelection::Keys(keys)) => entries.extend(keys.iter().cloned()),
            None => {}
        }
        match &self.excluded {
            Some(KeySelection::All) => entries.push("-all".to_string()),
            Some(KeySelection::Keys(keys)) => entries.extend(keys.iter().map(|k| format!("-{k}"))),
            None => {}
        }
        write!(f, "{}", entries.join(","))
    }
}

/// Parse a compact filter string
pub fn parse_filter(spec: &str) -> MetadataFilter {
    match spec.parse() {
        Ok(filter) => filter,
        Err(never) => match never {},
    }
}

/// Remove from `metadata` the top-level keys that the filters do not keep.
///
/// With no `user_filter`, only `default_filter` applies. Keys the user filter
/// does not decide on fall back to the default filter, and are kept if that
/// does not decide either.
pub fn filter_metadata(metadata: &mut Metadata, user_filter: Option<&str>, default_filter: &str) {
    let default = parse_filter(default_filter);
    let user = user_filter.map(parse_filter).unwrap_or_default();
    metadata.retain(|key, _| user.keeps(key, &default));
}
