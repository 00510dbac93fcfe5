//! Notebook metadata dictionaries
//!
//! Metadata is kept as a JSON object, exactly as notebooks store it. The
//! `jupytext` entry holds everything the text formats need to round-trip.

pub mod filter;
pub mod merge;
pub mod migrate;

use serde_json::{Map, Value};

pub use filter::{filter_metadata, KeySelection, MetadataFilter};
pub use merge::Update;
pub use migrate::rearrange_jupytext_metadata;

/// A notebook (or cell) metadata dictionary
pub type Metadata = Map<String, Value>;

/// Key of the text-format section inside notebook metadata
pub const JUPYTEXT: &str = "jupytext";

/// Mutable access to the `jupytext` section, creating it if needed.
///
/// A non-object value under `jupytext` is replaced by an empty section.
pub fn jupytext_section_mut(metadata: &mut Metadata) -> &mut Metadata {
    let entry = metadata
        .entry(JUPYTEXT)
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(map) => map,
        _ => unreachable!("jupytext section was just made an object"),
    }
}

/// Read-only access to the `jupytext` section
pub fn jupytext_section(metadata: &Metadata) -> Option<&Metadata> {
    metadata.get(JUPYTEXT).and_then(Value::as_object)
}

/// A string entry of the `jupytext` section
pub fn jupytext_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    jupytext_section(metadata)?.get(key)?.as_str()
}

/// A string entry of `jupytext.text_representation`
pub fn text_representation_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    jupytext_section(metadata)?
        .get("text_representation")?
        .as_object()?
        .get(key)?
        .as_str()
}
