//! Minimal notebook document model
//!
//! Only what the header code needs: the metadata mapping and the cell sources.

use crate::metadata::{filter_metadata, jupytext_str, Metadata};
use serde::{Deserialize, Deserializer, Serialize};

/// A notebook document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,
    #[serde(default = "default_nbformat_minor")]
    pub nbformat_minor: u32,
}

fn default_nbformat() -> u32 {
    4
}

fn default_nbformat_minor() -> u32 {
    5
}

/// One notebook cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: String,
    #[serde(deserialize_with = "multiline_source")]
    pub source: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Other cell fields (`outputs`, `execution_count`, `id`), passed through
    #[serde(flatten)]
    pub extra: Metadata,
}

/// Notebook files store sources either as one string or as a list of lines
fn multiline_source<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Source {
        Text(String),
        Lines(Vec<String>),
    }

    Ok(match Source::deserialize(deserializer)? {
        Source::Text(text) => text,
        Source::Lines(lines) => lines.concat(),
    })
}

impl Notebook {
    pub fn new(metadata: Metadata) -> Self {
        Notebook {
            cells: Vec::new(),
            metadata,
            nbformat: default_nbformat(),
            nbformat_minor: default_nbformat_minor(),
        }
    }

    pub fn with_cells(mut self, cells: Vec<Cell>) -> Self {
        self.cells = cells;
        self
    }

    /// Apply the cell metadata filter to every cell.
    ///
    /// The notebook's own `jupytext.cell_metadata_filter` takes precedence over
    /// `default_filter`.
    pub fn filter_cell_metadata(&mut self, default_filter: &str) {
        let user_filter = jupytext_str(&self.metadata, "cell_metadata_filter").map(str::to_string);
        for cell in &mut self.cells {
            filter_metadata(&mut cell.metadata, user_filter.as_deref(), default_filter);
        }
    }
}

impl Cell {
    pub fn code(source: &str) -> Self {
        Cell {
            cell_type: "code".to_string(),
            source: source.to_string(),
            metadata: Metadata::new(),
            extra: Metadata::new(),
        }
    }

    pub fn markdown(source: &str) -> Self {
        Cell {
            cell_type: "markdown".to_string(),
            source: source.to_string(),
            metadata: Metadata::new(),
            extra: Metadata::new(),
        }
    }
}
