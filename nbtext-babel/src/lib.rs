//! Header and metadata round-trip for text notebooks
//!
//!     A notebook can be stored as a plain text file: a script in one of many
//!     languages, or a Markdown document. This crate handles everything around
//!     the cells of such a file: the YAML header that carries the notebook
//!     metadata, the format variants and how to recognize them, the compact
//!     format strings used to pair files, and the metadata filters and
//!     migrations that keep headers small and stable.
//!
//!     This is a pure lib, that is, it powers nbtext-cli but is shell agnostic:
//!     no code here prints, reads env vars or touches the filesystem.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # FormatError
//!     ├── languages.rs            # Script languages, comment tokens, magics
//!     ├── format.rs               # FormatImplementation and the built-in formats
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── format_spec.rs          # Compact format strings (`ipynb,py:percent`)
//!     ├── guess.rs                # Format detection from header and cell markers
//!     ├── header.rs               # YAML header read / write
//!     ├── notebook.rs             # Minimal notebook model
//!     └── metadata
//!         ├── filter.rs           # Metadata filters (`all,-widgets`)
//!         ├── merge.rs            # Recursive updates
//!         └── migrate.rs          # Legacy metadata shapes
//!
//! Testing
//!     tests
//!     └── <area>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Headers
//!
//!     Reading a header ([`header::header_to_metadata`]) and writing one
//!     ([`header::metadata_to_header`]) are inverse operations: any metadata
//!     written can be read back unchanged, except for the version stamp and
//!     whatever the notebook metadata filter removes. Written YAML always has
//!     sorted keys, so that the same metadata always gives the same text.
//!
//! Formats
//!
//!     Formats are identified by extension and variant name (`py:percent`).
//!     The registry holds every built-in variant; the first one registered for
//!     an extension is its default. Each variant carries a version number,
//!     which is stamped into headers and checked when reading them back.
//!
//! Library Choices
//!
//!     Metadata is kept as serde_json maps, exactly as notebooks store them.
//!     YAML goes through serde_yaml. Errors are thiserror enums, and the crate
//!     reports what it does through tracing, leaving the subscriber to the
//!     binary.
//!
pub mod error;
pub mod format;
pub mod format_spec;
pub mod guess;
pub mod header;
pub mod languages;
pub mod metadata;
pub mod notebook;
pub mod registry;

pub use error::FormatError;
pub use format::FormatImplementation;
pub use format_spec::{
    long_form_multiple_formats, long_form_one_format, short_form_multiple_formats,
    short_form_one_format, FormatDescriptor,
};
pub use guess::{divine_format, format_name_for_ext, guess_format, read_format_from_metadata};
pub use header::{
    check_file_version, header_to_metadata, metadata_to_header, notebook_header, read_header,
    HeaderOptions, HeaderParse, CODEC_VERSION,
};
pub use metadata::{filter_metadata, rearrange_jupytext_metadata, Metadata, MetadataFilter};
pub use notebook::{Cell, Notebook};
pub use registry::FormatRegistry;
