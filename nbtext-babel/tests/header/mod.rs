//! Header tests
//!
//! Reading and writing the YAML header of text notebooks, in Markdown and
//! script formats.

mod read;
mod write;
