//! Format tests
//!
//! Format detection and compact format strings.

mod format_strings;
mod guess;
