//! Metadata tests
//!
//! Filters and migration of legacy metadata.

mod filter;
