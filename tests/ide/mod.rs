//! IDE layer tests
//!
//! Tests for editor queries:
//! - Document and workspace symbols
//! - Find references and code lenses
//! - Document links

pub mod tests_references;
pub mod tests_symbols;
