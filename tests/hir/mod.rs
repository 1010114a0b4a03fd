//! HIR layer tests
//!
//! Tests for the semantic model:
//! - Update idempotence and removal
//! - Name resolution order
//! - Import canonicalization diagnostics

pub mod tests_analyzer;
pub mod tests_diagnostics;
