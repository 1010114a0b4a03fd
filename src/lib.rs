//! # protosense-base
//!
//! Core library for Protocol Buffers parsing, semantic analysis and editor
//! queries.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → Well-known preloading, workspace loading
//!   ↓
//! ide       → AnalysisHost, symbols, references, code lens, document links
//!   ↓
//! hir       → Symbol table, resolution, reference index, diagnostics
//!   ↓
//! syntax    → Owned AST, direct parser, parser selection
//!   ↓
//! parser    → Logos lexer, rowan lossless tree
//!   ↓
//! base      → Primitives (Position, Span, LineIndex, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → ide → project)
// ============================================================================

/// Foundation types: Position, Span, line/column conversion, constants
pub mod base;

/// Host configuration read from JSON
pub mod config;

/// Lossless parser: Logos lexer, rowan CST, typed tree wrappers
pub mod parser;

/// Syntax: owned AST, direct parser, parser selector
pub mod syntax;

/// Semantic model: symbols, resolution, references, diagnostics
pub mod hir;

/// IDE features: document/workspace symbols, references, code lens, links
pub mod ide;

/// Project management: well-known protos, workspace loading
pub mod project;

// Re-export foundation types
pub use base::{LineCol, LineIndex, Position, Span, TextRange, TextSize};
pub use config::Config;
pub use syntax::{ProtoFile, parse};
