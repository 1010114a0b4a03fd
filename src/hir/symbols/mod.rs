//! Symbol extraction from AST - pure functions that return symbols.
//!
//! This module provides functions to extract symbols from a parsed
//! [`ProtoFile`](crate::syntax::ProtoFile), producing [`HirSymbol`] values
//! and the unresolved [`TypeRef`]s found alongside them.
//!
//! # Module structure
//!
//! - [`types`] - Public type definitions (HirSymbol, SymbolKind, TypeRef)
//! - [`context`] - ExtractionContext for tracking scope during extraction
//! - [`extract`] - Extraction entry point and per-definition extractors

mod context;
mod extract;
mod types;


pub use types::{FileSymbols, HirSymbol, SymbolKind, TypeRef, TypeRefKind};

pub use extract::extract_symbols;
