//! High-level IR (HIR) - the semantic model of a protobuf workspace.
//!
//! The analyzer owns one entry per indexed document. Every update extracts
//! the document's symbols and type references, registers them in the
//! workspace [`SymbolTable`], resolves references and records them in the
//! reverse [`ReferenceIndex`]. Diagnostics run on top of that model.
//!
//! ## Key Types
//!
//! - [`SemanticAnalyzer`] - Workspace symbol table, resolution and references
//! - [`HirSymbol`] - A definition extracted from the AST
//! - [`TypeRef`] - A type name as written, with the scope it resolves in
//! - [`Resolver`] - Scoped name resolution for one document
//! - [`DiagnosticsEngine`] - Rule-based validation with configurable severity
//!
//! ## Pipeline
//!
//! ```text
//! update_file(uri, ProtoFile)
//!     │
//!     ▼
//! extract_symbols(file)     ← Symbols + type refs (per-file)
//!     │
//!     ▼
//! SymbolTable               ← Workspace-wide definitions
//!     │
//!     ▼
//! Resolver::resolve         ← Scope walk, imports, well-known packages
//!     │
//!     ▼
//! ReferenceIndex            ← Target full name → reference sites
//!     │
//!     ▼
//! DiagnosticsEngine         ← Per-file validation
//! ```

mod analyzer;
mod diagnostics;
mod imports;
mod references;
mod resolve;
mod symbols;

pub use analyzer::{ResolvedRef, SemanticAnalyzer};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticsEngine, DiagnosticsSettings, RelatedInfo, Rule,
    Severity,
};
pub use imports::{WELL_KNOWN_IMPORTS, canonical_import, import_matches};
pub use references::{
    FoundReference, ReferenceIndex, ReferenceLocation, ReferenceResult, ReferenceSite,
};
pub use resolve::{Resolver, SymbolTable, WELL_KNOWN_PACKAGES};
pub use symbols::{FileSymbols, HirSymbol, SymbolKind, TypeRef, TypeRefKind, extract_symbols};
