//! IDE features - High-level APIs for editor integrations.
//!
//! This module provides the interface between the semantic model (HIR)
//! and an editor host. Each function corresponds to one editor request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No LSP types**: Uses our own types, converted at the editor boundary
//! 3. **Composable**: Built on top of HIR queries
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use protosense::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.set_file_content("file:///ws/a.proto", "message A {}");
//!
//! let analysis = host.analysis();
//! let symbols = analysis.document_symbols("file:///ws/a.proto");
//! ```

mod analysis;
mod code_lens;
mod document_links;
mod references;
mod symbols;

pub use analysis::{Analysis, AnalysisHost};
pub use code_lens::{CodeLens, code_lenses};
pub use document_links::{DocumentLink, document_links};
pub use references::{Reference, find_references, references_to, symbol_at};
pub use symbols::{
    DocumentSymbol, SymbolInfo, WORKSPACE_SYMBOL_LIMIT, document_symbols, fuzzy_score,
    workspace_symbols,
};
