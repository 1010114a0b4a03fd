//! AnalysisHost and Analysis - Unified state management for IDE features.
//!
//! The `AnalysisHost` owns all mutable state and provides `Analysis` snapshots
//! for querying. This pattern ensures consistent reads across multiple queries.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//!
//! // Apply file changes
//! host.set_file_content("file:///ws/a.proto", "message A {}");
//!
//! // Get a snapshot for queries
//! let analysis = host.analysis();
//! let diagnostics = analysis.diagnostics("file:///ws/a.proto");
//! let symbols = analysis.document_symbols("file:///ws/a.proto");
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::base::Position;
use crate::config::Config;
use crate::hir::{
    Diagnostic, DiagnosticsEngine, DiagnosticsSettings, HirSymbol, ReferenceResult,
    SemanticAnalyzer,
};
use crate::syntax::{ParserSelector, ProtoFile, SyntaxError, TreeParser};

use super::{
    CodeLens, DocumentLink, DocumentSymbol, Reference, SymbolInfo, code_lenses, document_links,
    document_symbols, find_references, references_to, symbol_at, workspace_symbols,
};

/// Owns all mutable state for the IDE layer.
///
/// Apply changes via `set_file_content()` and `remove_file()`,
/// then get a consistent snapshot via `analysis()`.
#[derive(Debug, Default)]
pub struct AnalysisHost {
    parser: ParserSelector,
    analyzer: SemanticAnalyzer,
    diagnostics: DiagnosticsEngine,
}

impl AnalysisHost {
    /// Create a host with the primary parser and default diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(parser: ParserSelector, diagnostics: DiagnosticsEngine) -> Self {
        Self {
            parser,
            analyzer: SemanticAnalyzer::new(),
            diagnostics,
        }
    }

    /// Build a host from configuration. The tree parser is registered as the
    /// alternate engine; it is only preferred when it initializes.
    pub fn from_config(config: &Config) -> Self {
        let tree = Arc::new(TreeParser::new());
        if config.prefer_tree_parser {
            if let Err(error) = tree.initialize() {
                warn!(%error, "tree parser unavailable; using the primary parser");
            }
        }
        let parser = ParserSelector::default().with_alternate(tree);
        parser.set_prefer_alternate(config.prefer_tree_parser);
        Self::with_parts(parser, DiagnosticsEngine::new(config.diagnostics_settings()))
    }

    /// Parse `text` and replace what `uri` contributes to the workspace.
    ///
    /// Returns the recoverable syntax errors.
    pub fn set_file_content(&mut self, uri: &str, text: &str) -> Vec<SyntaxError> {
        let file = self.parser.parse(text, uri);
        let errors = file.errors.clone();
        self.analyzer.update_file(uri, file);
        errors
    }

    /// Update or add a file with pre-parsed content.
    pub fn set_file(&mut self, file: ProtoFile) {
        let uri = file.uri.clone();
        self.analyzer.update_file(&uri, file);
    }

    /// Add many pre-parsed files with a single resolution pass.
    pub fn set_files(&mut self, files: Vec<ProtoFile>) {
        debug!(count = files.len(), "adding files");
        self.analyzer.update_files(files);
    }

    pub fn remove_file(&mut self, uri: &str) {
        self.analyzer.remove_file(uri);
    }

    pub fn has_file(&self, uri: &str) -> bool {
        self.analyzer.contains_file(uri)
    }

    pub fn file_count(&self) -> usize {
        self.analyzer.file_count()
    }

    pub fn parser(&self) -> &ParserSelector {
        &self.parser
    }

    /// Replace the diagnostics settings; the next validation uses them.
    pub fn update_settings(&self, settings: DiagnosticsSettings) {
        self.diagnostics.update_settings(settings);
    }

    /// Merge a JSON settings object into the diagnostics settings.
    pub fn update_settings_from_value(&self, value: &Value) {
        self.diagnostics.update_settings_from_value(value);
    }

    /// Get a consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis {
            analyzer: &self.analyzer,
            diagnostics: &self.diagnostics,
        }
    }

    pub fn analyzer(&self) -> &SemanticAnalyzer {
        &self.analyzer
    }
}

/// An immutable snapshot of the analysis state.
///
/// All IDE queries go through this struct to ensure consistent results.
#[derive(Clone, Copy)]
pub struct Analysis<'a> {
    analyzer: &'a SemanticAnalyzer,
    diagnostics: &'a DiagnosticsEngine,
}

impl<'a> Analysis<'a> {
    pub fn file(&self, uri: &str) -> Option<&'a Arc<ProtoFile>> {
        self.analyzer.file(uri)
    }

    /// Validate an indexed file.
    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        match self.analyzer.file(uri) {
            Some(file) => self.diagnostics.validate(uri, file, self.analyzer),
            None => Vec::new(),
        }
    }

    /// Validate a file that may differ from the indexed version.
    pub fn validate(&self, uri: &str, file: &ProtoFile) -> Vec<Diagnostic> {
        self.diagnostics.validate(uri, file, self.analyzer)
    }

    pub fn document_symbols(&self, uri: &str) -> Vec<DocumentSymbol> {
        self.analyzer
            .file(uri)
            .map(|file| document_symbols(file))
            .unwrap_or_default()
    }

    pub fn workspace_symbols(&self, query: &str) -> Vec<SymbolInfo> {
        workspace_symbols(self.analyzer, query)
    }

    /// References to a full name, split relative to `uri`.
    pub fn references(&self, full_name: &str, uri: &str) -> ReferenceResult {
        self.analyzer.find_references(full_name, uri)
    }

    /// References to a full name as locations, optionally with declarations.
    pub fn references_to(
        &self,
        full_name: &str,
        uri: &str,
        include_declaration: bool,
    ) -> Vec<Reference> {
        references_to(self.analyzer, full_name, uri, include_declaration)
    }

    /// References to the symbol under the cursor.
    pub fn find_references(
        &self,
        uri: &str,
        position: Position,
        include_declaration: bool,
    ) -> Vec<Reference> {
        find_references(self.analyzer, uri, position, include_declaration)
    }

    pub fn symbol_at(&self, uri: &str, position: Position) -> Option<&'a HirSymbol> {
        symbol_at(self.analyzer, uri, position)
    }

    pub fn code_lenses(&self, uri: &str) -> Vec<CodeLens> {
        code_lenses(self.analyzer, uri)
    }

    pub fn document_links(&self, uri: &str) -> Vec<DocumentLink> {
        match self.analyzer.file(uri) {
            Some(file) => document_links(self.analyzer, uri, file),
            None => Vec::new(),
        }
    }

    pub fn analyzer(&self) -> &'a SemanticAnalyzer {
        self.analyzer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Strategy;
    use serde_json::json;

    #[test]
    fn test_analysis_host_basic() {
        let mut host = AnalysisHost::new();

        let errors = host.set_file_content("test.proto", "syntax = \"proto3\";\nmessage Test {}");
        assert!(errors.is_empty());

        let analysis = host.analysis();
        assert!(analysis.file("test.proto").is_some());
        assert_eq!(analysis.document_symbols("test.proto").len(), 1);
    }

    #[test]
    fn test_file_removal() {
        let mut host = AnalysisHost::new();

        host.set_file_content("test.proto", "message Test {}");
        host.remove_file("test.proto");

        let analysis = host.analysis();
        assert!(analysis.file("test.proto").is_none());
        assert!(analysis.workspace_symbols("Test").is_empty());
    }

    #[test]
    fn test_settings_update_applies_to_next_validation() {
        let mut host = AnalysisHost::new();
        host.set_file_content("file:///ws/a.proto", "syntax = \"proto3\";\nmessage bad_name {}");
        assert_eq!(host.analysis().diagnostics("file:///ws/a.proto").len(), 1);

        host.update_settings_from_value(&json!({ "namingConventions": false }));
        assert!(host.analysis().diagnostics("file:///ws/a.proto").is_empty());
    }

    #[test]
    fn test_from_config_prefers_tree_parser() {
        let config = Config {
            prefer_tree_parser: true,
            ..Config::default()
        };
        let host = AnalysisHost::from_config(&config);
        assert_eq!(host.parser().select(), Strategy::Alternate);

        let host = AnalysisHost::from_config(&Config::default());
        assert_eq!(host.parser().select(), Strategy::Primary);
    }
}
