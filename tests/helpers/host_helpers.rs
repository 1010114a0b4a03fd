//! Helpers for setting up analysis hosts from in-memory sources.

use protosense::hir::SemanticAnalyzer;
use protosense::ide::AnalysisHost;
use protosense::syntax::parse;

/// Creates an AnalysisHost with the given `(uri, source)` pairs, asserting
/// that every source parses cleanly.
pub fn host_from_sources(files: &[(&str, &str)]) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    for (uri, source) in files {
        let errors = host.set_file_content(uri, source);
        assert!(errors.is_empty(), "Parse errors in '{uri}': {errors:?}");
    }
    host
}

/// Creates a SemanticAnalyzer with the given `(uri, source)` pairs.
pub fn analyzer_from_sources(files: &[(&str, &str)]) -> SemanticAnalyzer {
    let mut analyzer = SemanticAnalyzer::new();
    for (uri, source) in files {
        analyzer.update_file(uri, parse(source, uri));
    }
    analyzer
}

/// The resolved target full name of the type reference written as `text`.
pub fn resolved_target(analyzer: &SemanticAnalyzer, uri: &str, text: &str) -> Option<String> {
    analyzer
        .resolved_refs(uri)
        .into_iter()
        .find(|r| r.type_ref.name.as_ref() == text)
        .and_then(|r| r.target)
        .map(|s| s.full_name.to_string())
}
