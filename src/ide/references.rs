//! Find references and symbol lookup by cursor position.

use std::sync::Arc;

use crate::base::{Position, Span};
use crate::hir::{HirSymbol, ReferenceLocation, SemanticAnalyzer};

/// A location that mentions a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub uri: Arc<str>,
    pub range: Span,
    /// Whether this is the declaration rather than a use.
    pub is_definition: bool,
    /// Whether the location lies in the querying document.
    pub internal: bool,
}

/// The symbol under the cursor: a definition's name, or a type reference
/// that resolved.
pub fn symbol_at<'a>(
    analyzer: &'a SemanticAnalyzer,
    uri: &str,
    position: Position,
) -> Option<&'a HirSymbol> {
    let resolved = analyzer
        .resolved_refs(uri)
        .into_iter()
        .find(|r| r.type_ref.span.contains(position))
        .and_then(|r| r.target);
    if resolved.is_some() {
        return resolved;
    }

    // Innermost definition whose name contains the cursor.
    analyzer
        .symbols_in_file(uri)
        .iter()
        .filter(|s| s.name_range.contains(position))
        .min_by_key(|s| {
            let lines = s.name_range.end.line.saturating_sub(s.name_range.start.line);
            (lines, s.name_range.end.column)
        })
}

/// Every use of the symbol under the cursor, optionally preceded by its
/// declarations.
pub fn find_references(
    analyzer: &SemanticAnalyzer,
    uri: &str,
    position: Position,
    include_declaration: bool,
) -> Vec<Reference> {
    let Some(symbol) = symbol_at(analyzer, uri, position) else {
        return Vec::new();
    };
    references_to(analyzer, &symbol.full_name, uri, include_declaration)
}

/// Every use of `full_name`, tagged relative to `uri`.
pub fn references_to(
    analyzer: &SemanticAnalyzer,
    full_name: &str,
    uri: &str,
    include_declaration: bool,
) -> Vec<Reference> {
    let mut out = Vec::new();
    if include_declaration {
        out.extend(analyzer.definers(full_name).iter().map(|d| Reference {
            uri: d.uri.clone(),
            range: d.name_range,
            is_definition: true,
            internal: d.uri.as_ref() == uri,
        }));
    }
    let result = analyzer.find_references(full_name, uri);
    out.extend(result.references.into_iter().map(|r| Reference {
        uri: r.site.uri,
        range: r.site.range,
        is_definition: false,
        internal: r.location == ReferenceLocation::Internal,
    }));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn analyzer() -> SemanticAnalyzer {
        let mut analyzer = SemanticAnalyzer::new();
        let a = "package t;\nmessage Foo {}\n";
        let b = "package t;\nmessage Bar {\n  Foo foo = 1;\n}\n";
        analyzer.update_file("a.proto", parse(a, "a.proto"));
        analyzer.update_file("b.proto", parse(b, "b.proto"));
        analyzer
    }

    #[test]
    fn test_symbol_at_definition_and_reference() {
        let analyzer = analyzer();
        let def = symbol_at(&analyzer, "a.proto", Position::new(1, 9));
        assert_eq!(def.map(|s| s.full_name.as_ref()), Some("t.Foo"));

        let used = symbol_at(&analyzer, "b.proto", Position::new(2, 3));
        assert_eq!(used.map(|s| s.full_name.as_ref()), Some("t.Foo"));

        assert!(symbol_at(&analyzer, "b.proto", Position::new(0, 0)).is_none());
    }

    #[test]
    fn test_find_references_with_declaration() {
        let analyzer = analyzer();
        let refs = find_references(&analyzer, "a.proto", Position::new(1, 9), true);
        assert_eq!(refs.len(), 2);
        assert!(refs[0].is_definition && refs[0].internal);
        assert_eq!(refs[1].uri.as_ref(), "b.proto");
        assert!(!refs[1].is_definition && !refs[1].internal);

        let without = find_references(&analyzer, "a.proto", Position::new(1, 9), false);
        assert_eq!(without.len(), 1);
    }
}
