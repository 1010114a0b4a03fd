//! Reference-count code lenses above type and service declarations.

use std::sync::Arc;

use crate::base::Span;
use crate::hir::{SemanticAnalyzer, SymbolKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeLens {
    /// Span of the declared name.
    pub range: Span,
    pub full_name: Arc<str>,
    pub kind: SymbolKind,
    pub internal: usize,
    pub external: usize,
    pub title: String,
}

impl CodeLens {
    pub fn total(&self) -> usize {
        self.internal + self.external
    }
}

fn title(internal: usize, external: usize) -> String {
    let total = internal + external;
    let noun = if total == 1 { "reference" } else { "references" };
    if total == 0 {
        format!("0 {noun}")
    } else {
        format!("{total} {noun} ({internal} in this file, {external} external)")
    }
}

/// One lens per message, enum and service in `uri`, nested ones included.
pub fn code_lenses(analyzer: &SemanticAnalyzer, uri: &str) -> Vec<CodeLens> {
    analyzer
        .symbols_in_file(uri)
        .iter()
        .filter(|s| matches!(s.kind, SymbolKind::Message | SymbolKind::Enum | SymbolKind::Service))
        .map(|s| {
            let result = analyzer.find_references(&s.full_name, uri);
            CodeLens {
                range: s.name_range.clamp_within(s.range),
                full_name: s.full_name.clone(),
                kind: s.kind,
                internal: result.internal,
                external: result.external,
                title: title(result.internal, result.external),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    #[test]
    fn test_title() {
        assert_eq!(title(0, 0), "0 references");
        assert_eq!(title(1, 0), "1 reference (1 in this file, 0 external)");
        assert_eq!(title(1, 2), "3 references (1 in this file, 2 external)");
    }

    #[test]
    fn test_lenses_count_internal_and_external() {
        let mut analyzer = SemanticAnalyzer::new();
        let a = "package t;\nmessage Foo { message Inner {} Inner i = 1; }\nservice S {}\n";
        let b = "package t;\nmessage Bar { Foo f = 1; Foo.Inner g = 2; }\n";
        analyzer.update_file("a.proto", parse(a, "a.proto"));
        analyzer.update_file("b.proto", parse(b, "b.proto"));

        let lenses = code_lenses(&analyzer, "a.proto");
        let summary: Vec<(&str, usize, usize)> = lenses
            .iter()
            .map(|l| (l.full_name.as_ref(), l.internal, l.external))
            .collect();
        assert_eq!(
            summary,
            vec![("t.Foo", 0, 1), ("t.Foo.Inner", 1, 1), ("t.S", 0, 0)]
        );
    }
}
