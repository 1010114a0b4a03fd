//! Document links - clickable import paths and type references.

use std::borrow::Cow;
use std::sync::Arc;

use crate::base::Span;
use crate::hir::SemanticAnalyzer;
use crate::syntax::ProtoFile;

/// A document link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// The span of the link in the source file.
    pub range: Span,
    /// The document the link opens.
    pub target_uri: Arc<str>,
    /// Where to reveal in the target; `None` opens the document at the top.
    pub target_range: Option<Span>,
    /// Tooltip text for the link.
    pub tooltip: Cow<'static, str>,
}

/// Get document links for a file.
///
/// Returns clickable links for:
/// 1. Import statements - link to the imported document
/// 2. Type references - link to the definition of the referenced type
pub fn document_links(
    analyzer: &SemanticAnalyzer,
    uri: &str,
    file: &ProtoFile,
) -> Vec<DocumentLink> {
    let mut links = Vec::new();

    for import in &file.imports {
        if let Some(target) = analyzer.resolve_import(&import.path) {
            links.push(DocumentLink {
                range: import.path_span,
                target_uri: target.clone(),
                target_range: None,
                tooltip: Cow::Owned(format!("Open {}", import.path)),
            });
        }
    }

    for resolved in analyzer.resolved_refs(uri) {
        if let Some(target) = resolved.target {
            links.push(DocumentLink {
                range: resolved.type_ref.span,
                target_uri: target.uri.clone(),
                target_range: Some(target.name_range),
                tooltip: Cow::Owned(format!("Go to {}", target.full_name)),
            });
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    #[test]
    fn test_import_and_type_links() {
        let mut analyzer = SemanticAnalyzer::new();
        let common = "package t;\nmessage Id {}\n";
        let main = "package t;\nimport \"lib/common.proto\";\nimport \"missing.proto\";\nmessage User { Id id = 1; }\n";
        analyzer.update_file("file:///ws/lib/common.proto", parse(common, "file:///ws/lib/common.proto"));
        analyzer.update_file("file:///ws/main.proto", parse(main, "file:///ws/main.proto"));

        let file = analyzer.file("file:///ws/main.proto").cloned();
        let Some(file) = file else {
            panic!("main.proto not indexed");
        };
        let links = document_links(&analyzer, "file:///ws/main.proto", &file);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target_uri.as_ref(), "file:///ws/lib/common.proto");
        assert_eq!(links[0].target_range, None);
        assert_eq!(links[1].tooltip, "Go to t.Id");
        assert_eq!(links[1].target_range, Some(Span::from_coords(1, 8, 1, 10)));
    }
}
