//! Extraction context - tracks the URI and the current scope during extraction.

use std::sync::Arc;

use super::types::{FileSymbols, HirSymbol, SymbolKind, TypeRef, TypeRefKind};
use crate::base::Span;

/// Extraction state passed through all extraction functions.
pub(super) struct ExtractionContext {
    pub uri: Arc<str>,
    /// Current scope full name; starts as the package.
    pub prefix: String,
    /// Stack of scope segments pushed below the package.
    pub scope_stack: Vec<String>,
    pub out: FileSymbols,
}

impl ExtractionContext {
    pub fn new(uri: &str, package: &str) -> Self {
        Self {
            uri: Arc::from(uri),
            prefix: package.to_string(),
            scope_stack: Vec::new(),
            out: FileSymbols::default(),
        }
    }

    pub fn qualified_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    pub fn scope(&self) -> Arc<str> {
        Arc::from(self.prefix.as_str())
    }

    /// The enclosing symbol, if any. The package itself is not a symbol.
    pub fn container(&self) -> Option<Arc<str>> {
        if self.scope_stack.is_empty() {
            None
        } else {
            Some(self.scope())
        }
    }

    pub fn push_scope(&mut self, name: &str) {
        self.scope_stack.push(name.to_string());
        self.prefix = self.qualified_name(name);
    }

    pub fn pop_scope(&mut self) {
        if let Some(popped) = self.scope_stack.pop() {
            // Remove the segment plus its joining dot, if any
            let suffix_len = if self.prefix.len() > popped.len() {
                popped.len() + 1
            } else {
                popped.len()
            };
            self.prefix
                .truncate(self.prefix.len().saturating_sub(suffix_len));
        }
    }

    /// Register a symbol in the current scope and return its full name.
    #[allow(clippy::too_many_arguments)]
    pub fn add_symbol(
        &mut self,
        name: &str,
        kind: SymbolKind,
        range: Span,
        name_range: Span,
        doc: Option<&str>,
        detail: Option<String>,
        deprecated: bool,
    ) -> Arc<str> {
        let full_name: Arc<str> = Arc::from(self.qualified_name(name));
        self.out.symbols.push(HirSymbol {
            name: Arc::from(name),
            full_name: full_name.clone(),
            container: self.container(),
            kind,
            uri: self.uri.clone(),
            range,
            name_range,
            doc: doc.map(Arc::from),
            detail: detail.map(Arc::from),
            deprecated,
        });
        full_name
    }

    /// Record a type name written in the current scope.
    pub fn add_type_ref(&mut self, name: &str, span: Span, kind: TypeRefKind, source: &Arc<str>) {
        self.out.type_refs.push(TypeRef {
            name: Arc::from(name),
            span,
            scope: self.scope(),
            kind,
            source: source.clone(),
        });
    }
}
