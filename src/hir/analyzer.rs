//! SemanticAnalyzer - workspace symbol table, resolution and reverse references.
//!
//! Each URI contributes one [`ProtoFile`]. Updating a URI removes everything
//! it contributed before inserting the new contribution, so queries never
//! see stale and fresh entries for the same URI together.
//!
//! Resolution results for a file depend on what other files define and on
//! their public imports. When an update changes either, every file's
//! references are re-resolved; otherwise only the updated file's are.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::imports::{import_matches, import_matches_exactly};
use super::references::{ReferenceIndex, ReferenceResult, ReferenceSite};
use super::resolve::{Resolver, SymbolTable};
use super::symbols::{HirSymbol, TypeRef, extract_symbols};
use crate::syntax::ProtoFile;

/// A type reference together with the symbol it resolved to.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedRef<'a> {
    pub type_ref: &'a TypeRef,
    pub target: Option<&'a HirSymbol>,
}

#[derive(Debug)]
struct FileEntry {
    file: Arc<ProtoFile>,
    symbols: Vec<HirSymbol>,
    type_refs: Vec<TypeRef>,
    /// Resolved target full name for each entry of `type_refs`.
    resolved: Vec<Option<Arc<str>>>,
}

impl FileEntry {
    fn defined_names(&self) -> FxHashSet<&str> {
        self.symbols.iter().map(|s| s.full_name.as_ref()).collect()
    }

    fn public_imports(&self) -> Vec<&str> {
        self.file
            .imports
            .iter()
            .filter(|i| i.is_public())
            .map(|i| i.path.as_str())
            .collect()
    }
}

/// Workspace-wide semantic model.
#[derive(Debug, Default)]
pub struct SemanticAnalyzer {
    files: IndexMap<Arc<str>, FileEntry>,
    table: SymbolTable,
    references: ReferenceIndex,
}

impl SemanticAnalyzer {
    /// Create a new empty analyzer.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // UPDATES
    // ========================================================================

    /// Replace everything `uri` contributes with the contents of `file`.
    pub fn update_file(&mut self, uri: &str, mut file: ProtoFile) {
        file.uri = uri.to_string();
        let old = self.replace(uri, file);

        let needs_full = match (&old, self.files.get(uri)) {
            (Some(old), Some(new)) => {
                old.defined_names() != new.defined_names()
                    || old.public_imports() != new.public_imports()
            }
            _ => true,
        };
        debug!(%uri, full_resolve = needs_full, "updated file");

        if needs_full {
            self.resolve_all();
        } else {
            self.resolve_file(uri);
        }
    }

    /// Apply many updates with a single resolution pass at the end.
    pub fn update_files(&mut self, files: impl IntoIterator<Item = ProtoFile>) {
        let mut count = 0usize;
        for file in files {
            let uri = file.uri.clone();
            self.replace(&uri, file);
            count += 1;
        }
        debug!(count, "batch update");
        self.resolve_all();
    }

    /// Purge `uri` from the workspace.
    pub fn remove_file(&mut self, uri: &str) {
        if self.detach(uri).is_some() {
            debug!(%uri, "removed file");
            self.resolve_all();
        }
    }

    /// Remove a file's symbols and references and return its entry.
    fn detach(&mut self, uri: &str) -> Option<FileEntry> {
        let entry = self.files.shift_remove(uri)?;
        self.table
            .remove_uri(uri, entry.symbols.iter().map(|s| &s.full_name));
        self.references
            .remove_uri(uri, entry.resolved.iter().flatten());
        Some(entry)
    }

    /// Swap in a new contribution for `uri`. A known URI keeps its position
    /// in indexing order; a new one goes last.
    fn replace(&mut self, uri: &str, file: ProtoFile) -> Option<FileEntry> {
        if let Some(entry) = self.files.get(uri) {
            self.table
                .remove_uri(uri, entry.symbols.iter().map(|s| &s.full_name));
            self.references
                .remove_uri(uri, entry.resolved.iter().flatten());
        }

        let extracted = extract_symbols(&file);
        let rank = self.files.get_index_of(uri).unwrap_or(self.files.len());
        let files = &self.files;
        for symbol in &extracted.symbols {
            self.table
                .insert_ranked(symbol.clone(), rank, |other| files.get_index_of(other));
        }
        let resolved = vec![None; extracted.type_refs.len()];
        self.files.insert(
            Arc::from(uri),
            FileEntry {
                file: Arc::new(file),
                symbols: extracted.symbols,
                type_refs: extracted.type_refs,
                resolved,
            },
        )
    }

    fn resolve_all(&mut self) {
        self.references.clear();
        let uris: Vec<Arc<str>> = self.files.keys().cloned().collect();
        for uri in &uris {
            self.resolve_file(uri);
        }
    }

    /// Re-resolve one file's references and refresh its reverse-index entries.
    fn resolve_file(&mut self, uri: &str) {
        let Some(entry) = self.files.get(uri) else {
            return;
        };
        let resolver = self.resolver_for(uri);
        let resolved: Vec<Option<Arc<str>>> = entry
            .type_refs
            .iter()
            .map(|r| {
                let target = resolver
                    .resolve(&r.name, &r.scope, r.kind)
                    .map(|s| s.full_name.clone());
                trace!(%uri, name = %r.name, resolved = ?target, "resolved reference");
                target
            })
            .collect();

        let Some((_, uri_arc, entry)) = self.files.get_full_mut(uri) else {
            return;
        };
        self.references
            .remove_uri(uri, entry.resolved.iter().flatten());
        for (type_ref, target) in entry.type_refs.iter().zip(&resolved) {
            if let Some(target) = target {
                self.references.add(
                    target.clone(),
                    ReferenceSite {
                        uri: uri_arc.clone(),
                        range: type_ref.span,
                        kind: type_ref.kind,
                        source: type_ref.source.clone(),
                    },
                );
            }
        }
        entry.resolved = resolved;
    }

    fn resolver_for(&self, uri: &str) -> Resolver<'_> {
        self.resolver_with(self.visible_uris(uri))
    }

    /// A resolver for `file` as if it were indexed under `uri`, using the
    /// file's own imports.
    pub fn resolver_for_file(&self, uri: &str, file: &ProtoFile) -> Resolver<'_> {
        let direct = file
            .imports
            .iter()
            .filter_map(|i| self.resolve_import(&i.path).cloned())
            .collect();
        self.resolver_with(self.visible_from(uri, direct))
    }

    fn resolver_with(&self, visible: Vec<Arc<str>>) -> Resolver<'_> {
        let imported = visible
            .iter()
            .filter_map(|u| self.files.get(u.as_ref()))
            .map(|e| e.symbols.as_slice())
            .collect();
        Resolver::new(&self.table, imported)
    }

    // ========================================================================
    // IMPORTS
    // ========================================================================

    /// The indexed URI an import path refers to. Exact path matches win over
    /// suffix matches; otherwise the first match in indexing order.
    pub fn resolve_import(&self, import_path: &str) -> Option<&Arc<str>> {
        self.files
            .keys()
            .find(|uri| import_matches_exactly(uri, import_path))
            .or_else(|| self.files.keys().find(|uri| import_matches(uri, import_path)))
    }

    /// URIs directly imported by `uri` that resolve, in import order.
    pub fn imported_uris(&self, uri: &str) -> Vec<Arc<str>> {
        let Some(entry) = self.files.get(uri) else {
            return Vec::new();
        };
        entry
            .file
            .imports
            .iter()
            .filter_map(|i| self.resolve_import(&i.path).cloned())
            .collect()
    }

    /// Direct imports plus everything re-exported through public imports.
    pub fn visible_uris(&self, uri: &str) -> Vec<Arc<str>> {
        self.visible_from(uri, self.imported_uris(uri))
    }

    fn visible_from(&self, uri: &str, direct: Vec<Arc<str>>) -> Vec<Arc<str>> {
        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        let mut out = Vec::new();
        let mut stack = direct;
        stack.reverse();
        while let Some(next) = stack.pop() {
            if next.as_ref() == uri || !seen.insert(next.clone()) {
                continue;
            }
            if let Some(entry) = self.files.get(next.as_ref()) {
                let mut public: Vec<Arc<str>> = entry
                    .public_imports()
                    .into_iter()
                    .filter_map(|p| self.resolve_import(p).cloned())
                    .collect();
                public.reverse();
                stack.extend(public);
            }
            out.push(next);
        }
        out
    }

    /// Every resolved import edge in the workspace.
    pub fn import_graph(&self) -> Vec<(Arc<str>, Arc<str>)> {
        self.files
            .keys()
            .flat_map(|from| {
                self.imported_uris(from)
                    .into_iter()
                    .map(move |to| (from.clone(), to))
            })
            .collect()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// The first definer of a full name.
    pub fn lookup(&self, full_name: &str) -> Option<&HirSymbol> {
        self.table.lookup(full_name.strip_prefix('.').unwrap_or(full_name))
    }

    /// Every definer of a full name, across the workspace.
    pub fn definers(&self, full_name: &str) -> &[HirSymbol] {
        self.table.definers(full_name)
    }

    /// Resolve a type name as if written in `scope` of `uri`.
    pub fn resolve_type(&self, uri: &str, name: &str, scope: &str) -> Option<&HirSymbol> {
        self.resolver_for(uri)
            .resolve(name, scope, super::symbols::TypeRefKind::FieldType)
    }

    pub fn file(&self, uri: &str) -> Option<&Arc<ProtoFile>> {
        self.files.get(uri).map(|e| &e.file)
    }

    /// Indexed URIs in indexing order.
    pub fn files(&self) -> impl Iterator<Item = &Arc<str>> {
        self.files.keys()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn contains_file(&self, uri: &str) -> bool {
        self.files.contains_key(uri)
    }

    pub fn symbols_in_file(&self, uri: &str) -> &[HirSymbol] {
        self.files
            .get(uri)
            .map(|e| e.symbols.as_slice())
            .unwrap_or(&[])
    }

    /// Every symbol of every file, in indexing order.
    pub fn all_symbols(&self) -> impl Iterator<Item = &HirSymbol> {
        self.files.values().flat_map(|e| e.symbols.iter())
    }

    /// Type references of a file with their resolution.
    pub fn resolved_refs(&self, uri: &str) -> Vec<ResolvedRef<'_>> {
        let Some(entry) = self.files.get(uri) else {
            return Vec::new();
        };
        entry
            .type_refs
            .iter()
            .zip(&entry.resolved)
            .map(|(type_ref, target)| ResolvedRef {
                type_ref,
                target: target.as_deref().and_then(|t| self.table.lookup(t)),
            })
            .collect()
    }

    /// Every reference to `full_name`, tagged relative to `querying_uri`.
    pub fn find_references(&self, full_name: &str, querying_uri: &str) -> ReferenceResult {
        let full_name = full_name.strip_prefix('.').unwrap_or(full_name);
        self.references.find(full_name, querying_uri)
    }

    pub fn is_referenced(&self, full_name: &str) -> bool {
        self.references.is_referenced(full_name)
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn analyzer_with(files: &[(&str, &str)]) -> SemanticAnalyzer {
        let mut analyzer = SemanticAnalyzer::new();
        for (uri, text) in files {
            analyzer.update_file(uri, parse(text, uri));
        }
        analyzer
    }

    #[test]
    fn test_update_is_idempotent() {
        let text = "syntax = \"proto3\";\npackage t;\nmessage A { B b = 1; }\nmessage B {}\n";
        let mut analyzer = analyzer_with(&[("a.proto", text)]);
        let symbols_before: Vec<_> = analyzer.all_symbols().cloned().collect();
        let refs_before = analyzer.find_references("t.B", "a.proto");

        analyzer.update_file("a.proto", parse(text, "a.proto"));
        let symbols_after: Vec<_> = analyzer.all_symbols().cloned().collect();
        assert_eq!(symbols_before, symbols_after);
        assert_eq!(refs_before, analyzer.find_references("t.B", "a.proto"));
        assert_eq!(analyzer.definers("t.B").len(), 1);
        assert_eq!(analyzer.reference_count(), 1);
    }

    #[test]
    fn test_reediting_keeps_first_definer() {
        let mut analyzer = analyzer_with(&[
            ("a.proto", "package t;\nmessage Dup {}"),
            ("b.proto", "package t;\nmessage Dup {}"),
        ]);
        assert_eq!(analyzer.lookup("t.Dup").map(|s| &*s.uri), Some("a.proto"));

        analyzer.update_file("a.proto", parse("package t;\n\nmessage Dup {}", "a.proto"));
        analyzer.update_files([parse("package t;\nmessage Dup { }", "a.proto")]);
        assert_eq!(analyzer.lookup("t.Dup").map(|s| &*s.uri), Some("a.proto"));
        let definers: Vec<_> = analyzer.definers("t.Dup").iter().map(|s| &*s.uri).collect();
        assert_eq!(definers, vec!["a.proto", "b.proto"]);
        assert_eq!(analyzer.lookup("t.Dup").map(|s| s.range.start.line), Some(1));

        analyzer.update_file("b.proto", parse("package t;\nmessage Dup {}", "b.proto"));
        assert_eq!(analyzer.lookup("t.Dup").map(|s| &*s.uri), Some("a.proto"));
    }

    #[test]
    fn test_resolution_independent_of_update_order() {
        let user = ("user.proto", "package t;\nmessage User { Address home = 1; }");
        let address = ("address.proto", "package t;\nmessage Address {}");

        let forward = analyzer_with(&[user, address]);
        let backward = analyzer_with(&[address, user]);
        for analyzer in [&forward, &backward] {
            let result = analyzer.find_references("t.Address", "address.proto");
            assert_eq!(result.len(), 1);
            assert_eq!(result.external, 1);
        }
    }

    #[test]
    fn test_remove_file_purges_symbols_and_references() {
        let mut analyzer = analyzer_with(&[
            ("a.proto", "package t;\nmessage Foo {}"),
            ("b.proto", "package t;\nmessage Bar { Foo f = 1; }"),
        ]);
        assert!(analyzer.is_referenced("t.Foo"));

        analyzer.update_file("b.proto", ProtoFile::empty("b.proto"));
        assert!(analyzer.lookup("t.Bar").is_none());
        assert!(!analyzer.is_referenced("t.Foo"));

        analyzer.remove_file("a.proto");
        assert!(analyzer.lookup("t.Foo").is_none());
        assert!(!analyzer.contains_file("a.proto"));
    }

    #[test]
    fn test_removing_definer_unresolves_references() {
        let mut analyzer = analyzer_with(&[
            ("a.proto", "package t;\nmessage Foo {}"),
            ("b.proto", "package t;\nmessage Bar { Foo f = 1; }"),
        ]);
        analyzer.remove_file("a.proto");
        let refs = analyzer.resolved_refs("b.proto");
        assert_eq!(refs.len(), 1);
        assert!(refs[0].target.is_none());
    }

    #[test]
    fn test_public_imports_are_transitive() {
        let analyzer = analyzer_with(&[
            ("file:///ws/base.proto", "package base;\nmessage Core {}"),
            ("file:///ws/reexport.proto", "import public \"base.proto\";"),
            ("file:///ws/mid.proto", "import \"reexport.proto\";"),
            ("file:///ws/app.proto", "import \"mid.proto\";"),
        ]);
        let visible = analyzer.visible_uris("file:///ws/mid.proto");
        assert_eq!(
            visible.iter().map(|u| u.as_ref()).collect::<Vec<_>>(),
            vec!["file:///ws/reexport.proto", "file:///ws/base.proto"]
        );
        // Non-public imports are not re-exported.
        let visible = analyzer.visible_uris("file:///ws/app.proto");
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn test_import_resolution_prefers_exact_path() {
        let analyzer = analyzer_with(&[
            ("file:///ws/vendor/common/types.proto", "package v;"),
            ("common/types.proto", "package c;"),
        ]);
        assert_eq!(
            analyzer.resolve_import("common/types.proto").map(|u| u.as_ref()),
            Some("common/types.proto")
        );
        assert_eq!(
            analyzer.resolve_import("types.proto").map(|u| u.as_ref()),
            Some("file:///ws/vendor/common/types.proto")
        );
        assert!(analyzer.resolve_import("missing.proto").is_none());
    }

    #[test]
    fn test_batch_update_resolves_once() {
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.update_files([
            parse("package t;\nmessage A { B b = 1; }", "a.proto"),
            parse("package t;\nmessage B {}", "b.proto"),
        ]);
        assert_eq!(analyzer.file_count(), 2);
        assert_eq!(analyzer.find_references("t.B", "a.proto").internal, 1);
        assert_eq!(analyzer.import_graph().len(), 0);
    }
}
