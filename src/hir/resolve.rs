//! Name resolution - symbol table and scope-aware type lookup.
//!
//! A type name written inside scope `C` (a message or service full name,
//! or the package for top-level constructs) is resolved in this order:
//!
//! 1. a leading `.` means the name is already fully qualified;
//! 2. the nesting chain of `C`, innermost scope first;
//! 3. the package and each of its ancestor prefixes, then the root;
//! 4. definitions in imported files (public imports followed transitively);
//! 5. the well-known type packages.
//!
//! The first match wins. Only symbols the reference can point at are
//! considered (see [`TypeRefKind::accepts`]).

use std::sync::Arc;

use indexmap::IndexMap;

use super::symbols::{HirSymbol, TypeRefKind};

/// Packages searched last for bare well-known type names.
pub const WELL_KNOWN_PACKAGES: &[&str] = &["google.protobuf", "google.type"];

// ============================================================================
// SYMBOL TABLE
// ============================================================================

/// Workspace-wide map from full name to every symbol defining it.
///
/// Definers are kept in indexing order; the first one is the one lookups
/// return. Full names keep their first-insertion position in the map.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    definitions: IndexMap<Arc<str>, Vec<HirSymbol>>,
}

impl SymbolTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: HirSymbol) {
        self.definitions
            .entry(symbol.full_name.clone())
            .or_default()
            .push(symbol);
    }

    /// Insert keeping each name's definers ordered by `rank`, the position
    /// of the defining file in indexing order. `rank_of` maps a URI to its
    /// position.
    pub fn insert_ranked(
        &mut self,
        symbol: HirSymbol,
        rank: usize,
        rank_of: impl Fn(&str) -> Option<usize>,
    ) {
        let definers = self
            .definitions
            .entry(symbol.full_name.clone())
            .or_default();
        let at = definers
            .iter()
            .position(|s| rank_of(&s.uri[..]).is_some_and(|r| r > rank))
            .unwrap_or(definers.len());
        definers.insert(at, symbol);
    }

    /// Drop every definition `uri` contributed under the given names.
    pub fn remove_uri<'a>(&mut self, uri: &str, names: impl IntoIterator<Item = &'a Arc<str>>) {
        for name in names {
            let now_empty = match self.definitions.get_mut(name) {
                Some(definers) => {
                    definers.retain(|s| s.uri.as_ref() != uri);
                    definers.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.definitions.shift_remove(name);
            }
        }
    }

    /// The first definer of `full_name`.
    pub fn lookup(&self, full_name: &str) -> Option<&HirSymbol> {
        self.definitions.get(full_name).and_then(|d| d.first())
    }

    /// Every definer of `full_name`, in indexing order.
    pub fn definers(&self, full_name: &str) -> &[HirSymbol] {
        self.definitions
            .get(full_name)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.definitions.contains_key(full_name)
    }

    /// Number of distinct full names.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The first definer of every full name.
    pub fn iter(&self) -> impl Iterator<Item = &HirSymbol> {
        self.definitions.values().filter_map(|d| d.first())
    }

    fn lookup_accepted(&self, full_name: &str, kind: TypeRefKind) -> Option<&HirSymbol> {
        self.definers(full_name)
            .iter()
            .find(|s| kind.accepts(s.kind))
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolves type names for one file.
pub struct Resolver<'a> {
    table: &'a SymbolTable,
    /// Symbols of the files visible through imports.
    imported: Vec<&'a [HirSymbol]>,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a SymbolTable, imported: Vec<&'a [HirSymbol]>) -> Self {
        Self { table, imported }
    }

    /// Resolve `name` as written in `scope`.
    pub fn resolve(&self, name: &str, scope: &str, kind: TypeRefKind) -> Option<&'a HirSymbol> {
        if name.is_empty() {
            return None;
        }
        if let Some(absolute) = name.strip_prefix('.') {
            return self.table.lookup_accepted(absolute, kind);
        }

        // Nesting chain, then package prefixes, then the root
        let mut prefix = scope;
        loop {
            let candidate = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            };
            if let Some(symbol) = self.table.lookup_accepted(&candidate, kind) {
                return Some(symbol);
            }
            if prefix.is_empty() {
                break;
            }
            prefix = match prefix.rfind('.') {
                Some(idx) => &prefix[..idx],
                None => "",
            };
        }

        if let Some(symbol) = self.resolve_imported(name, kind) {
            return Some(symbol);
        }

        WELL_KNOWN_PACKAGES
            .iter()
            .find_map(|package| self.table.lookup_accepted(&format!("{package}.{name}"), kind))
    }

    /// A definition in an imported file whose full name ends with `name`.
    fn resolve_imported(&self, name: &str, kind: TypeRefKind) -> Option<&'a HirSymbol> {
        let suffix = format!(".{name}");
        self.imported.iter().find_map(|symbols| {
            symbols.iter().find(|s| {
                kind.accepts(s.kind)
                    && (s.full_name.as_ref() == name || s.full_name.ends_with(&suffix))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::symbols::extract_symbols;
    use crate::syntax::parse;

    fn table_from(sources: &[(&str, &str)]) -> (SymbolTable, Vec<Vec<HirSymbol>>) {
        let mut table = SymbolTable::new();
        let mut per_file = Vec::new();
        for (uri, text) in sources {
            let symbols = extract_symbols(&parse(text, uri)).symbols;
            for s in &symbols {
                table.insert(s.clone());
            }
            per_file.push(symbols);
        }
        (table, per_file)
    }

    #[test]
    fn test_nested_scope_wins_over_top_level() {
        let (table, _) = table_from(&[(
            "a.proto",
            "package p;\nmessage Inner {}\nmessage Outer { message Inner {} Inner x = 1; }",
        )]);
        let resolver = Resolver::new(&table, Vec::new());
        let found = resolver
            .resolve("Inner", "p.Outer", TypeRefKind::FieldType)
            .unwrap();
        assert_eq!(found.full_name.as_ref(), "p.Outer.Inner");

        let top = resolver
            .resolve(".p.Inner", "p.Outer", TypeRefKind::FieldType)
            .unwrap();
        assert_eq!(top.full_name.as_ref(), "p.Inner");
    }

    #[test]
    fn test_package_ancestors_and_root() {
        let (table, _) = table_from(&[
            ("a.proto", "package a.b;\nmessage Shared {}"),
            ("r.proto", "message Rooted {}"),
        ]);
        let resolver = Resolver::new(&table, Vec::new());
        assert!(resolver.resolve("b.Shared", "a.c.Msg", TypeRefKind::FieldType).is_some());
        assert!(resolver.resolve("Rooted", "x.y", TypeRefKind::FieldType).is_some());
        assert!(resolver.resolve("Missing", "x.y", TypeRefKind::FieldType).is_none());
    }

    #[test]
    fn test_imported_and_well_known() {
        let (table, per_file) = table_from(&[
            ("dep.proto", "package dep;\nmessage Thing {}"),
            (
                "builtin:///google/protobuf/timestamp.proto",
                "package google.protobuf;\nmessage Timestamp {}",
            ),
        ]);
        let without_import = Resolver::new(&table, Vec::new());
        assert!(without_import.resolve("Thing", "app", TypeRefKind::FieldType).is_none());

        let with_import = Resolver::new(&table, vec![per_file[0].as_slice()]);
        let thing = with_import.resolve("Thing", "app", TypeRefKind::FieldType).unwrap();
        assert_eq!(thing.full_name.as_ref(), "dep.Thing");

        let ts = without_import
            .resolve("Timestamp", "app", TypeRefKind::FieldType)
            .unwrap();
        assert_eq!(ts.full_name.as_ref(), "google.protobuf.Timestamp");
    }

    #[test]
    fn test_kind_filter() {
        let (table, _) = table_from(&[("a.proto", "enum Color { RED = 0; }\nmessage M {}")]);
        let resolver = Resolver::new(&table, Vec::new());
        assert!(resolver.resolve("Color", "", TypeRefKind::FieldType).is_some());
        assert!(resolver.resolve("Color", "", TypeRefKind::Extendee).is_none());
        assert!(resolver.resolve("Color.RED", "", TypeRefKind::FieldType).is_none());
    }

    #[test]
    fn test_remove_uri_keeps_other_definers() {
        let (mut table, per_file) = table_from(&[
            ("one.proto", "message Dup {}"),
            ("two.proto", "message Dup {}"),
        ]);
        assert_eq!(table.definers("Dup").len(), 2);
        assert_eq!(table.lookup("Dup").unwrap().uri.as_ref(), "one.proto");

        let names: Vec<_> = per_file[0].iter().map(|s| s.full_name.clone()).collect();
        table.remove_uri("one.proto", &names);
        assert_eq!(table.lookup("Dup").unwrap().uri.as_ref(), "two.proto");

        table.remove_uri("two.proto", &names);
        assert!(!table.contains("Dup"));
        assert!(table.is_empty());
    }
}
