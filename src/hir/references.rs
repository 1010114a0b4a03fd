//! Reverse-reference index.
//!
//! Maps a symbol's full name to every place a type reference resolved to
//! it, in indexing order.

use std::sync::Arc;

use indexmap::IndexMap;

use super::symbols::TypeRefKind;
use crate::base::Span;

/// One resolved occurrence of a type name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceSite {
    pub uri: Arc<str>,
    pub range: Span,
    pub kind: TypeRefKind,
    /// Full name of the symbol that contains the reference.
    pub source: Arc<str>,
}

/// Whether a reference lies in the querying document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceLocation {
    Internal,
    External,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundReference {
    pub site: ReferenceSite,
    pub location: ReferenceLocation,
}

/// Result of [`SemanticAnalyzer::find_references`](super::SemanticAnalyzer::find_references).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceResult {
    pub full_name: Arc<str>,
    pub references: Vec<FoundReference>,
    pub internal: usize,
    pub external: usize,
}

impl ReferenceResult {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn internal_references(&self) -> impl Iterator<Item = &ReferenceSite> {
        self.references
            .iter()
            .filter(|r| r.location == ReferenceLocation::Internal)
            .map(|r| &r.site)
    }

    pub fn external_references(&self) -> impl Iterator<Item = &ReferenceSite> {
        self.references
            .iter()
            .filter(|r| r.location == ReferenceLocation::External)
            .map(|r| &r.site)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReferenceIndex {
    by_target: IndexMap<Arc<str>, Vec<ReferenceSite>>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: Arc<str>, site: ReferenceSite) {
        self.by_target.entry(target).or_default().push(site);
    }

    /// Remove the sites `uri` recorded under the given targets.
    pub fn remove_uri<'a>(&mut self, uri: &str, targets: impl IntoIterator<Item = &'a Arc<str>>) {
        for target in targets {
            let now_empty = match self.by_target.get_mut(target) {
                Some(sites) => {
                    sites.retain(|s| s.uri.as_ref() != uri);
                    sites.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.by_target.shift_remove(target);
            }
        }
    }

    pub fn clear(&mut self) {
        self.by_target.clear();
    }

    pub fn sites(&self, target: &str) -> &[ReferenceSite] {
        self.by_target
            .get(target)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_referenced(&self, target: &str) -> bool {
        !self.sites(target).is_empty()
    }

    /// Total number of recorded sites.
    pub fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }

    /// Split the sites of `target` into internal and external relative to `uri`.
    pub fn find(&self, target: &str, uri: &str) -> ReferenceResult {
        let mut result = ReferenceResult {
            full_name: Arc::from(target),
            ..ReferenceResult::default()
        };
        for site in self.sites(target) {
            let location = if site.uri.as_ref() == uri {
                result.internal += 1;
                ReferenceLocation::Internal
            } else {
                result.external += 1;
                ReferenceLocation::External
            };
            result.references.push(FoundReference {
                site: site.clone(),
                location,
            });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(uri: &str, line: u32) -> ReferenceSite {
        ReferenceSite {
            uri: Arc::from(uri),
            range: Span::from_coords(line, 2, line, 5),
            kind: TypeRefKind::FieldType,
            source: Arc::from("Src.field"),
        }
    }

    #[test]
    fn test_find_splits_internal_and_external() {
        let mut index = ReferenceIndex::new();
        let target: Arc<str> = Arc::from("t.Foo");
        index.add(target.clone(), site("a.proto", 1));
        index.add(target.clone(), site("b.proto", 2));
        index.add(target.clone(), site("a.proto", 3));

        let result = index.find("t.Foo", "a.proto");
        assert_eq!(result.len(), 3);
        assert_eq!((result.internal, result.external), (2, 1));
        assert_eq!(result.external_references().count(), 1);
        let lines: Vec<u32> = result
            .references
            .iter()
            .map(|r| r.site.range.start.line)
            .collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_uri() {
        let mut index = ReferenceIndex::new();
        let target: Arc<str> = Arc::from("t.Foo");
        index.add(target.clone(), site("a.proto", 1));
        index.add(target.clone(), site("b.proto", 2));

        index.remove_uri("a.proto", [&target]);
        assert_eq!(index.sites("t.Foo").len(), 1);

        index.remove_uri("b.proto", [&target]);
        assert!(!index.is_referenced("t.Foo"));
        assert!(index.is_empty());
    }
}
