//! Import checks: unresolved, non-canonical, unused and circular imports.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{Checker, Node, RelatedInfo, Rule, walk};
use crate::base::Span;
use crate::base::constants::uri_path;
use crate::hir::imports::{WELL_KNOWN_IMPORTS, canonical_import};
use crate::syntax::{ImportModifier, MessageBody, OneofElement, OptionStatement};

pub(super) fn check(cx: &mut Checker<'_>) {
    let flagged = check_canonical(cx);
    check_unresolved(cx, &flagged);
    check_unused(cx);
    check_circular(cx);
}

/// Imports of well-known files through a shortened path. Returns the
/// indices of the flagged imports.
fn check_canonical(cx: &mut Checker<'_>) -> FxHashSet<usize> {
    let mut used: Vec<&'static str> = Vec::new();
    for (type_ref, target) in cx.refs() {
        let name = match target {
            Some(symbol) => symbol.full_name.as_ref(),
            None => type_ref.name.as_ref(),
        };
        if let Some(path) = canonical_import(name) {
            if !used.contains(&path) {
                used.push(path);
            }
        }
    }

    let mut flagged = FxHashSet::default();
    let mut findings = Vec::new();
    for canonical in used {
        if cx.file.imports.iter().any(|i| i.path == canonical) {
            continue;
        }
        for (idx, import) in cx.file.imports.iter().enumerate() {
            let shortened = !import.path.is_empty()
                && canonical
                    .strip_suffix(import.path.as_str())
                    .is_some_and(|prefix| prefix.ends_with('/'));
            if shortened && flagged.insert(idx) {
                findings.push((
                    import.path_span,
                    format!(
                        "Import \"{}\" should be imported via \"{}\"",
                        import.path, canonical
                    ),
                ));
            }
        }
    }

    for (span, message) in findings {
        cx.report(Rule::NonCanonicalImportPath, span, message);
    }
    flagged
}

fn check_unresolved(cx: &mut Checker<'_>, flagged: &FxHashSet<usize>) {
    let findings: Vec<(Span, String)> = cx
        .file
        .imports
        .iter()
        .enumerate()
        .filter(|(idx, import)| {
            !flagged.contains(idx)
                && !import.path.is_empty()
                && !WELL_KNOWN_IMPORTS.contains(&import.path.as_str())
                && cx.analyzer.resolve_import(&import.path).is_none()
        })
        .map(|(_, import)| {
            (
                import.path_span,
                format!("Import \"{}\" could not be resolved", import.path),
            )
        })
        .collect();
    for (span, message) in findings {
        cx.report(Rule::UnresolvedImport, span, message);
    }
}

/// Option names written as `(ext.name)` anywhere in the file.
fn extension_option_names(cx: &Checker<'_>) -> Vec<String> {
    fn push_all<'o>(options: impl Iterator<Item = &'o OptionStatement>, out: &mut Vec<String>) {
        for option in options {
            for part in option.name.parts.iter().filter(|p| p.is_extension) {
                out.push(part.name.trim_start_matches('.').to_string());
            }
        }
    }

    let mut names = Vec::new();
    push_all(cx.file.options.iter(), &mut names);
    walk(cx.file, &mut |node| match node {
        Node::Message(_, m) => {
            push_all(m.options(), &mut names);
            for f in m.fields() {
                push_all(f.options.iter(), &mut names);
            }
            for map in m.map_fields() {
                push_all(map.options.iter(), &mut names);
            }
        }
        Node::Group(_, g) => {
            push_all(g.options.iter(), &mut names);
            push_all(MessageBody::options(g), &mut names);
            for f in g.fields() {
                push_all(f.options.iter(), &mut names);
            }
        }
        Node::Oneof(o) => {
            for member in &o.elements {
                match member {
                    OneofElement::Option(opt) => push_all(std::iter::once(opt), &mut names),
                    OneofElement::Field(f) => push_all(f.options.iter(), &mut names),
                    OneofElement::Group(_) => {}
                }
            }
        }
        Node::Enum(e) => {
            push_all(e.options.iter(), &mut names);
            for v in &e.values {
                push_all(v.options.iter(), &mut names);
            }
        }
        Node::Service(s) => {
            push_all(s.options.iter(), &mut names);
            for rpc in &s.rpcs {
                push_all(rpc.options.iter(), &mut names);
            }
        }
        Node::Extend(x) => {
            for f in &x.fields {
                push_all(f.options.iter(), &mut names);
            }
        }
    });
    names
}

/// Non-public imports nothing in the file refers to.
fn check_unused(cx: &mut Checker<'_>) {
    if !cx.enabled(Rule::UnusedImport) {
        return;
    }

    let used_uris: FxHashSet<&str> = cx
        .refs()
        .filter_map(|(_, target)| target.map(|s| s.uri.as_ref()))
        .collect();
    let option_names = extension_option_names(cx);

    let mut findings = Vec::new();
    for import in &cx.file.imports {
        if import.modifier == Some(ImportModifier::Public) {
            continue;
        }
        let Some(target) = cx.analyzer.resolve_import(&import.path) else {
            continue;
        };
        // A file is used if it or anything it re-exports provides a symbol.
        let mut provided: Vec<Arc<str>> = vec![target.clone()];
        provided.extend(
            cx.analyzer
                .visible_uris(target)
                .into_iter()
                .filter(|u| is_reexported(cx, target, u)),
        );
        let used_by_type = provided.iter().any(|u| used_uris.contains(u.as_ref()));
        let used_by_option = provided.iter().any(|u| {
            cx.analyzer.symbols_in_file(u).iter().any(|s| {
                option_names.iter().any(|name| {
                    s.full_name.as_ref() == name
                        || s.full_name.ends_with(&format!(".{name}"))
                })
            })
        });
        if !used_by_type && !used_by_option {
            findings.push((import.path_span, format!("Import \"{}\" is unused", import.path)));
        }
    }

    for (span, message) in findings {
        cx.report(Rule::UnusedImport, span, message);
    }
}

/// Whether `uri` is reachable from `from` through public imports only.
fn is_reexported(cx: &Checker<'_>, from: &Arc<str>, uri: &Arc<str>) -> bool {
    let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
    let mut queue: VecDeque<Arc<str>> = VecDeque::from([from.clone()]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let Some(file) = cx.analyzer.file(&current) else {
            continue;
        };
        for import in file.imports.iter().filter(|i| i.is_public()) {
            if let Some(next) = cx.analyzer.resolve_import(&import.path) {
                if next == uri {
                    return true;
                }
                queue.push_back(next.clone());
            }
        }
    }
    false
}

/// Report the import edge that closes a cycle. Each cycle is reported once:
/// on the edge whose target is the smallest URI in the cycle.
fn check_circular(cx: &mut Checker<'_>) {
    if !cx.enabled(Rule::CircularImport) {
        return;
    }

    let mut findings = Vec::new();
    for import in &cx.file.imports {
        let Some(target) = cx.analyzer.resolve_import(&import.path) else {
            continue;
        };
        let Some(path) = path_back(cx, target, cx.uri) else {
            continue;
        };
        let smallest = path
            .iter()
            .map(|u| u.as_ref())
            .chain(std::iter::once(cx.uri))
            .min()
            .unwrap_or(cx.uri);
        if smallest != target.as_ref() {
            continue;
        }
        let mut chain: Vec<&str> = vec![uri_path(cx.uri)];
        chain.extend(path.iter().map(|u| uri_path(u)));
        let message = format!("Circular import: {}", chain.join(" -> "));
        findings.push((import.path_span, message, target.clone()));
    }

    for (span, message, target) in findings {
        let related = RelatedInfo {
            uri: target,
            range: Span::default(),
            message: Arc::from("imported file"),
        };
        cx.report_with(Rule::CircularImport, span, message, Some(related));
    }
}

/// Shortest import path from `from` back to `to`, both ends included.
fn path_back(cx: &Checker<'_>, from: &Arc<str>, to: &str) -> Option<Vec<Arc<str>>> {
    if from.as_ref() == to {
        return Some(vec![from.clone()]);
    }
    let mut parent: FxHashMap<Arc<str>, Arc<str>> = FxHashMap::default();
    let mut seen: FxHashSet<Arc<str>> = FxHashSet::from_iter([from.clone()]);
    let mut queue: VecDeque<Arc<str>> = VecDeque::from([from.clone()]);
    while let Some(current) = queue.pop_front() {
        for next in cx.analyzer.imported_uris(&current) {
            if next.as_ref() == to {
                let mut path = vec![next, current.clone()];
                let mut cursor = current;
                while let Some(prev) = parent.get(&cursor) {
                    path.push(prev.clone());
                    cursor = prev.clone();
                }
                path.reverse();
                return Some(path);
            }
            if seen.insert(next.clone()) {
                parent.insert(next.clone(), current.clone());
                queue.push_back(next);
            }
        }
    }
    None
}
