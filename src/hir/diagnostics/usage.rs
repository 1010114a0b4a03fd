//! Discouraged constructs, deprecated references, unused symbols and
//! missing documentation.

use super::{Checker, Node, Rule, walk};
use crate::base::Span;
use crate::hir::symbols::SymbolKind;
use crate::syntax::{FieldDefinition, FieldLabel, GroupDefinition, ImportModifier, MessageBody};

pub(super) fn check(cx: &mut Checker<'_>) {
    discouraged(cx);
    deprecated(cx);
    unused(cx);
    documentation(cx);
}

fn required_field(field: &FieldDefinition, out: &mut Vec<(Span, String)>) {
    if field.label == Some(FieldLabel::Required) {
        out.push((
            field.label_span.unwrap_or(field.name_span),
            format!("Field \"{}\" uses \"required\", which is discouraged", field.name),
        ));
    }
}

fn group(group: &GroupDefinition, out: &mut Vec<(Span, String)>) {
    out.push((
        group.name_span,
        format!("Group \"{}\" is deprecated; use a nested message instead", group.name),
    ));
}

fn discouraged(cx: &mut Checker<'_>) {
    if !cx.enabled(Rule::DiscouragedConstructs) {
        return;
    }

    let mut findings: Vec<(Span, String)> = Vec::new();
    let file = cx.file;
    let has_content = file.package.is_some()
        || !file.imports.is_empty()
        || !file.options.is_empty()
        || !file.definitions.is_empty();
    if file.syntax.is_none() && has_content {
        findings.push((
            Span::default(),
            "Missing syntax statement; the file is treated as proto2".to_string(),
        ));
    }

    for import in &file.imports {
        if import.modifier == Some(ImportModifier::Weak) {
            findings.push((
                import.span,
                format!("Weak import \"{}\" is discouraged", import.path),
            ));
        }
    }

    walk(file, &mut |node| match node {
        Node::Message(_, m) => m.fields().for_each(|f| required_field(f, &mut findings)),
        Node::Group(_, g) => {
            group(g, &mut findings);
            g.fields().for_each(|f| required_field(f, &mut findings));
        }
        Node::Extend(x) => x.fields.iter().for_each(|f| required_field(f, &mut findings)),
        Node::Enum(_) | Node::Service(_) | Node::Oneof(_) => {}
    });

    for (span, message) in findings {
        cx.report(Rule::DiscouragedConstructs, span, message);
    }
}

fn deprecated(cx: &mut Checker<'_>) {
    let findings: Vec<(Span, String)> = cx
        .refs()
        .filter_map(|(type_ref, target)| {
            let target = target?;
            target.deprecated.then(|| {
                (
                    type_ref.span,
                    format!(
                        "{} \"{}\" is deprecated",
                        capitalized(target.kind),
                        target.full_name
                    ),
                )
            })
        })
        .collect();
    for (span, message) in findings {
        cx.report(Rule::DeprecatedUsage, span, message);
    }
}

fn unused(cx: &mut Checker<'_>) {
    if !cx.enabled(Rule::UnusedSymbol) {
        return;
    }
    let findings: Vec<(Span, String)> = cx
        .symbols
        .symbols
        .iter()
        .filter(|s| matches!(s.kind, SymbolKind::Message | SymbolKind::Enum))
        .filter(|s| !cx.analyzer.is_referenced(&s.full_name))
        .map(|s| {
            (
                s.name_range,
                format!("{} \"{}\" is never used", capitalized(s.kind), s.name),
            )
        })
        .collect();
    for (span, message) in findings {
        cx.report(Rule::UnusedSymbol, span, message);
    }
}

fn documentation(cx: &mut Checker<'_>) {
    if !cx.enabled(Rule::MissingDocumentation) {
        return;
    }
    let findings: Vec<(Span, String)> = cx
        .symbols
        .symbols
        .iter()
        .filter(|s| {
            matches!(
                s.kind,
                SymbolKind::Message | SymbolKind::Enum | SymbolKind::Service | SymbolKind::Rpc
            )
        })
        .filter(|s| s.doc.as_deref().is_none_or(|d| d.trim().is_empty()))
        .map(|s| {
            (
                s.name_range,
                format!(
                    "{} \"{}\" has no documentation comment",
                    capitalized(s.kind),
                    s.name
                ),
            )
        })
        .collect();
    for (span, message) in findings {
        cx.report(Rule::MissingDocumentation, span, message);
    }
}

fn capitalized(kind: SymbolKind) -> String {
    let display = kind.display();
    let mut chars = display.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
