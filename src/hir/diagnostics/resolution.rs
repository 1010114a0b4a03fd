//! Unresolved type references and invalid map keys.

use super::{Checker, Node, Rule, walk};
use crate::base::Span;
use crate::base::constants::MAP_KEY_TYPES;
use crate::hir::symbols::TypeRefKind;
use crate::syntax::MessageBody;

pub(super) fn check(cx: &mut Checker<'_>) {
    if !cx.enabled(Rule::ReferenceErrors) {
        return;
    }

    let mut findings: Vec<(Span, String)> = cx
        .refs()
        .filter(|(_, target)| target.is_none())
        .map(|(r, _)| {
            let message = match r.kind {
                TypeRefKind::Extendee => format!("Unresolved extend target \"{}\"", r.name),
                _ => format!("Unresolved type \"{}\"", r.name),
            };
            (r.span, message)
        })
        .collect();

    walk(cx.file, &mut |node| {
        let maps: Vec<_> = match node {
            Node::Message(_, m) => m.map_fields().collect(),
            Node::Group(_, g) => g.map_fields().collect(),
            _ => return,
        };
        for map in maps {
            let key = map.key_type.name.as_str();
            if !key.is_empty() && !MAP_KEY_TYPES.contains(&key) {
                findings.push((
                    map.key_type.span,
                    format!("Invalid map key type \"{key}\""),
                ));
            }
        }
    });

    for (span, message) in findings {
        cx.report(Rule::ReferenceErrors, span, message);
    }
}
