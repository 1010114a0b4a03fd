//! Field and enum value numbering, reserved ranges and duplicates.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::{Checker, Node, RelatedInfo, Rule, walk};
use crate::base::Span;
use crate::base::constants::{MAX_FIELD_NUMBER, RESERVED_IMPLEMENTATION_RANGE};
use crate::hir::symbols::TypeRefKind;
use crate::syntax::{
    EnumDefinition, ExtensionsStatement, FieldRange, MessageBody, NumberedField, ProtoFile,
    ReservedStatement,
};

type Finding = (Span, String, Option<RelatedInfo>);

pub(super) fn check(cx: &mut Checker<'_>) {
    let mut tags: Vec<Finding> = Vec::new();
    let mut duplicates: Vec<Finding> = Vec::new();
    let uri: Arc<str> = Arc::from(cx.uri);
    let proto3 = cx.file.is_proto3();
    let extension_ranges = extendee_ranges(cx);

    walk(cx.file, &mut |node| match node {
        Node::Message(_, m) => {
            check_body(&uri, &m.numbered_fields(), &reserved_of(m), &mut tags, &mut duplicates);
        }
        Node::Group(_, g) => {
            check_body(&uri, &g.numbered_fields(), &reserved_of(g), &mut tags, &mut duplicates);
        }
        Node::Enum(e) => check_enum(&uri, e, proto3, &mut tags, &mut duplicates),
        Node::Extend(x) => {
            let Some(ranges) = extension_ranges.get(&x.extendee.span) else {
                return;
            };
            let numbered = x
                .fields
                .iter()
                .map(NumberedField::Field)
                .chain(x.groups.iter().map(NumberedField::Group));
            for field in numbered {
                let Some(number) = field.number() else {
                    continue;
                };
                if !ranges.iter().any(|r| r.contains(number)) {
                    tags.push((
                        field.number_span(),
                        format!(
                            "Extension field number {number} is not in an extension range of \"{}\"",
                            x.extendee.name
                        ),
                        None,
                    ));
                }
            }
        }
        Node::Service(_) | Node::Oneof(_) => {}
    });

    duplicate_definitions(cx, &mut duplicates);

    for (span, message, related) in tags {
        cx.report_with(Rule::FieldTagIssues, span, message, related);
    }
    for (span, message, related) in duplicates {
        cx.report_with(Rule::DuplicateFieldNumber, span, message, related);
    }
}

fn reserved_of<B: MessageBody>(body: &B) -> Vec<&ReservedStatement> {
    body.reserved().collect()
}

fn check_body(
    uri: &Arc<str>,
    fields: &[NumberedField<'_>],
    reserved: &[&ReservedStatement],
    tags: &mut Vec<Finding>,
    duplicates: &mut Vec<Finding>,
) {
    let mut seen: FxHashMap<i64, (String, Span)> = FxHashMap::default();
    for field in fields {
        let name = field.name();
        if !name.is_empty() && reserved.iter().flat_map(|r| &r.names).any(|n| n.name == name) {
            tags.push((
                field.name_span(),
                format!("Field name \"{name}\" is reserved"),
                None,
            ));
        }

        let Some(number) = field.number() else {
            continue;
        };
        let span = field.number_span();
        let (low, high) = RESERVED_IMPLEMENTATION_RANGE;
        if !(1..=MAX_FIELD_NUMBER).contains(&number) {
            tags.push((
                span,
                format!("Field number {number} is out of range (1-{MAX_FIELD_NUMBER})"),
                None,
            ));
        } else if (low..=high).contains(&number) {
            tags.push((
                span,
                format!(
                    "Field number {number} is in the range {low}-{high} \
                     reserved for the protobuf implementation"
                ),
                None,
            ));
        } else if reserved.iter().flat_map(|r| &r.ranges).any(|r| r.contains(number)) {
            tags.push((
                span,
                format!("Field number {number} of \"{name}\" is reserved"),
                None,
            ));
        }

        match seen.get(&number) {
            Some((first, first_span)) => duplicates.push((
                span,
                format!("Field number {number} is already used by \"{first}\""),
                Some(RelatedInfo {
                    uri: uri.clone(),
                    range: *first_span,
                    message: Arc::from(format!("\"{first}\" declared here")),
                }),
            )),
            None => {
                seen.insert(number, (name, span));
            }
        }
    }
}

fn check_enum(
    uri: &Arc<str>,
    enumeration: &EnumDefinition,
    proto3: bool,
    tags: &mut Vec<Finding>,
    duplicates: &mut Vec<Finding>,
) {
    if proto3 {
        if let Some(first) = enumeration.values.first() {
            if first.number.is_some_and(|n| n != 0) {
                tags.push((
                    first.number_span.unwrap_or(first.name_span),
                    "The first enum value must be zero in proto3".to_string(),
                    None,
                ));
            }
        }
    }

    let allow_alias = enumeration.allows_alias();
    let mut seen: FxHashMap<i64, (&str, Span)> = FxHashMap::default();
    for value in &enumeration.values {
        if !value.name.is_empty()
            && enumeration
                .reserved
                .iter()
                .flat_map(|r| &r.names)
                .any(|n| n.name == value.name)
        {
            tags.push((
                value.name_span,
                format!("Enum value name \"{}\" is reserved", value.name),
                None,
            ));
        }

        let Some(number) = value.number else {
            continue;
        };
        let span = value.number_span.unwrap_or(value.name_span);
        if i32::try_from(number).is_err() {
            tags.push((
                span,
                format!("Enum value {number} is out of range for int32"),
                None,
            ));
        } else if enumeration
            .reserved
            .iter()
            .flat_map(|r| &r.ranges)
            .any(|r| r.contains(number))
        {
            tags.push((
                span,
                format!("Enum value number {number} of \"{}\" is reserved", value.name),
                None,
            ));
        }

        if allow_alias {
            continue;
        }
        match seen.get(&number) {
            Some((first, first_span)) => duplicates.push((
                span,
                format!("Enum value number {number} is already used by \"{first}\""),
                Some(RelatedInfo {
                    uri: uri.clone(),
                    range: *first_span,
                    message: Arc::from(format!("\"{first}\" declared here")),
                }),
            )),
            None => {
                seen.insert(number, (value.name.as_str(), span));
            }
        }
    }
}

/// Extension ranges of each resolved extendee, keyed by the span of the
/// extendee name in this file. Extendees without declared ranges are left
/// out.
fn extendee_ranges(cx: &Checker<'_>) -> FxHashMap<Span, Vec<FieldRange>> {
    let mut out = FxHashMap::default();
    for (type_ref, target) in cx.refs() {
        if type_ref.kind != TypeRefKind::Extendee {
            continue;
        }
        let Some(target) = target else {
            continue;
        };
        let defining: &ProtoFile = if target.uri.as_ref() == cx.uri {
            cx.file
        } else {
            match cx.analyzer.file(&target.uri) {
                Some(file) => file.as_ref(),
                None => continue,
            }
        };
        let ranges = declared_extension_ranges(defining, &target.full_name);
        if !ranges.is_empty() {
            out.insert(type_ref.span, ranges);
        }
    }
    out
}

fn declared_extension_ranges(file: &ProtoFile, full_name: &str) -> Vec<FieldRange> {
    fn collect<'s>(statements: impl Iterator<Item = &'s ExtensionsStatement>) -> Vec<FieldRange> {
        statements.flat_map(|s| s.ranges.iter().copied()).collect()
    }

    let mut ranges = Vec::new();
    walk(file, &mut |node| match node {
        Node::Message(name, m) if name == full_name => ranges = collect(m.extension_ranges()),
        Node::Group(name, g) if name == full_name => ranges = collect(g.extension_ranges()),
        _ => {}
    });
    ranges
}

/// Names defined more than once, in this file or across the workspace.
/// The first definer in indexing order is left alone.
fn duplicate_definitions(cx: &Checker<'_>, out: &mut Vec<Finding>) {
    let mut local: FxHashMap<&str, Span> = FxHashMap::default();
    for symbol in &cx.symbols.symbols {
        if let Some(first) = local.get(symbol.full_name.as_ref()) {
            out.push((
                symbol.name_range,
                format!("Duplicate definition of \"{}\"", symbol.full_name),
                Some(RelatedInfo {
                    uri: Arc::from(cx.uri),
                    range: *first,
                    message: Arc::from("first definition"),
                }),
            ));
            continue;
        }
        local.insert(&symbol.full_name, symbol.name_range);

        let definers = cx.analyzer.definers(&symbol.full_name);
        let Some(first) = definers.first() else {
            continue;
        };
        if first.uri.as_ref() != cx.uri {
            out.push((
                symbol.name_range,
                format!(
                    "Duplicate definition of \"{}\" (also defined in {})",
                    symbol.full_name, first.uri
                ),
                Some(RelatedInfo {
                    uri: first.uri.clone(),
                    range: first.name_range,
                    message: Arc::from("first definition"),
                }),
            ));
        }
    }
}
