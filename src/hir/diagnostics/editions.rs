//! Edition strings and `features.*` options.

use super::{Checker, Node, Rule, walk};
use crate::base::Span;
use crate::base::constants::SUPPORTED_EDITIONS;
use crate::syntax::{
    Constant, FieldDefinition, MessageBody, OneofElement, OptionStatement, ProtoFile,
};

/// Known features and the values each accepts.
const FEATURES: &[(&str, &[&str])] = &[
    ("field_presence", &["EXPLICIT", "IMPLICIT", "LEGACY_REQUIRED"]),
    ("enum_type", &["OPEN", "CLOSED"]),
    ("repeated_field_encoding", &["PACKED", "EXPANDED"]),
    ("utf8_validation", &["VERIFY", "NONE"]),
    ("message_encoding", &["LENGTH_PREFIXED", "DELIMITED"]),
    ("json_format", &["ALLOW", "LEGACY_BEST_EFFORT"]),
];

pub(super) fn check(cx: &mut Checker<'_>) {
    if !cx.enabled(Rule::EditionFeatures) {
        return;
    }

    let mut findings: Vec<(Span, String)> = Vec::new();
    let editions = cx.file.is_editions();

    if let Some(syntax) = &cx.file.syntax {
        if editions && !SUPPORTED_EDITIONS.contains(&syntax.value.as_str()) {
            findings.push((
                syntax.value_span,
                format!(
                    "Unsupported edition \"{}\"; supported editions are {}",
                    syntax.value,
                    SUPPORTED_EDITIONS.join(", ")
                ),
            ));
        }
    }

    for option in all_options(cx.file) {
        let Some(path) = option.name.feature_path() else {
            continue;
        };
        if !editions {
            findings.push((
                option.name.span,
                format!("Feature \"features.{path}\" can only be set in editions files"),
            ));
            continue;
        }
        // Language-specific features live in extensions.
        if option.name.parts.iter().any(|p| p.is_extension) {
            continue;
        }
        let Some((_, allowed)) = FEATURES.iter().find(|(name, _)| *name == path) else {
            findings.push((option.name.span, format!("Unknown feature \"{path}\"")));
            continue;
        };
        let valid = match &option.value {
            Constant::Identifier(value) => allowed.contains(&value.as_str()),
            _ => false,
        };
        if !valid {
            findings.push((
                option.value_span,
                format!(
                    "Invalid value for feature \"{path}\"; expected one of {}",
                    allowed.join(", ")
                ),
            ));
        }
    }

    for (span, message) in findings {
        cx.report(Rule::EditionFeatures, span, message);
    }
}

/// Every option in the file, at any nesting level.
fn all_options(file: &ProtoFile) -> Vec<&OptionStatement> {
    fn field<'a>(f: &'a FieldDefinition, out: &mut Vec<&'a OptionStatement>) {
        out.extend(f.options.iter());
    }
    fn fields<'a>(body: &'a impl MessageBody, out: &mut Vec<&'a OptionStatement>) {
        out.extend(body.options());
        body.fields().for_each(|f| out.extend(f.options.iter()));
        body.map_fields().for_each(|m| out.extend(m.options.iter()));
        body.extension_ranges().for_each(|x| out.extend(x.options.iter()));
    }

    let mut out: Vec<&OptionStatement> = file.options.iter().collect();
    walk(file, &mut |node| match node {
        Node::Message(_, m) => fields(m, &mut out),
        Node::Group(_, g) => {
            out.extend(g.options.iter());
            fields(g, &mut out);
        }
        Node::Oneof(o) => {
            for member in &o.elements {
                match member {
                    OneofElement::Field(f) => field(f, &mut out),
                    OneofElement::Option(opt) => out.push(opt),
                    OneofElement::Group(_) => {}
                }
            }
        }
        Node::Enum(e) => {
            out.extend(e.options.iter());
            e.values.iter().for_each(|v| out.extend(v.options.iter()));
        }
        Node::Service(s) => {
            out.extend(s.options.iter());
            s.rpcs.iter().for_each(|r| out.extend(r.options.iter()));
        }
        Node::Extend(x) => x.fields.iter().for_each(|f| field(f, &mut out)),
    });
    out
}
