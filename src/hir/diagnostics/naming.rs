//! Naming conventions from the protobuf style guide.

use super::{Checker, Node, Rule, walk};
use crate::base::Span;
use crate::syntax::{MessageBody, OneofElement};

fn is_pascal_case(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn is_lower_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn is_upper_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn pascal(kind: &str, name: &str, span: Span, out: &mut Vec<(Span, String)>) {
    if !name.is_empty() && !is_pascal_case(name) {
        out.push((span, format!("{kind} name \"{name}\" should be PascalCase")));
    }
}

fn snake(kind: &str, name: &str, span: Span, out: &mut Vec<(Span, String)>) {
    if !name.is_empty() && !is_lower_snake_case(name) {
        out.push((span, format!("{kind} name \"{name}\" should be lower_snake_case")));
    }
}

pub(super) fn check(cx: &mut Checker<'_>) {
    if !cx.enabled(Rule::NamingConventions) {
        return;
    }

    let mut findings: Vec<(Span, String)> = Vec::new();

    if let Some(package) = &cx.file.package {
        if package.name.split('.').any(|segment| !is_lower_snake_case(segment)) {
            findings.push((
                package.name_span,
                format!("Package name \"{}\" should be lower case", package.name),
            ));
        }
    }

    walk(cx.file, &mut |node| match node {
        Node::Message(_, message) => {
            pascal("Message", &message.name, message.name_span, &mut findings);
            for field in message.fields() {
                snake("Field", &field.name, field.name_span, &mut findings);
            }
            for map in message.map_fields() {
                snake("Field", &map.name, map.name_span, &mut findings);
            }
        }
        Node::Group(_, group) => {
            pascal("Group", &group.name, group.name_span, &mut findings);
            for field in group.fields() {
                snake("Field", &field.name, field.name_span, &mut findings);
            }
        }
        Node::Oneof(oneof) => {
            snake("Oneof", &oneof.name, oneof.name_span, &mut findings);
            for member in &oneof.elements {
                if let OneofElement::Field(field) = member {
                    snake("Field", &field.name, field.name_span, &mut findings);
                }
            }
        }
        Node::Enum(enumeration) => {
            pascal("Enum", &enumeration.name, enumeration.name_span, &mut findings);
            for value in &enumeration.values {
                if !value.name.is_empty() && !is_upper_snake_case(&value.name) {
                    findings.push((
                        value.name_span,
                        format!("Enum value \"{}\" should be UPPER_SNAKE_CASE", value.name),
                    ));
                }
            }
        }
        Node::Service(service) => {
            pascal("Service", &service.name, service.name_span, &mut findings);
            for rpc in &service.rpcs {
                pascal("RPC", &rpc.name, rpc.name_span, &mut findings);
            }
        }
        Node::Extend(extend) => {
            for field in &extend.fields {
                snake("Extension field", &field.name, field.name_span, &mut findings);
            }
        }
    });

    for (span, message) in findings {
        cx.report(Rule::NamingConventions, span, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("UserProfile", true)]
    #[case("V2", true)]
    #[case("userProfile", false)]
    #[case("User_Profile", false)]
    fn test_pascal_case(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_pascal_case(name), expected);
    }

    #[rstest]
    #[case("user_id", true)]
    #[case("v2_name", true)]
    #[case("userId", false)]
    #[case("_hidden", false)]
    fn test_lower_snake_case(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_lower_snake_case(name), expected);
    }

    #[rstest]
    #[case("STATUS_OK", true)]
    #[case("A1", true)]
    #[case("Status_Ok", false)]
    fn test_upper_snake_case(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_upper_snake_case(name), expected);
    }
}
