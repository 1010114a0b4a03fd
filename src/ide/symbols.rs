//! Symbol listing for workspace and document views.

use std::cmp::Reverse;
use std::sync::Arc;

use crate::base::Span;
use crate::hir::{HirSymbol, SemanticAnalyzer, SymbolKind};
use crate::syntax::{
    Constant, Definition, EnumDefinition, ExtendDefinition, FieldDefinition, GroupDefinition,
    MessageBody, MessageDefinition, MessageElement, OneofDefinition, OneofElement, ProtoFile,
    ServiceDefinition, is_deprecated,
};

/// Maximum number of workspace symbol results.
pub const WORKSPACE_SYMBOL_LIMIT: usize = 100;

// ============================================================================
// DOCUMENT SYMBOLS
// ============================================================================

/// A node of the document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSymbol {
    pub name: Arc<str>,
    pub detail: Option<Arc<str>>,
    pub kind: SymbolKind,
    /// Whole declaration.
    pub range: Span,
    /// Identifier span, always inside `range`.
    pub selection_range: Span,
    pub deprecated: bool,
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    fn new(name: &str, kind: SymbolKind, range: Span, name_range: Span) -> Self {
        Self {
            name: Arc::from(name),
            detail: None,
            kind,
            range,
            selection_range: name_range.clamp_within(range),
            deprecated: false,
            children: Vec::new(),
        }
    }

    fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Depth-first iteration over this node and its descendants.
    pub fn walk(&self) -> Vec<&DocumentSymbol> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

/// The outline of a file, mirroring the nesting of its definitions.
/// Definitions with an empty name are left out together with their contents.
pub fn document_symbols(file: &ProtoFile) -> Vec<DocumentSymbol> {
    let mut out = Vec::new();
    for definition in &file.definitions {
        match definition {
            Definition::Message(m) => out.extend(message_symbol(m)),
            Definition::Enum(e) => out.extend(enum_symbol(e)),
            Definition::Service(s) => out.extend(service_symbol(s)),
            Definition::Extend(x) => extend_symbols(x, &mut out),
        }
    }
    out
}

fn field_detail(field: &FieldDefinition) -> String {
    match field.label {
        Some(label) => format!("{} {}", label.as_str(), field.field_type.name),
        None => field.field_type.name.to_string(),
    }
}

fn field_symbol(field: &FieldDefinition, kind: SymbolKind) -> Option<DocumentSymbol> {
    if field.name.is_empty() {
        return None;
    }
    let mut symbol = DocumentSymbol::new(&field.name, kind, field.span, field.name_span)
        .with_detail(field_detail(field));
    symbol.deprecated = is_deprecated(&field.options);
    Some(symbol)
}

fn message_symbol(message: &MessageDefinition) -> Option<DocumentSymbol> {
    if message.name.is_empty() {
        return None;
    }
    let mut symbol = DocumentSymbol::new(
        &message.name,
        SymbolKind::Message,
        message.span,
        message.name_span,
    );
    symbol.deprecated = message
        .options()
        .any(|o| o.name.is("deprecated") && o.value == Constant::Bool(true));
    symbol.children = element_symbols(&message.elements);
    Some(symbol)
}

fn group_symbol(group: &GroupDefinition) -> Option<DocumentSymbol> {
    if group.name.is_empty() {
        return None;
    }
    let mut symbol =
        DocumentSymbol::new(&group.name, SymbolKind::Group, group.span, group.name_span);
    symbol.children = element_symbols(&group.elements);
    Some(symbol)
}

fn oneof_symbol(oneof: &OneofDefinition) -> Option<DocumentSymbol> {
    if oneof.name.is_empty() {
        return None;
    }
    let mut symbol =
        DocumentSymbol::new(&oneof.name, SymbolKind::Oneof, oneof.span, oneof.name_span);
    for member in &oneof.elements {
        match member {
            OneofElement::Field(f) => symbol.children.extend(field_symbol(f, SymbolKind::Field)),
            OneofElement::Group(g) => symbol.children.extend(group_symbol(g)),
            OneofElement::Option(_) => {}
        }
    }
    Some(symbol)
}

fn element_symbols(elements: &[MessageElement]) -> Vec<DocumentSymbol> {
    let mut out = Vec::new();
    for element in elements {
        match element {
            MessageElement::Field(f) => out.extend(field_symbol(f, SymbolKind::Field)),
            MessageElement::MapField(m) => {
                if !m.name.is_empty() {
                    out.push(
                        DocumentSymbol::new(&m.name, SymbolKind::MapField, m.span, m.name_span)
                            .with_detail(format!(
                                "map<{}, {}>",
                                m.key_type.name, m.value_type.name
                            )),
                    );
                }
            }
            MessageElement::Group(g) => out.extend(group_symbol(g)),
            MessageElement::Oneof(o) => out.extend(oneof_symbol(o)),
            MessageElement::Message(m) => out.extend(message_symbol(m)),
            MessageElement::Enum(e) => out.extend(enum_symbol(e)),
            MessageElement::Extend(x) => extend_symbols(x, &mut out),
            MessageElement::Reserved(_)
            | MessageElement::Extensions(_)
            | MessageElement::Option(_) => {}
        }
    }
    out
}

fn enum_symbol(enumeration: &EnumDefinition) -> Option<DocumentSymbol> {
    if enumeration.name.is_empty() {
        return None;
    }
    let mut symbol = DocumentSymbol::new(
        &enumeration.name,
        SymbolKind::Enum,
        enumeration.span,
        enumeration.name_span,
    );
    for value in enumeration.values.iter().filter(|v| !v.name.is_empty()) {
        let mut child =
            DocumentSymbol::new(&value.name, SymbolKind::EnumValue, value.span, value.name_span);
        if let Some(number) = value.number {
            child = child.with_detail(number.to_string());
        }
        child.deprecated = is_deprecated(&value.options);
        symbol.children.push(child);
    }
    Some(symbol)
}

fn service_symbol(service: &ServiceDefinition) -> Option<DocumentSymbol> {
    if service.name.is_empty() {
        return None;
    }
    let mut symbol = DocumentSymbol::new(
        &service.name,
        SymbolKind::Service,
        service.span,
        service.name_span,
    );
    symbol.deprecated = is_deprecated(&service.options);
    for rpc in service.rpcs.iter().filter(|r| !r.name.is_empty()) {
        let mut child = DocumentSymbol::new(&rpc.name, SymbolKind::Rpc, rpc.span, rpc.name_span)
            .with_detail(rpc.signature());
        child.deprecated = is_deprecated(&rpc.options);
        symbol.children.push(child);
    }
    Some(symbol)
}

/// Extension fields appear next to the `extend` block that declares them.
fn extend_symbols(extend: &ExtendDefinition, out: &mut Vec<DocumentSymbol>) {
    for field in &extend.fields {
        out.extend(field_symbol(field, SymbolKind::Extension));
    }
    for group in &extend.groups {
        out.extend(group_symbol(group));
    }
}

// ============================================================================
// WORKSPACE SYMBOLS
// ============================================================================

/// A workspace symbol search result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: Arc<str>,
    pub full_name: Arc<str>,
    pub container: Option<Arc<str>>,
    pub kind: SymbolKind,
    pub uri: Arc<str>,
    pub range: Span,
    pub selection_range: Span,
    /// Match quality; higher is better.
    pub score: u32,
}

impl SymbolInfo {
    fn from_hir(symbol: &HirSymbol, score: u32) -> Self {
        Self {
            name: symbol.name.clone(),
            full_name: symbol.full_name.clone(),
            container: symbol.container.clone(),
            kind: symbol.kind,
            uri: symbol.uri.clone(),
            range: symbol.range,
            selection_range: symbol.name_range.clamp_within(symbol.range),
            score,
        }
    }
}

/// Match scores, best first.
mod score {
    pub const EXACT_NAME: u32 = 1000;
    pub const EXACT_FULL_NAME: u32 = 900;
    pub const NAME_PREFIX: u32 = 800;
    pub const FULL_NAME_PREFIX: u32 = 700;
    pub const NAME_SUBSTRING: u32 = 500;
    pub const FULL_NAME_SUBSTRING: u32 = 400;
    pub const NAME_SUBSEQUENCE: u32 = 300;
    pub const FULL_NAME_SUBSEQUENCE: u32 = 200;
    pub const PARTS: u32 = 100;
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut haystack = haystack.chars();
    needle.chars().all(|c| haystack.any(|h| h == c))
}

/// Score `name`/`full_name` against an already lower-cased query. `None`
/// means no match.
pub fn fuzzy_score(query: &str, name: &str, full_name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let full_name = full_name.to_lowercase();

    let score = if name == query {
        score::EXACT_NAME
    } else if full_name == query {
        score::EXACT_FULL_NAME
    } else if name.starts_with(query) {
        score::NAME_PREFIX
    } else if full_name.starts_with(query) {
        score::FULL_NAME_PREFIX
    } else if name.contains(query) {
        score::NAME_SUBSTRING
    } else if full_name.contains(query) {
        score::FULL_NAME_SUBSTRING
    } else if is_subsequence(query, &name) {
        score::NAME_SUBSEQUENCE
    } else if is_subsequence(query, &full_name) {
        score::FULL_NAME_SUBSEQUENCE
    } else {
        let mut parts = query
            .split(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-' | '/' | ':'))
            .filter(|p| !p.is_empty())
            .peekable();
        parts.peek()?;
        if parts.all(|p| full_name.contains(p)) {
            score::PARTS
        } else {
            return None;
        }
    };
    Some(score)
}

/// Search every indexed symbol. Results are ordered by score, then name,
/// and capped at [`WORKSPACE_SYMBOL_LIMIT`]. An empty query matches all.
pub fn workspace_symbols(analyzer: &SemanticAnalyzer, query: &str) -> Vec<SymbolInfo> {
    let query = query.trim().to_lowercase();

    let mut results: Vec<SymbolInfo> = analyzer
        .all_symbols()
        .filter(|s| !s.name.is_empty())
        .filter_map(|s| {
            if query.is_empty() {
                return Some(SymbolInfo::from_hir(s, 0));
            }
            fuzzy_score(&query, &s.name, &s.full_name).map(|score| SymbolInfo::from_hir(s, score))
        })
        .collect();

    results.sort_by(|a, b| {
        (Reverse(a.score), &a.name, &a.full_name).cmp(&(Reverse(b.score), &b.name, &b.full_name))
    });
    results.truncate(WORKSPACE_SYMBOL_LIMIT);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;
    use rstest::rstest;

    #[rstest]
    #[case("usermessage", "UserMessage", "t.UserMessage", Some(1000))]
    #[case("t.usermessage", "UserMessage", "t.UserMessage", Some(900))]
    #[case("user", "UserMessage", "t.UserMessage", Some(800))]
    #[case("t.user", "UserMessage", "t.UserMessage", Some(700))]
    #[case("message", "UserMessage", "t.UserMessage", Some(500))]
    #[case("t.usermess", "UserMessage", "a.t.UserMessage", Some(400))]
    #[case("usmsg", "UserMessage", "t.UserMessage", Some(300))]
    #[case("tusm", "UserMessage", "t.UserMessage", Some(200))]
    #[case("message user", "UserMessage", "t.UserMessage", Some(100))]
    #[case("zzz", "UserMessage", "t.UserMessage", None)]
    fn test_fuzzy_score(
        #[case] query: &str,
        #[case] name: &str,
        #[case] full_name: &str,
        #[case] expected: Option<u32>,
    ) {
        assert_eq!(fuzzy_score(query, name, full_name), expected);
    }

    #[test]
    fn test_document_symbols_tree() {
        let source = r#"
syntax = "proto3";
package t;
message Outer {
  message Inner { string id = 1; }
  oneof choice { string a = 2; int32 b = 3; }
  map<string, Inner> items = 4;
}
enum Color { COLOR_UNSPECIFIED = 0; }
service Api { rpc Get(Outer) returns (Outer); }
"#;
        let symbols = document_symbols(&parse(source, "a.proto"));
        let top: Vec<&str> = symbols.iter().map(|s| s.name.as_ref()).collect();
        assert_eq!(top, vec!["Outer", "Color", "Api"]);

        let outer: Vec<(&str, SymbolKind)> = symbols[0]
            .children
            .iter()
            .map(|s| (s.name.as_ref(), s.kind))
            .collect();
        assert_eq!(
            outer,
            vec![
                ("Inner", SymbolKind::Message),
                ("choice", SymbolKind::Oneof),
                ("items", SymbolKind::MapField),
            ]
        );
        assert_eq!(symbols[0].children[1].children.len(), 2);
        assert_eq!(symbols[2].children[0].detail.as_deref(), Some("(Outer) returns (Outer)"));

        for symbol in symbols.iter().flat_map(|s| s.walk()) {
            assert!(symbol.range.contains_span(&symbol.selection_range));
        }
    }

    #[test]
    fn test_empty_names_are_excluded() {
        let mut file = parse("message Valid {}\nmessage Other { int32 x = 1; }\n", "a.proto");
        if let Definition::Message(m) = &mut file.definitions[1] {
            m.name = "".into();
        }
        let symbols = document_symbols(&file);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name.as_ref(), "Valid");
    }
}
