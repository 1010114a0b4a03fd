//! Lowering from the rowan CST to the owned protobuf AST.

use smol_str::SmolStr;

use super::ast::*;
use super::comments::{leading_doc, trailing_doc};
use super::literals::{parse_float, parse_int, parse_signed, unescape_string};
use crate::base::{LineIndex, Span, TextRange, TextSize};
use crate::parser::ast::{self as cst, AstNode};
use crate::parser::{Parse, SyntaxKind, SyntaxNode, SyntaxToken};

/// Convert a CST parse into a [`ProtoFile`].
pub fn lower(parse: &Parse, text: &str, uri: &str) -> ProtoFile {
    let mut lowerer = Lowerer {
        line_index: LineIndex::new(text),
        errors: Vec::new(),
    };
    let root = parse.syntax();
    let mut file = ProtoFile::empty(uri);

    for error in &parse.errors {
        let span = lowerer.span(error.range);
        lowerer.errors.push(SyntaxError::new(error.message.clone(), span));
    }

    if let Some(source) = cst::SourceFile::cast(root.clone()) {
        lowerer.file(&source, &mut file);
    }

    file.comments = root
        .descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind().is_comment())
        .map(|t| Comment {
            kind: if t.kind() == SyntaxKind::LINE_COMMENT {
                CommentKind::Line
            } else {
                CommentKind::Block
            },
            text: t.text().to_string(),
            span: lowerer.token_span(&t),
        })
        .collect();
    file.span = lowerer.span(TextRange::new(TextSize::new(0), TextSize::of(text)));
    file.errors = lowerer.errors;
    file
}

struct Lowerer {
    line_index: LineIndex,
    errors: Vec<SyntaxError>,
}

impl Lowerer {
    // =========================================================================
    // Positions
    // =========================================================================

    fn span(&self, range: TextRange) -> Span {
        self.line_index.span(range)
    }

    fn node_span(&self, node: &SyntaxNode) -> Span {
        self.span(node.text_range())
    }

    fn token_span(&self, token: &SyntaxToken) -> Span {
        self.span(token.text_range())
    }

    fn error(&mut self, message: &str, span: Span) {
        self.errors.push(SyntaxError::new(message, span));
    }

    fn doc(&self, node: &SyntaxNode, anchor: Option<SyntaxToken>) -> Option<String> {
        let first = node.first_token()?;
        let before = std::iter::successors(first.prev_token(), |t| t.prev_token())
            .map(|t| (t.kind(), t.text().to_string()));
        leading_doc(before).or_else(|| {
            let anchor = anchor?;
            let after = std::iter::successors(anchor.next_token(), |t| t.next_token())
                .map(|t| (t.kind(), t.text().to_string()));
            trailing_doc(after)
        })
    }

    /// Name text and span; a missing name becomes an empty one at the node start.
    fn name(&self, name: Option<cst::Name>, node: &SyntaxNode) -> (SmolStr, Span) {
        match name.and_then(|n| n.ident()) {
            Some(ident) => (SmolStr::new(ident.text()), self.token_span(&ident)),
            None => {
                let at = node
                    .first_token()
                    .map(|t| t.text_range().end())
                    .unwrap_or_else(|| node.text_range().start());
                (SmolStr::default(), self.span(TextRange::empty(at)))
            }
        }
    }

    fn type_name(&self, type_ref: Option<cst::TypeRef>, node: &SyntaxNode) -> TypeName {
        match type_ref {
            Some(t) => TypeName {
                name: SmolStr::new(t.text()),
                span: self.node_span(t.syntax()),
            },
            None => TypeName {
                name: SmolStr::default(),
                span: self.span(TextRange::empty(node.text_range().end())),
            },
        }
    }

    fn signed_range(&self, negative: bool, token: &SyntaxToken) -> TextRange {
        let end = token.text_range().end();
        if negative {
            let minus = std::iter::successors(token.prev_token(), |t| t.prev_token())
                .find(|t| t.kind() == SyntaxKind::MINUS);
            if let Some(minus) = minus {
                return TextRange::new(minus.text_range().start(), end);
            }
        }
        token.text_range()
    }

    fn number(&mut self, number: Option<(bool, SyntaxToken)>) -> (Option<i64>, Option<Span>) {
        let Some((negative, token)) = number else {
            return (None, None);
        };
        let span = self.span(self.signed_range(negative, &token));
        match parse_signed(negative, token.text()) {
            Some(value) => (Some(value), Some(span)),
            None => {
                self.error("integer literal out of range", span);
                (None, Some(span))
            }
        }
    }

    fn string(&mut self, tokens: &[SyntaxToken]) -> (String, Span) {
        let mut value = String::new();
        for token in tokens {
            match unescape_string(token.text()) {
                Some(decoded) => value.push_str(&decoded),
                None => {
                    let span = self.token_span(token);
                    self.error("invalid escape sequence in string", span);
                    value.push_str(token.text().trim_matches(|c| c == '"' || c == '\''));
                }
            }
        }
        let span = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => self.span(TextRange::new(
                first.text_range().start(),
                last.text_range().end(),
            )),
            _ => Span::default(),
        };
        (value, span)
    }

    // =========================================================================
    // File
    // =========================================================================

    fn file(&mut self, source: &cst::SourceFile, file: &mut ProtoFile) {
        for (i, decl) in source.syntax_decls().enumerate() {
            let span = self.node_span(decl.syntax());
            if i > 0 {
                self.error("multiple syntax statements", span);
                continue;
            }
            let tokens = decl.value_tokens();
            let (value, value_span) = if tokens.iter().all(|t| t.kind() == SyntaxKind::STRING) {
                self.string(&tokens)
            } else {
                let token = &tokens[0];
                (token.text().to_string(), self.token_span(token))
            };
            file.syntax = Some(SyntaxStatement {
                keyword: if decl.is_edition() {
                    SyntaxKeyword::Edition
                } else {
                    SyntaxKeyword::Syntax
                },
                value,
                value_span,
                span,
            });
        }

        for (i, package) in source.packages().enumerate() {
            let span = self.node_span(package.syntax());
            if i > 0 {
                self.error("multiple package statements", span);
                continue;
            }
            let (name, name_span) = match package.name() {
                Some(ident) => (SmolStr::new(ident.text()), self.node_span(ident.syntax())),
                None => (SmolStr::default(), span),
            };
            file.package = Some(PackageStatement {
                name,
                name_span,
                span,
            });
        }

        for import in source.imports() {
            let tokens = import.path_tokens();
            if tokens.is_empty() {
                continue;
            }
            let (path, path_span) = self.string(&tokens);
            file.imports.push(ImportStatement {
                path,
                path_span,
                modifier: match import.kind() {
                    cst::ImportKind::Public => Some(ImportModifier::Public),
                    cst::ImportKind::Weak => Some(ImportModifier::Weak),
                    cst::ImportKind::Default => None,
                },
                span: self.node_span(import.syntax()),
            });
        }

        file.options = source.options().filter_map(|o| self.option(&o)).collect();

        for item in source.items() {
            let definition = match item {
                cst::Item::Message(m) => Definition::Message(self.message(&m)),
                cst::Item::Enum(e) => Definition::Enum(self.enumeration(&e)),
                cst::Item::Service(s) => Definition::Service(self.service(&s)),
                cst::Item::Extend(e) => Definition::Extend(self.extend(&e)),
            };
            file.definitions.push(definition);
        }
    }

    // =========================================================================
    // Options
    // =========================================================================

    fn option(&mut self, decl: &cst::OptionDecl) -> Option<OptionStatement> {
        let name_node = decl.name()?;
        let parts: Vec<OptionNamePart> = name_node
            .parts()
            .into_iter()
            .map(|(name, is_extension)| OptionNamePart {
                name: SmolStr::new(name),
                is_extension,
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        let value_node = decl.value()?;
        let value_span = self.node_span(value_node.syntax());
        let value = self.value(&value_node);
        Some(OptionStatement {
            name: OptionName {
                parts,
                span: self.node_span(name_node.syntax()),
            },
            value,
            value_span,
            span: self.node_span(decl.syntax()),
        })
    }

    fn options(
        &mut self,
        decls: impl IntoIterator<Item = cst::OptionDecl>,
    ) -> Vec<OptionStatement> {
        decls.into_iter().filter_map(|o| self.option(&o)).collect()
    }

    fn value(&mut self, value: &cst::OptionValue) -> Constant {
        match value {
            cst::OptionValue::Constant(c) => self.constant(c),
            cst::OptionValue::Aggregate(a) => Constant::Aggregate(self.aggregate(a)),
            cst::OptionValue::List(_) => Constant::Invalid,
        }
    }

    fn constant(&mut self, constant: &cst::Constant) -> Constant {
        if let Some(ident) = constant.ident() {
            let text = ident.text();
            return match text.as_str() {
                "true" => Constant::Bool(true),
                "false" => Constant::Bool(false),
                "inf" | "nan" => parse_float(&text)
                    .map(Constant::Float)
                    .unwrap_or(Constant::Invalid),
                _ => Constant::Identifier(SmolStr::new(text)),
            };
        }
        let tokens = constant.tokens();
        let Some(first) = tokens.first() else {
            return Constant::Invalid;
        };
        if first.kind() == SyntaxKind::STRING {
            return Constant::String(self.string(&tokens).0);
        }
        let negative = first.kind() == SyntaxKind::MINUS;
        let literal = if matches!(first.kind(), SyntaxKind::MINUS | SyntaxKind::PLUS) {
            match tokens.get(1) {
                Some(t) => t,
                None => return Constant::Invalid,
            }
        } else {
            first
        };
        match literal.kind() {
            SyntaxKind::INT => match parse_int(literal.text()) {
                Some(value) => {
                    let value = value as i128;
                    Constant::Integer(if negative { -value } else { value })
                }
                None => {
                    let span = self.token_span(literal);
                    self.error("integer literal out of range", span);
                    Constant::Invalid
                }
            },
            SyntaxKind::FLOAT | SyntaxKind::IDENT => match parse_float(literal.text()) {
                Some(value) => Constant::Float(if negative { -value } else { value }),
                None => Constant::Invalid,
            },
            _ => Constant::Invalid,
        }
    }

    fn aggregate(&mut self, aggregate: &cst::Aggregate) -> Vec<AggregateField> {
        aggregate
            .fields()
            .filter_map(|field| {
                let value = field.value()?;
                Some(AggregateField {
                    name: SmolStr::new(field.name()),
                    value: self.aggregate_value(&value),
                    span: self.node_span(field.syntax()),
                })
            })
            .collect()
    }

    fn aggregate_value(&mut self, value: &cst::OptionValue) -> AggregateValue {
        match value {
            cst::OptionValue::Constant(c) => AggregateValue::Scalar(self.constant(c)),
            cst::OptionValue::Aggregate(a) => AggregateValue::Message(self.aggregate(a)),
            cst::OptionValue::List(list) => AggregateValue::List(
                list.values().map(|v| self.aggregate_value(&v)).collect(),
            ),
        }
    }

    // =========================================================================
    // Messages
    // =========================================================================

    fn message(&mut self, def: &cst::MessageDef) -> MessageDefinition {
        let node = def.syntax();
        let (name, name_span) = self.name(def.name(), node);
        let body = def.body();
        let anchor = body.as_ref().and_then(|b| b.syntax().first_token());
        MessageDefinition {
            name,
            name_span,
            elements: self.message_elements(body),
            doc: self.doc(node, anchor),
            span: self.node_span(node),
        }
    }

    fn message_elements(&mut self, body: Option<cst::MessageBody>) -> Vec<MessageElement> {
        let Some(body) = body else {
            return Vec::new();
        };
        body.elements()
            .filter_map(|element| self.message_element(element))
            .collect()
    }

    fn message_element(&mut self, element: cst::MessageElement) -> Option<MessageElement> {
        Some(match element {
            cst::MessageElement::Field(f) => MessageElement::Field(self.field(&f)),
            cst::MessageElement::MapField(m) => MessageElement::MapField(self.map_field(&m)),
            cst::MessageElement::Group(g) => MessageElement::Group(self.group(&g)),
            cst::MessageElement::Oneof(o) => MessageElement::Oneof(self.oneof(&o)),
            cst::MessageElement::Message(m) => MessageElement::Message(self.message(&m)),
            cst::MessageElement::Enum(e) => MessageElement::Enum(self.enumeration(&e)),
            cst::MessageElement::Extend(e) => MessageElement::Extend(self.extend(&e)),
            cst::MessageElement::Reserved(r) => MessageElement::Reserved(self.reserved(&r)),
            cst::MessageElement::Extensions(x) => {
                MessageElement::Extensions(self.extensions(&x))
            }
            cst::MessageElement::Option(o) => MessageElement::Option(self.option(&o)?),
        })
    }

    fn label(&self, token: Option<SyntaxToken>) -> (Option<FieldLabel>, Option<Span>) {
        let Some(token) = token else {
            return (None, None);
        };
        let label = match token.text() {
            "optional" => FieldLabel::Optional,
            "required" => FieldLabel::Required,
            _ => FieldLabel::Repeated,
        };
        (Some(label), Some(self.token_span(&token)))
    }

    fn field(&mut self, def: &cst::FieldDef) -> FieldDefinition {
        let node = def.syntax();
        let (label, label_span) = self.label(def.label());
        let (name, name_span) = self.name(def.name(), node);
        let (number, number_span) = self.number(def.number());
        FieldDefinition {
            label,
            label_span,
            field_type: self.type_name(def.type_ref(), node),
            name,
            name_span,
            number,
            number_span,
            options: self.options(def.compact_options()),
            doc: self.doc(node, node.last_token()),
            span: self.node_span(node),
        }
    }

    fn map_field(&mut self, def: &cst::MapFieldDef) -> MapFieldDefinition {
        let node = def.syntax();
        let (name, name_span) = self.name(def.name(), node);
        let (number, number_span) = self.number(def.number());
        MapFieldDefinition {
            key_type: self.type_name(def.key_type(), node),
            value_type: self.type_name(def.value_type(), node),
            name,
            name_span,
            number,
            number_span,
            options: self.options(def.compact_options()),
            doc: self.doc(node, node.last_token()),
            span: self.node_span(node),
        }
    }

    fn group(&mut self, def: &cst::GroupDef) -> GroupDefinition {
        let node = def.syntax();
        let (label, label_span) = self.label(def.label());
        let (name, name_span) = self.name(def.name(), node);
        let (number, number_span) = self.number(def.number());
        let body = def.body();
        let anchor = body.as_ref().and_then(|b| b.syntax().first_token());
        GroupDefinition {
            label,
            label_span,
            name,
            name_span,
            number,
            number_span,
            options: self.options(def.compact_options()),
            elements: self.message_elements(body),
            doc: self.doc(node, anchor),
            span: self.node_span(node),
        }
    }

    fn oneof(&mut self, def: &cst::OneofDef) -> OneofDefinition {
        let node = def.syntax();
        let (name, name_span) = self.name(def.name(), node);
        let anchor = node
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::L_BRACE);
        let elements = def
            .elements()
            .filter_map(|element| match element {
                cst::MessageElement::Field(f) => Some(OneofElement::Field(self.field(&f))),
                cst::MessageElement::Group(g) => Some(OneofElement::Group(self.group(&g))),
                cst::MessageElement::Option(o) => self.option(&o).map(OneofElement::Option),
                _ => None,
            })
            .collect();
        OneofDefinition {
            name,
            name_span,
            elements,
            doc: self.doc(node, anchor),
            span: self.node_span(node),
        }
    }

    // =========================================================================
    // Ranges
    // =========================================================================

    fn ranges(&mut self, ranges: impl Iterator<Item = cst::Range>) -> Vec<FieldRange> {
        let mut out = Vec::new();
        for range in ranges {
            let span = self.node_span(range.syntax());
            let Some(start) = range
                .start()
                .and_then(|(negative, t)| parse_signed(negative, t.text()))
            else {
                self.error("invalid range", span);
                continue;
            };
            let end = match range.end() {
                None => RangeEnd::Inclusive(start),
                Some(None) => RangeEnd::Max,
                Some(Some((negative, t))) => match parse_signed(negative, t.text()) {
                    Some(end) => RangeEnd::Inclusive(end),
                    None => {
                        self.error("invalid range", span);
                        continue;
                    }
                },
            };
            out.push(FieldRange { start, end, span });
        }
        out
    }

    fn reserved(&mut self, decl: &cst::ReservedDecl) -> ReservedStatement {
        let names = decl
            .names()
            .into_iter()
            .map(|token| {
                let (name, span) = if token.kind() == SyntaxKind::STRING {
                    self.string(std::slice::from_ref(&token))
                } else {
                    (token.text().to_string(), self.token_span(&token))
                };
                ReservedName {
                    name: SmolStr::new(name),
                    span,
                }
            })
            .collect();
        ReservedStatement {
            ranges: self.ranges(decl.ranges()),
            names,
            span: self.node_span(decl.syntax()),
        }
    }

    fn extensions(&mut self, decl: &cst::ExtensionsDecl) -> ExtensionsStatement {
        ExtensionsStatement {
            ranges: self.ranges(decl.ranges()),
            options: self.options(decl.compact_options()),
            span: self.node_span(decl.syntax()),
        }
    }

    // =========================================================================
    // Enums
    // =========================================================================

    fn enumeration(&mut self, def: &cst::EnumDef) -> EnumDefinition {
        let node = def.syntax();
        let (name, name_span) = self.name(def.name(), node);
        let mut out = EnumDefinition {
            name,
            name_span,
            span: self.node_span(node),
            ..EnumDefinition::default()
        };
        let body = def.body();
        let anchor = body.as_ref().and_then(|b| b.syntax().first_token());
        if let Some(body) = body {
            for value in body.values() {
                let value_node = value.syntax();
                let (name, name_span) = self.name(value.name(), value_node);
                let (number, number_span) = self.number(value.number());
                out.values.push(EnumValue {
                    name,
                    name_span,
                    number,
                    number_span,
                    options: self.options(value.compact_options()),
                    doc: self.doc(value_node, value_node.last_token()),
                    span: self.node_span(value_node),
                });
            }
            out.options = self.options(body.options());
            out.reserved = body.reserved().map(|r| self.reserved(&r)).collect();
        }
        out.doc = self.doc(node, anchor);
        out
    }

    // =========================================================================
    // Services
    // =========================================================================

    fn service(&mut self, def: &cst::ServiceDef) -> ServiceDefinition {
        let node = def.syntax();
        let (name, name_span) = self.name(def.name(), node);
        let mut out = ServiceDefinition {
            name,
            name_span,
            span: self.node_span(node),
            ..ServiceDefinition::default()
        };
        let body = def.body();
        let anchor = body.as_ref().and_then(|b| b.syntax().first_token());
        if let Some(body) = body {
            out.rpcs = body.rpcs().map(|rpc| self.rpc(&rpc)).collect();
            out.options = self.options(body.options());
        }
        out.doc = self.doc(node, anchor);
        out
    }

    fn rpc(&mut self, def: &cst::RpcDef) -> RpcDefinition {
        let node = def.syntax();
        let (name, name_span) = self.name(def.name(), node);
        let anchor = def.l_brace().or_else(|| node.last_token());
        RpcDefinition {
            name,
            name_span,
            request: self.rpc_type(def.request(), node),
            response: self.rpc_type(def.response(), node),
            options: self.options(def.options()),
            doc: self.doc(node, anchor),
            span: self.node_span(node),
        }
    }

    fn rpc_type(&self, rpc_type: Option<cst::RpcType>, node: &SyntaxNode) -> RpcType {
        match rpc_type {
            Some(t) => RpcType {
                type_name: self.type_name(t.type_ref(), t.syntax()),
                streaming: t.is_streaming(),
            },
            None => RpcType {
                type_name: self.type_name(None, node),
                streaming: false,
            },
        }
    }

    // =========================================================================
    // Extend
    // =========================================================================

    fn extend(&mut self, def: &cst::ExtendDef) -> ExtendDefinition {
        let node = def.syntax();
        let mut out = ExtendDefinition {
            extendee: self.type_name(def.extendee(), node),
            span: self.node_span(node),
            ..ExtendDefinition::default()
        };
        let body = def.body();
        let anchor = body.as_ref().and_then(|b| b.syntax().first_token());
        if let Some(body) = body {
            for element in body.elements() {
                match element {
                    cst::MessageElement::Field(f) => out.fields.push(self.field(&f)),
                    cst::MessageElement::Group(g) => out.groups.push(self.group(&g)),
                    cst::MessageElement::MapField(m) => {
                        let span = self.node_span(m.syntax());
                        self.error("map fields are not allowed in extend blocks", span);
                    }
                    _ => {}
                }
            }
        }
        out.doc = self.doc(node, anchor);
        out
    }
}
