//! Protobuf AST produced by both parser engines.
//!
//! Every node carries its full source [`Span`]; named nodes also carry a
//! `name_span` covering just the identifier. A node whose name is empty is
//! syntactically incomplete and is skipped by every symbol consumer.
//!
//! Full names are never stored on nodes. They are derived by walking the
//! nesting chain from the file's package (see [`qualify`]).

use smol_str::SmolStr;

use crate::base::Span;

/// Join a scope and a simple name into a full name.
pub fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

// ============================================================================
// FILE
// ============================================================================

/// Root node for one document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoFile {
    pub uri: String,
    pub syntax: Option<SyntaxStatement>,
    pub package: Option<PackageStatement>,
    pub imports: Vec<ImportStatement>,
    pub options: Vec<OptionStatement>,
    pub definitions: Vec<Definition>,
    /// Every comment in the document, in source order.
    pub comments: Vec<Comment>,
    /// Recoverable syntax errors encountered while parsing.
    pub errors: Vec<SyntaxError>,
    pub span: Span,
}

impl ProtoFile {
    /// An empty file, used to purge a URI from the analyzer.
    pub fn empty(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn package_name(&self) -> &str {
        self.package.as_ref().map(|p| p.name.as_str()).unwrap_or("")
    }

    /// `proto2`, `proto3`, or the edition string.
    pub fn syntax_value(&self) -> Option<&str> {
        self.syntax.as_ref().map(|s| s.value.as_str())
    }

    pub fn is_editions(&self) -> bool {
        matches!(
            self.syntax,
            Some(SyntaxStatement {
                keyword: SyntaxKeyword::Edition,
                ..
            })
        )
    }

    /// Files without a syntax statement are proto2.
    pub fn is_proto3(&self) -> bool {
        matches!(
            &self.syntax,
            Some(SyntaxStatement { keyword: SyntaxKeyword::Syntax, value, .. }) if value == "proto3"
        )
    }

    pub fn messages(&self) -> impl Iterator<Item = &MessageDefinition> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Message(m) => Some(m),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDefinition> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Enum(e) => Some(e),
            _ => None,
        })
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Service(s) => Some(s),
            _ => None,
        })
    }

    pub fn extends(&self) -> impl Iterator<Item = &ExtendDefinition> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Extend(e) => Some(e),
            _ => None,
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Message(MessageDefinition),
    Enum(EnumDefinition),
    Service(ServiceDefinition),
    Extend(ExtendDefinition),
}

impl Definition {
    pub fn span(&self) -> Span {
        match self {
            Definition::Message(m) => m.span,
            Definition::Enum(e) => e.span,
            Definition::Service(s) => s.span,
            Definition::Extend(e) => e.span,
        }
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKeyword {
    Syntax,
    Edition,
}

/// `syntax = "proto3";` or `edition = "2023";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxStatement {
    pub keyword: SyntaxKeyword,
    pub value: String,
    pub value_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageStatement {
    pub name: SmolStr,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportModifier {
    Public,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub path: String,
    /// Span of the string literal, quotes included.
    pub path_span: Span,
    pub modifier: Option<ImportModifier>,
    pub span: Span,
}

impl ImportStatement {
    pub fn is_public(&self) -> bool {
        self.modifier == Some(ImportModifier::Public)
    }
}

/// One component of an option name; `(my.ext)` parts are extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionNamePart {
    pub name: SmolStr,
    pub is_extension: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionName {
    pub parts: Vec<OptionNamePart>,
    pub span: Span,
}

impl OptionName {
    /// Canonical text, e.g. `(foo.bar).baz` or `features.field_presence`.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| {
                if p.is_extension {
                    format!("({})", p.name)
                } else {
                    p.name.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// True if the name is a single plain identifier equal to `name`.
    pub fn is(&self, name: &str) -> bool {
        matches!(self.parts.as_slice(), [part] if !part.is_extension && part.name == name)
    }

    /// For `features.x.y`, returns `x.y`.
    pub fn feature_path(&self) -> Option<String> {
        let (first, rest) = self.parts.split_first()?;
        if first.is_extension || first.name != "features" || rest.is_empty() {
            return None;
        }
        Some(
            rest.iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join("."),
        )
    }
}

/// `option name = value;`, or one entry of a `[...]` compact option list.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionStatement {
    pub name: OptionName,
    pub value: Constant,
    pub value_span: Span,
    pub span: Span,
}

/// Option values.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Identifier(SmolStr),
    Integer(i128),
    Float(f64),
    String(String),
    Bool(bool),
    /// Message-valued constant written in text format.
    Aggregate(Vec<AggregateField>),
    /// A value the parser could not make sense of.
    Invalid,
}

impl Constant {
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Constant::Identifier(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateField {
    pub name: SmolStr,
    pub value: AggregateValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    Scalar(Constant),
    Message(Vec<AggregateField>),
    List(Vec<AggregateValue>),
}

/// `true` when the options contain `deprecated = true`.
pub fn is_deprecated(options: &[OptionStatement]) -> bool {
    options
        .iter()
        .any(|o| o.name.is("deprecated") && o.value == Constant::Bool(true))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Raw text including the comment markers.
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

// ============================================================================
// TYPES AND RANGES
// ============================================================================

/// A type as written: a scalar keyword or a possibly qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeName {
    pub name: SmolStr,
    pub span: Span,
}

impl TypeName {
    pub fn is_scalar(&self) -> bool {
        crate::base::constants::is_scalar_type(&self.name)
    }

    pub fn is_fully_qualified(&self) -> bool {
        self.name.starts_with('.')
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeEnd {
    Inclusive(i64),
    Max,
}

/// `5`, `5 to 10`, or `5 to max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRange {
    pub start: i64,
    pub end: RangeEnd,
    pub span: Span,
}

impl FieldRange {
    pub fn contains(&self, number: i64) -> bool {
        number >= self.start
            && match self.end {
                RangeEnd::Inclusive(end) => number <= end,
                RangeEnd::Max => true,
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedName {
    pub name: SmolStr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReservedStatement {
    pub ranges: Vec<FieldRange>,
    pub names: Vec<ReservedName>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtensionsStatement {
    pub ranges: Vec<FieldRange>,
    pub options: Vec<OptionStatement>,
    pub span: Span,
}

// ============================================================================
// MESSAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLabel {
    Optional,
    Required,
    Repeated,
}

impl FieldLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldLabel::Optional => "optional",
            FieldLabel::Required => "required",
            FieldLabel::Repeated => "repeated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldDefinition {
    pub label: Option<FieldLabel>,
    pub label_span: Option<Span>,
    pub field_type: TypeName,
    pub name: SmolStr,
    pub name_span: Span,
    pub number: Option<i64>,
    pub number_span: Option<Span>,
    pub options: Vec<OptionStatement>,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapFieldDefinition {
    pub key_type: TypeName,
    pub value_type: TypeName,
    pub name: SmolStr,
    pub name_span: Span,
    pub number: Option<i64>,
    pub number_span: Option<Span>,
    pub options: Vec<OptionStatement>,
    pub doc: Option<String>,
    pub span: Span,
}

/// proto2 group: a nested message type and a field in one declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupDefinition {
    pub label: Option<FieldLabel>,
    pub label_span: Option<Span>,
    pub name: SmolStr,
    pub name_span: Span,
    pub number: Option<i64>,
    pub number_span: Option<Span>,
    pub options: Vec<OptionStatement>,
    pub elements: Vec<MessageElement>,
    pub doc: Option<String>,
    pub span: Span,
}

impl GroupDefinition {
    /// The implicit field name is the lower-cased group name.
    pub fn field_name(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OneofElement {
    Field(FieldDefinition),
    Group(GroupDefinition),
    Option(OptionStatement),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OneofDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub elements: Vec<OneofElement>,
    pub doc: Option<String>,
    pub span: Span,
}

impl OneofDefinition {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.elements.iter().filter_map(|e| match e {
            OneofElement::Field(f) => Some(f),
            _ => None,
        })
    }
}

/// Anything that can appear in a message body.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageElement {
    Field(FieldDefinition),
    MapField(MapFieldDefinition),
    Group(GroupDefinition),
    Oneof(OneofDefinition),
    Message(MessageDefinition),
    Enum(EnumDefinition),
    Extend(ExtendDefinition),
    Reserved(ReservedStatement),
    Extensions(ExtensionsStatement),
    Option(OptionStatement),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub elements: Vec<MessageElement>,
    pub doc: Option<String>,
    pub span: Span,
}

/// A numbered field of any flavour, as seen by tag-number checks.
#[derive(Debug, Clone, Copy)]
pub enum NumberedField<'a> {
    Field(&'a FieldDefinition),
    Map(&'a MapFieldDefinition),
    Group(&'a GroupDefinition),
}

impl<'a> NumberedField<'a> {
    pub fn name(&self) -> String {
        match self {
            NumberedField::Field(f) => f.name.to_string(),
            NumberedField::Map(m) => m.name.to_string(),
            NumberedField::Group(g) => g.field_name(),
        }
    }

    pub fn number(&self) -> Option<i64> {
        match self {
            NumberedField::Field(f) => f.number,
            NumberedField::Map(m) => m.number,
            NumberedField::Group(g) => g.number,
        }
    }

    /// Span of the number literal, falling back to the name.
    pub fn number_span(&self) -> Span {
        match self {
            NumberedField::Field(f) => f.number_span.unwrap_or(f.name_span),
            NumberedField::Map(m) => m.number_span.unwrap_or(m.name_span),
            NumberedField::Group(g) => g.number_span.unwrap_or(g.name_span),
        }
    }

    pub fn name_span(&self) -> Span {
        match self {
            NumberedField::Field(f) => f.name_span,
            NumberedField::Map(m) => m.name_span,
            NumberedField::Group(g) => g.name_span,
        }
    }
}

/// Shared accessors over message-like bodies (messages and groups).
pub trait MessageBody {
    fn elements(&self) -> &[MessageElement];

    fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.elements().iter().filter_map(|e| match e {
            MessageElement::Field(f) => Some(f),
            _ => None,
        })
    }

    fn map_fields(&self) -> impl Iterator<Item = &MapFieldDefinition> {
        self.elements().iter().filter_map(|e| match e {
            MessageElement::MapField(m) => Some(m),
            _ => None,
        })
    }

    fn oneofs(&self) -> impl Iterator<Item = &OneofDefinition> {
        self.elements().iter().filter_map(|e| match e {
            MessageElement::Oneof(o) => Some(o),
            _ => None,
        })
    }

    fn nested_messages(&self) -> impl Iterator<Item = &MessageDefinition> {
        self.elements().iter().filter_map(|e| match e {
            MessageElement::Message(m) => Some(m),
            _ => None,
        })
    }

    fn nested_enums(&self) -> impl Iterator<Item = &EnumDefinition> {
        self.elements().iter().filter_map(|e| match e {
            MessageElement::Enum(e) => Some(e),
            _ => None,
        })
    }

    fn reserved(&self) -> impl Iterator<Item = &ReservedStatement> {
        self.elements().iter().filter_map(|e| match e {
            MessageElement::Reserved(r) => Some(r),
            _ => None,
        })
    }

    fn extension_ranges(&self) -> impl Iterator<Item = &ExtensionsStatement> {
        self.elements().iter().filter_map(|e| match e {
            MessageElement::Extensions(x) => Some(x),
            _ => None,
        })
    }

    fn options(&self) -> impl Iterator<Item = &OptionStatement> {
        self.elements().iter().filter_map(|e| match e {
            MessageElement::Option(o) => Some(o),
            _ => None,
        })
    }

    /// Every numbered field in declaration order, oneof members included.
    fn numbered_fields(&self) -> Vec<NumberedField<'_>> {
        let mut out = Vec::new();
        for element in self.elements() {
            match element {
                MessageElement::Field(f) => out.push(NumberedField::Field(f)),
                MessageElement::MapField(m) => out.push(NumberedField::Map(m)),
                MessageElement::Group(g) => out.push(NumberedField::Group(g)),
                MessageElement::Oneof(o) => {
                    for member in &o.elements {
                        match member {
                            OneofElement::Field(f) => out.push(NumberedField::Field(f)),
                            OneofElement::Group(g) => out.push(NumberedField::Group(g)),
                            OneofElement::Option(_) => {}
                        }
                    }
                }
                MessageElement::Message(_)
                | MessageElement::Enum(_)
                | MessageElement::Extend(_)
                | MessageElement::Reserved(_)
                | MessageElement::Extensions(_)
                | MessageElement::Option(_) => {}
            }
        }
        out
    }
}

impl MessageBody for MessageDefinition {
    fn elements(&self) -> &[MessageElement] {
        &self.elements
    }
}

impl MessageBody for GroupDefinition {
    fn elements(&self) -> &[MessageElement] {
        &self.elements
    }
}

// ============================================================================
// ENUMS, SERVICES, EXTENSIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumValue {
    pub name: SmolStr,
    pub name_span: Span,
    pub number: Option<i64>,
    pub number_span: Option<Span>,
    pub options: Vec<OptionStatement>,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub values: Vec<EnumValue>,
    pub options: Vec<OptionStatement>,
    pub reserved: Vec<ReservedStatement>,
    pub doc: Option<String>,
    pub span: Span,
}

impl EnumDefinition {
    pub fn allows_alias(&self) -> bool {
        self.options
            .iter()
            .any(|o| o.name.is("allow_alias") && o.value == Constant::Bool(true))
    }
}

/// Request or response of an rpc.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RpcType {
    pub type_name: TypeName,
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RpcDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub request: RpcType,
    pub response: RpcType,
    pub options: Vec<OptionStatement>,
    pub doc: Option<String>,
    pub span: Span,
}

impl RpcDefinition {
    /// `(stream Req) returns (Resp)` style signature.
    pub fn signature(&self) -> String {
        fn side(t: &RpcType) -> String {
            if t.streaming {
                format!("stream {}", t.type_name.name)
            } else {
                t.type_name.name.to_string()
            }
        }
        format!("({}) returns ({})", side(&self.request), side(&self.response))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub rpcs: Vec<RpcDefinition>,
    pub options: Vec<OptionStatement>,
    pub doc: Option<String>,
    pub span: Span,
}

/// `extend Target { ... }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtendDefinition {
    pub extendee: TypeName,
    pub fields: Vec<FieldDefinition>,
    pub groups: Vec<GroupDefinition>,
    pub doc: Option<String>,
    pub span: Span,
}
