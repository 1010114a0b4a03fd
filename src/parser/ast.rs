//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode and provides methods to access children.
//! Accessors never fail on malformed input; they return `None` or an empty
//! iterator when a piece is missing.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

// ============================================================================
// Helper utilities
// ============================================================================

/// Direct child tokens of a node, trivia excluded.
fn significant_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
}

/// First direct child token of the given kind.
fn find_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    significant_tokens(node).find(|t| t.kind() == kind)
}

/// The first direct IDENT child with the given text.
fn find_keyword(node: &SyntaxNode, keyword: &str) -> Option<SyntaxToken> {
    significant_tokens(node).find(|t| t.kind() == SyntaxKind::IDENT && t.text() == keyword)
}

/// Concatenated text of the node without trivia.
fn text_without_trivia(node: &SyntaxNode) -> String {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
        .map(|t| t.text().to_string())
        .collect()
}

/// The `'-'? INT` following `=` among a node's direct tokens.
fn number_after_eq(node: &SyntaxNode) -> Option<(bool, SyntaxToken)> {
    let mut tokens = significant_tokens(node).skip_while(|t| t.kind() != SyntaxKind::EQ);
    tokens.next()?;
    let first = tokens.next()?;
    match first.kind() {
        SyntaxKind::INT => Some((false, first)),
        SyntaxKind::MINUS => tokens
            .next()
            .filter(|t| t.kind() == SyntaxKind::INT)
            .map(|t| (true, t)),
        _ => None,
    }
}

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;

    /// Find all descendant nodes of a specific AST type
    fn descendants<T: AstNode>(&self) -> impl Iterator<Item = T> {
        self.syntax().descendants().filter_map(T::cast)
    }
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

/// Macro to generate a method that finds the first child of a specific AST type.
macro_rules! first_child_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get the first `", stringify!($type), "` child of this node.")]
        pub fn $name(&self) -> Option<$type> {
            self.0.children().find_map($type::cast)
        }
    };
}

/// Macro to generate a method that returns an iterator over children of a specific AST type.
macro_rules! children_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get all `", stringify!($type), "` children of this node.")]
        pub fn $name(&self) -> impl Iterator<Item = $type> + '_ {
            self.0.children().filter_map($type::cast)
        }
    };
}

/// Macro to generate a `number()` accessor for `name = N` declarations.
macro_rules! number_method {
    () => {
        /// The `(negative, INT token)` pair after `=`.
        pub fn number(&self) -> Option<(bool, SyntaxToken)> {
            number_after_eq(&self.0)
        }
    };
}

/// Macro to generate the `compact_options()` accessor.
macro_rules! compact_options_method {
    () => {
        /// Entries of the trailing `[...]` option list.
        pub fn compact_options(&self) -> Vec<OptionDecl> {
            self.0
                .children()
                .find_map(CompactOptions::cast)
                .map(|c| c.options().collect())
                .unwrap_or_default()
        }
    };
}

// ============================================================================
// File
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    first_child_method!(package, PackageDecl);
    children_method!(imports, ImportDecl);
    children_method!(options, OptionDecl);

    pub fn syntax_decl(&self) -> Option<SyntaxDecl> {
        self.0.children().find_map(SyntaxDecl::cast)
    }

    pub fn syntax_decls(&self) -> impl Iterator<Item = SyntaxDecl> + '_ {
        self.0.children().filter_map(SyntaxDecl::cast)
    }

    pub fn packages(&self) -> impl Iterator<Item = PackageDecl> + '_ {
        self.0.children().filter_map(PackageDecl::cast)
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }
}

/// Top-level definitions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Message(MessageDef),
    Enum(EnumDef),
    Service(ServiceDef),
    Extend(ExtendDef),
}

impl AstNode for Item {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::MESSAGE_DEF
                | SyntaxKind::ENUM_DEF
                | SyntaxKind::SERVICE_DEF
                | SyntaxKind::EXTEND_DEF
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::MESSAGE_DEF => Some(Self::Message(MessageDef(node))),
            SyntaxKind::ENUM_DEF => Some(Self::Enum(EnumDef(node))),
            SyntaxKind::SERVICE_DEF => Some(Self::Service(ServiceDef(node))),
            SyntaxKind::EXTEND_DEF => Some(Self::Extend(ExtendDef(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Message(n) => n.syntax(),
            Self::Enum(n) => n.syntax(),
            Self::Service(n) => n.syntax(),
            Self::Extend(n) => n.syntax(),
        }
    }
}

/// `syntax = "..."` or `edition = "..."`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxDecl(pub(crate) SyntaxNode);

impl AstNode for SyntaxDecl {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, SyntaxKind::SYNTAX_DECL | SyntaxKind::EDITION_DECL)
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self(node))
        } else {
            None
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

impl SyntaxDecl {
    pub fn is_edition(&self) -> bool {
        self.0.kind() == SyntaxKind::EDITION_DECL
    }

    /// Value tokens after `=`: one or more strings, or a bare INT/IDENT.
    pub fn value_tokens(&self) -> Vec<SyntaxToken> {
        significant_tokens(&self.0)
            .skip_while(|t| t.kind() != SyntaxKind::EQ)
            .skip(1)
            .filter(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::STRING | SyntaxKind::INT | SyntaxKind::IDENT
                )
            })
            .collect()
    }
}

ast_node!(PackageDecl, PACKAGE_DECL);

impl PackageDecl {
    first_child_method!(name, FullIdent);
}

/// `import public "path";`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Public,
    Weak,
}

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    pub fn kind(&self) -> ImportKind {
        if find_keyword(&self.0, "public").is_some() {
            ImportKind::Public
        } else if find_keyword(&self.0, "weak").is_some() {
            ImportKind::Weak
        } else {
            ImportKind::Default
        }
    }

    pub fn path_tokens(&self) -> Vec<SyntaxToken> {
        significant_tokens(&self.0)
            .filter(|t| t.kind() == SyntaxKind::STRING)
            .collect()
    }
}

// ============================================================================
// Names
// ============================================================================

ast_node!(Name, NAME);

impl Name {
    pub fn ident(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::IDENT)
    }

    pub fn text(&self) -> String {
        self.ident().map(|t| t.text().to_string()).unwrap_or_default()
    }
}

ast_node!(FullIdent, FULL_IDENT);

impl FullIdent {
    pub fn text(&self) -> String {
        text_without_trivia(&self.0)
    }
}

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    /// Type name as written, leading dot included.
    pub fn text(&self) -> String {
        text_without_trivia(&self.0)
    }
}

// ============================================================================
// Options and constants
// ============================================================================

ast_node!(OptionDecl, OPTION_DECL);

impl OptionDecl {
    first_child_method!(name, OptionName);

    pub fn value(&self) -> Option<OptionValue> {
        self.0.children().find_map(OptionValue::cast)
    }
}

/// One part of an option name, as `(text, is_extension)`.
pub type OptionNamePart = (String, bool);

ast_node!(OptionName, OPTION_NAME);

impl OptionName {
    pub fn parts(&self) -> Vec<OptionNamePart> {
        let mut parts = Vec::new();
        let mut in_parens = false;
        let mut extension = String::new();
        for element in self.0.children_with_tokens() {
            match element {
                rowan::NodeOrToken::Token(t) => match t.kind() {
                    SyntaxKind::L_PAREN => {
                        in_parens = true;
                        extension.clear();
                    }
                    SyntaxKind::R_PAREN => {
                        in_parens = false;
                        parts.push((std::mem::take(&mut extension), true));
                    }
                    SyntaxKind::DOT if in_parens => extension.push('.'),
                    SyntaxKind::IDENT => parts.push((t.text().to_string(), false)),
                    _ => {}
                },
                rowan::NodeOrToken::Node(n) => {
                    if let Some(ident) = FullIdent::cast(n) {
                        extension.push_str(&ident.text());
                    }
                }
            }
        }
        parts
    }
}

ast_node!(CompactOptions, COMPACT_OPTIONS);

impl CompactOptions {
    children_method!(options, OptionDecl);
}

/// Right-hand side of an option or aggregate field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Constant(Constant),
    Aggregate(Aggregate),
    List(AggregateList),
}

impl AstNode for OptionValue {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::CONSTANT | SyntaxKind::AGGREGATE | SyntaxKind::AGGREGATE_LIST
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::CONSTANT => Some(Self::Constant(Constant(node))),
            SyntaxKind::AGGREGATE => Some(Self::Aggregate(Aggregate(node))),
            SyntaxKind::AGGREGATE_LIST => Some(Self::List(AggregateList(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Constant(n) => n.syntax(),
            Self::Aggregate(n) => n.syntax(),
            Self::List(n) => n.syntax(),
        }
    }
}

ast_node!(Constant, CONSTANT);

impl Constant {
    first_child_method!(ident, FullIdent);

    /// Literal tokens, sign included.
    pub fn tokens(&self) -> Vec<SyntaxToken> {
        significant_tokens(&self.0).collect()
    }
}

ast_node!(Aggregate, AGGREGATE);

impl Aggregate {
    children_method!(fields, AggregateField);
}

ast_node!(AggregateField, AGGREGATE_FIELD);

impl AggregateField {
    /// Field name; extension names are rendered as `[a.b]` or `[a/b]`.
    pub fn name(&self) -> String {
        if let Some(name) = self.0.children().find_map(Name::cast) {
            return name.text();
        }
        let idents: Vec<String> = self
            .0
            .children()
            .filter_map(FullIdent::cast)
            .map(|i| i.text())
            .collect();
        format!("[{}]", idents.join("/"))
    }

    pub fn value(&self) -> Option<OptionValue> {
        self.0.children().find_map(OptionValue::cast)
    }
}

ast_node!(AggregateList, AGGREGATE_LIST);

impl AggregateList {
    children_method!(values, OptionValue);
}

// ============================================================================
// Messages
// ============================================================================

/// `optional` / `required` / `repeated` token of a field or group
fn label_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    significant_tokens(node)
        .next()
        .filter(|t| matches!(t.text(), "optional" | "required" | "repeated"))
}

ast_node!(MessageDef, MESSAGE_DEF);

impl MessageDef {
    first_child_method!(name, Name);
    first_child_method!(body, MessageBody);
}

ast_node!(MessageBody, MESSAGE_BODY);

impl MessageBody {
    children_method!(elements, MessageElement);
}

/// Anything that can appear in a message body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageElement {
    Field(FieldDef),
    MapField(MapFieldDef),
    Group(GroupDef),
    Oneof(OneofDef),
    Message(MessageDef),
    Enum(EnumDef),
    Extend(ExtendDef),
    Reserved(ReservedDecl),
    Extensions(ExtensionsDecl),
    Option(OptionDecl),
}

impl AstNode for MessageElement {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::FIELD_DEF
                | SyntaxKind::MAP_FIELD_DEF
                | SyntaxKind::GROUP_DEF
                | SyntaxKind::ONEOF_DEF
                | SyntaxKind::MESSAGE_DEF
                | SyntaxKind::ENUM_DEF
                | SyntaxKind::EXTEND_DEF
                | SyntaxKind::RESERVED_DECL
                | SyntaxKind::EXTENSIONS_DECL
                | SyntaxKind::OPTION_DECL
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let element = match node.kind() {
            SyntaxKind::FIELD_DEF => Self::Field(FieldDef(node)),
            SyntaxKind::MAP_FIELD_DEF => Self::MapField(MapFieldDef(node)),
            SyntaxKind::GROUP_DEF => Self::Group(GroupDef(node)),
            SyntaxKind::ONEOF_DEF => Self::Oneof(OneofDef(node)),
            SyntaxKind::MESSAGE_DEF => Self::Message(MessageDef(node)),
            SyntaxKind::ENUM_DEF => Self::Enum(EnumDef(node)),
            SyntaxKind::EXTEND_DEF => Self::Extend(ExtendDef(node)),
            SyntaxKind::RESERVED_DECL => Self::Reserved(ReservedDecl(node)),
            SyntaxKind::EXTENSIONS_DECL => Self::Extensions(ExtensionsDecl(node)),
            SyntaxKind::OPTION_DECL => Self::Option(OptionDecl(node)),
            _ => return None,
        };
        Some(element)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Field(n) => n.syntax(),
            Self::MapField(n) => n.syntax(),
            Self::Group(n) => n.syntax(),
            Self::Oneof(n) => n.syntax(),
            Self::Message(n) => n.syntax(),
            Self::Enum(n) => n.syntax(),
            Self::Extend(n) => n.syntax(),
            Self::Reserved(n) => n.syntax(),
            Self::Extensions(n) => n.syntax(),
            Self::Option(n) => n.syntax(),
        }
    }
}

ast_node!(FieldDef, FIELD_DEF);

impl FieldDef {
    first_child_method!(type_ref, TypeRef);
    first_child_method!(name, Name);
    number_method!();
    compact_options_method!();

    pub fn label(&self) -> Option<SyntaxToken> {
        label_token(&self.0)
    }
}

ast_node!(MapFieldDef, MAP_FIELD_DEF);

impl MapFieldDef {
    first_child_method!(name, Name);
    number_method!();
    compact_options_method!();

    pub fn key_type(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn value_type(&self) -> Option<TypeRef> {
        self.0.children().filter_map(TypeRef::cast).nth(1)
    }
}

ast_node!(GroupDef, GROUP_DEF);

impl GroupDef {
    first_child_method!(name, Name);
    first_child_method!(body, MessageBody);
    number_method!();
    compact_options_method!();

    pub fn label(&self) -> Option<SyntaxToken> {
        label_token(&self.0)
    }
}

ast_node!(OneofDef, ONEOF_DEF);

impl OneofDef {
    first_child_method!(name, Name);

    /// Fields, groups and options in source order.
    pub fn elements(&self) -> impl Iterator<Item = MessageElement> + '_ {
        self.0.children().filter_map(MessageElement::cast)
    }
}

// ============================================================================
// Ranges
// ============================================================================

ast_node!(Range, RANGE);

impl Range {
    /// `(negative, INT)` of the start.
    pub fn start(&self) -> Option<(bool, SyntaxToken)> {
        let mut tokens = significant_tokens(&self.0);
        let first = tokens.next()?;
        match first.kind() {
            SyntaxKind::INT => Some((false, first)),
            SyntaxKind::MINUS => tokens.next().map(|t| (true, t)),
            _ => None,
        }
    }

    /// `None` for single numbers, `Some(None)` for `to max`.
    pub fn end(&self) -> Option<Option<(bool, SyntaxToken)>> {
        let mut tokens = significant_tokens(&self.0)
            .skip_while(|t| !(t.kind() == SyntaxKind::IDENT && t.text() == "to"));
        tokens.next()?;
        let Some(first) = tokens.next() else {
            return Some(None);
        };
        Some(match first.kind() {
            SyntaxKind::IDENT => None,
            SyntaxKind::MINUS => tokens.next().map(|t| (true, t)),
            _ => Some((false, first)),
        })
    }
}

ast_node!(ReservedDecl, RESERVED_DECL);

impl ReservedDecl {
    children_method!(ranges, Range);

    /// Quoted names as STRING tokens and bare names as IDENT tokens.
    pub fn names(&self) -> Vec<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| match e {
                rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::STRING => Some(t),
                rowan::NodeOrToken::Node(n) => Name::cast(n).and_then(|n| n.ident()),
                _ => None,
            })
            .collect()
    }
}

ast_node!(ExtensionsDecl, EXTENSIONS_DECL);

impl ExtensionsDecl {
    children_method!(ranges, Range);
    compact_options_method!();
}

// ============================================================================
// Enums
// ============================================================================

ast_node!(EnumDef, ENUM_DEF);

impl EnumDef {
    first_child_method!(name, Name);
    first_child_method!(body, EnumBody);
}

ast_node!(EnumBody, ENUM_BODY);

impl EnumBody {
    children_method!(values, EnumValueDef);
    children_method!(options, OptionDecl);
    children_method!(reserved, ReservedDecl);
}

ast_node!(EnumValueDef, ENUM_VALUE);

impl EnumValueDef {
    first_child_method!(name, Name);
    number_method!();
    compact_options_method!();
}

// ============================================================================
// Services
// ============================================================================

ast_node!(ServiceDef, SERVICE_DEF);

impl ServiceDef {
    first_child_method!(name, Name);
    first_child_method!(body, ServiceBody);
}

ast_node!(ServiceBody, SERVICE_BODY);

impl ServiceBody {
    children_method!(rpcs, RpcDef);
    children_method!(options, OptionDecl);
}

ast_node!(RpcDef, RPC_DEF);

impl RpcDef {
    first_child_method!(name, Name);
    children_method!(options, OptionDecl);

    pub fn request(&self) -> Option<RpcType> {
        self.0.children().find_map(RpcType::cast)
    }

    pub fn response(&self) -> Option<RpcType> {
        self.0.children().filter_map(RpcType::cast).nth(1)
    }

    /// The opening `{` of the options block, if any.
    pub fn l_brace(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::L_BRACE)
    }
}

ast_node!(RpcType, RPC_TYPE);

impl RpcType {
    first_child_method!(type_ref, TypeRef);

    pub fn is_streaming(&self) -> bool {
        find_keyword(&self.0, "stream").is_some()
    }
}

// ============================================================================
// Extend
// ============================================================================

ast_node!(ExtendDef, EXTEND_DEF);

impl ExtendDef {
    first_child_method!(extendee, TypeRef);
    first_child_method!(body, MessageBody);
}
