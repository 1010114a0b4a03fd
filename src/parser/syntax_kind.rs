//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Protobuf keywords are contextual, so they are lexed as `IDENT` and only
//! distinguished by the node that contains them.

/// All syntax kinds (tokens and nodes) in a protobuf schema
///
/// Tokens are leaf nodes (identifiers, literals, punctuation).
/// Nodes are composite (messages, fields, services).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,     // identifier or contextual keyword
    INT,       // 42, 0x2A, 052
    FLOAT,     // 3.14, .5, 1e10
    STRING,    // "hello" or 'hello'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,   // {
    R_BRACE,   // }
    L_BRACKET, // [
    R_BRACKET, // ]
    L_PAREN,   // (
    R_PAREN,   // )
    L_ANGLE,   // <
    R_ANGLE,   // >
    SEMICOLON, // ;
    COMMA,     // ,
    DOT,       // .
    EQ,        // =
    MINUS,     // -
    PLUS,      // +
    COLON,     // :
    SLASH,     // /

    /// Unrecognized input, or a node wrapping skipped tokens
    ERROR,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    SYNTAX_DECL,
    EDITION_DECL,
    PACKAGE_DECL,
    IMPORT_DECL,
    OPTION_DECL,
    OPTION_NAME,
    COMPACT_OPTIONS,
    CONSTANT,
    AGGREGATE,
    AGGREGATE_FIELD,
    AGGREGATE_LIST,
    FULL_IDENT,
    NAME,
    TYPE_REF,
    MESSAGE_DEF,
    MESSAGE_BODY,
    FIELD_DEF,
    MAP_FIELD_DEF,
    GROUP_DEF,
    ONEOF_DEF,
    ENUM_DEF,
    ENUM_BODY,
    ENUM_VALUE,
    SERVICE_DEF,
    SERVICE_BODY,
    RPC_DEF,
    RPC_TYPE,
    EXTEND_DEF,
    RESERVED_DECL,
    EXTENSIONS_DECL,
    RANGE,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a comment token
    pub fn is_comment(self) -> bool {
        matches!(self, Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::SLASH as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(self, Self::IDENT | Self::INT | Self::FLOAT | Self::STRING)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtoLanguage {}

impl rowan::Language for ProtoLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<ProtoLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<ProtoLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<ProtoLanguage>;
