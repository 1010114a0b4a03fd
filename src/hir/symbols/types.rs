//! Symbol and type-reference types.

use std::sync::Arc;

use crate::base::Span;

// ============================================================================
// SYMBOLS
// ============================================================================

/// A named element registered in the workspace symbol table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HirSymbol {
    /// The simple name as written.
    pub name: Arc<str>,
    /// Package- and nesting-qualified name, e.g. `pkg.Outer.Inner`.
    pub full_name: Arc<str>,
    /// Full name of the enclosing symbol, `None` at file level.
    pub container: Option<Arc<str>>,
    pub kind: SymbolKind,
    /// The document that defines this symbol.
    pub uri: Arc<str>,
    /// Span of the whole declaration.
    pub range: Span,
    /// Span of the identifier.
    pub name_range: Span,
    pub doc: Option<Arc<str>>,
    /// Short description: field type, rpc signature, enum value number.
    pub detail: Option<Arc<str>>,
    /// Declared with `deprecated = true`.
    pub deprecated: bool,
}

/// The kind of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Message,
    /// The message type declared by a proto2 group.
    Group,
    Enum,
    /// Registered as `Enum.VALUE`.
    EnumValue,
    Service,
    Rpc,
    Field,
    MapField,
    Oneof,
    /// A field declared inside an `extend` block.
    Extension,
}

impl SymbolKind {
    /// Kinds that can appear as a field or rpc type.
    pub fn is_type(self) -> bool {
        matches!(self, Self::Message | Self::Group | Self::Enum)
    }

    /// Kinds that can be the target of `extend`.
    pub fn is_message(self) -> bool {
        matches!(self, Self::Message | Self::Group)
    }

    /// Get a display string for this kind.
    pub fn display(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Group => "group",
            Self::Enum => "enum",
            Self::EnumValue => "enum value",
            Self::Service => "service",
            Self::Rpc => "rpc",
            Self::Field => "field",
            Self::MapField => "map field",
            Self::Oneof => "oneof",
            Self::Extension => "extension",
        }
    }
}

// ============================================================================
// TYPE REFERENCES
// ============================================================================

/// Where a type name was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeRefKind {
    FieldType,
    MapValueType,
    RpcRequest,
    RpcResponse,
    /// The target of an `extend` block.
    Extendee,
}

impl TypeRefKind {
    /// Whether a symbol of `kind` is a valid target for this reference.
    pub fn accepts(self, kind: SymbolKind) -> bool {
        match self {
            TypeRefKind::Extendee | TypeRefKind::RpcRequest | TypeRefKind::RpcResponse => {
                kind.is_message()
            }
            TypeRefKind::FieldType | TypeRefKind::MapValueType => kind.is_type(),
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            TypeRefKind::FieldType => "field type",
            TypeRefKind::MapValueType => "map value type",
            TypeRefKind::RpcRequest => "rpc request",
            TypeRefKind::RpcResponse => "rpc response",
            TypeRefKind::Extendee => "extend target",
        }
    }
}

/// A type name occurrence, prior to resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    /// The name as written, possibly qualified or with a leading dot.
    pub name: Arc<str>,
    pub span: Span,
    /// Full name of the scope the name is looked up from.
    pub scope: Arc<str>,
    pub kind: TypeRefKind,
    /// Full name of the symbol containing the reference (the field, the rpc,
    /// or the scope of an `extend` block).
    pub source: Arc<str>,
}

/// Symbols and references contributed by one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileSymbols {
    /// Symbols in depth-first declaration order.
    pub symbols: Vec<HirSymbol>,
    pub type_refs: Vec<TypeRef>,
}
