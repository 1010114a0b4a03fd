//! Domain constants shared across layers.

/// File extension of protobuf schema files.
pub const PROTO_FILE_EXTENSION: &str = "proto";

/// URI scheme prefix for documents synthesized from inline fallback content.
pub const BUILTIN_URI_PREFIX: &str = "builtin:///";

/// URI scheme prefix for documents read from disk.
pub const FILE_URI_PREFIX: &str = "file://";

/// Scalar value types; these never resolve through the symbol table.
pub const SCALAR_TYPES: &[&str] = &[
    "double", "float", "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32",
    "fixed64", "sfixed32", "sfixed64", "bool", "string", "bytes",
];

/// Types allowed as map keys.
pub const MAP_KEY_TYPES: &[&str] = &[
    "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32", "fixed64", "sfixed32",
    "sfixed64", "bool", "string",
];

/// Largest legal field number (2^29 - 1).
pub const MAX_FIELD_NUMBER: i64 = 536_870_911;

/// Field numbers reserved for the protobuf implementation.
pub const RESERVED_IMPLEMENTATION_RANGE: (i64, i64) = (19_000, 19_999);

/// Deepest message or group nesting either parser descends into. Bodies
/// below this level are skipped with a syntax error.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Path segments that mark external dependency (vendored) code.
pub const EXTERNAL_DEPENDENCY_SEGMENTS: &[&str] = &[
    "node_modules",
    "vendor",
    "third_party",
    "third-party",
    ".buf",
    "buf_modules",
    "external",
];

/// Editions understood by the diagnostics engine.
pub const SUPPORTED_EDITIONS: &[&str] = &["2023", "2024"];

pub fn is_scalar_type(name: &str) -> bool {
    SCALAR_TYPES.contains(&name)
}

/// Strip the scheme from a `file://` or `builtin:///` URI, leaving a path.
pub fn uri_path(uri: &str) -> &str {
    if let Some(rest) = uri.strip_prefix(BUILTIN_URI_PREFIX) {
        rest
    } else if let Some(rest) = uri.strip_prefix(FILE_URI_PREFIX) {
        rest
    } else {
        uri
    }
}

/// Whether the URI lies under a vendored dependency directory or is synthesized.
pub fn is_external_dependency(uri: &str) -> bool {
    if uri.starts_with(BUILTIN_URI_PREFIX) {
        return true;
    }
    uri_path(uri)
        .split(['/', '\\'])
        .any(|segment| EXTERNAL_DEPENDENCY_SEGMENTS.contains(&segment))
}
