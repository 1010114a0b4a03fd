//! Import path matching and the well-known import table.

use crate::base::constants::uri_path;

/// Every well-known import path, in preload order.
pub const WELL_KNOWN_IMPORTS: &[&str] = &[
    "google/protobuf/any.proto",
    "google/protobuf/api.proto",
    "google/protobuf/descriptor.proto",
    "google/protobuf/duration.proto",
    "google/protobuf/empty.proto",
    "google/protobuf/field_mask.proto",
    "google/protobuf/source_context.proto",
    "google/protobuf/struct.proto",
    "google/protobuf/timestamp.proto",
    "google/protobuf/type.proto",
    "google/protobuf/wrappers.proto",
    "google/type/calendar_period.proto",
    "google/type/color.proto",
    "google/type/date.proto",
    "google/type/datetime.proto",
    "google/type/dayofweek.proto",
    "google/type/decimal.proto",
    "google/type/expr.proto",
    "google/type/fraction.proto",
    "google/type/interval.proto",
    "google/type/latlng.proto",
    "google/type/localized_text.proto",
    "google/type/money.proto",
    "google/type/month.proto",
    "google/type/phone_number.proto",
    "google/type/postal_address.proto",
    "google/type/quaternion.proto",
    "google/type/timeofday.proto",
];

/// Well-known type full name to the import path that defines it.
const CANONICAL_IMPORTS: &[(&str, &str)] = &[
    ("google.protobuf.Any", "google/protobuf/any.proto"),
    ("google.protobuf.Api", "google/protobuf/api.proto"),
    ("google.protobuf.Method", "google/protobuf/api.proto"),
    ("google.protobuf.Mixin", "google/protobuf/api.proto"),
    ("google.protobuf.FileDescriptorSet", "google/protobuf/descriptor.proto"),
    ("google.protobuf.FileDescriptorProto", "google/protobuf/descriptor.proto"),
    ("google.protobuf.DescriptorProto", "google/protobuf/descriptor.proto"),
    ("google.protobuf.FieldDescriptorProto", "google/protobuf/descriptor.proto"),
    ("google.protobuf.EnumDescriptorProto", "google/protobuf/descriptor.proto"),
    ("google.protobuf.ServiceDescriptorProto", "google/protobuf/descriptor.proto"),
    ("google.protobuf.MethodDescriptorProto", "google/protobuf/descriptor.proto"),
    ("google.protobuf.FileOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.MessageOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.FieldOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.OneofOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.EnumOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.EnumValueOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.ServiceOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.MethodOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.ExtensionRangeOptions", "google/protobuf/descriptor.proto"),
    ("google.protobuf.Duration", "google/protobuf/duration.proto"),
    ("google.protobuf.Empty", "google/protobuf/empty.proto"),
    ("google.protobuf.FieldMask", "google/protobuf/field_mask.proto"),
    ("google.protobuf.SourceContext", "google/protobuf/source_context.proto"),
    ("google.protobuf.Struct", "google/protobuf/struct.proto"),
    ("google.protobuf.Value", "google/protobuf/struct.proto"),
    ("google.protobuf.ListValue", "google/protobuf/struct.proto"),
    ("google.protobuf.NullValue", "google/protobuf/struct.proto"),
    ("google.protobuf.Timestamp", "google/protobuf/timestamp.proto"),
    ("google.protobuf.Type", "google/protobuf/type.proto"),
    ("google.protobuf.Field", "google/protobuf/type.proto"),
    ("google.protobuf.Enum", "google/protobuf/type.proto"),
    ("google.protobuf.EnumValue", "google/protobuf/type.proto"),
    ("google.protobuf.Option", "google/protobuf/type.proto"),
    ("google.protobuf.Syntax", "google/protobuf/type.proto"),
    ("google.protobuf.DoubleValue", "google/protobuf/wrappers.proto"),
    ("google.protobuf.FloatValue", "google/protobuf/wrappers.proto"),
    ("google.protobuf.Int64Value", "google/protobuf/wrappers.proto"),
    ("google.protobuf.UInt64Value", "google/protobuf/wrappers.proto"),
    ("google.protobuf.Int32Value", "google/protobuf/wrappers.proto"),
    ("google.protobuf.UInt32Value", "google/protobuf/wrappers.proto"),
    ("google.protobuf.BoolValue", "google/protobuf/wrappers.proto"),
    ("google.protobuf.StringValue", "google/protobuf/wrappers.proto"),
    ("google.protobuf.BytesValue", "google/protobuf/wrappers.proto"),
    ("google.type.CalendarPeriod", "google/type/calendar_period.proto"),
    ("google.type.Color", "google/type/color.proto"),
    ("google.type.Date", "google/type/date.proto"),
    ("google.type.DateTime", "google/type/datetime.proto"),
    ("google.type.TimeZone", "google/type/datetime.proto"),
    ("google.type.DayOfWeek", "google/type/dayofweek.proto"),
    ("google.type.Decimal", "google/type/decimal.proto"),
    ("google.type.Expr", "google/type/expr.proto"),
    ("google.type.Fraction", "google/type/fraction.proto"),
    ("google.type.Interval", "google/type/interval.proto"),
    ("google.type.LatLng", "google/type/latlng.proto"),
    ("google.type.LocalizedText", "google/type/localized_text.proto"),
    ("google.type.Money", "google/type/money.proto"),
    ("google.type.Month", "google/type/month.proto"),
    ("google.type.PhoneNumber", "google/type/phone_number.proto"),
    ("google.type.PostalAddress", "google/type/postal_address.proto"),
    ("google.type.Quaternion", "google/type/quaternion.proto"),
    ("google.type.TimeOfDay", "google/type/timeofday.proto"),
];

/// The canonical import path for a well-known type, given its full name
/// with or without a leading dot. Nested types map through their outermost
/// message.
pub fn canonical_import(full_name: &str) -> Option<&'static str> {
    let full_name = full_name.strip_prefix('.').unwrap_or(full_name);
    CANONICAL_IMPORTS
        .iter()
        .find(|(name, _)| {
            full_name == *name
                || full_name
                    .strip_prefix(name)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
        .map(|(_, path)| *path)
}

/// Whether a document URI can satisfy `import "<import_path>"`.
pub fn import_matches(uri: &str, import_path: &str) -> bool {
    if import_path.is_empty() {
        return false;
    }
    let path = uri_path(uri);
    path == import_path
        || path
            .strip_suffix(import_path)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

/// Whether the import path matches exactly, not by suffix.
pub fn import_matches_exactly(uri: &str, import_path: &str) -> bool {
    uri_path(uri) == import_path
}
