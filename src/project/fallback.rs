//! Inline bodies for the well-known protos.
//!
//! These declare the types and fields editors resolve against. They are used
//! only when no copy of a proto exists on disk.

/// The inline body for a well-known import path.
pub fn fallback_source(path: &str) -> Option<&'static str> {
    let source = match path {
        "google/protobuf/any.proto" => ANY,
        "google/protobuf/api.proto" => API,
        "google/protobuf/descriptor.proto" => DESCRIPTOR,
        "google/protobuf/duration.proto" => DURATION,
        "google/protobuf/empty.proto" => EMPTY,
        "google/protobuf/field_mask.proto" => FIELD_MASK,
        "google/protobuf/source_context.proto" => SOURCE_CONTEXT,
        "google/protobuf/struct.proto" => STRUCT,
        "google/protobuf/timestamp.proto" => TIMESTAMP,
        "google/protobuf/type.proto" => TYPE,
        "google/protobuf/wrappers.proto" => WRAPPERS,
        "google/type/calendar_period.proto" => CALENDAR_PERIOD,
        "google/type/color.proto" => COLOR,
        "google/type/date.proto" => DATE,
        "google/type/datetime.proto" => DATETIME,
        "google/type/dayofweek.proto" => DAYOFWEEK,
        "google/type/decimal.proto" => DECIMAL,
        "google/type/expr.proto" => EXPR,
        "google/type/fraction.proto" => FRACTION,
        "google/type/interval.proto" => INTERVAL,
        "google/type/latlng.proto" => LATLNG,
        "google/type/localized_text.proto" => LOCALIZED_TEXT,
        "google/type/money.proto" => MONEY,
        "google/type/month.proto" => MONTH,
        "google/type/phone_number.proto" => PHONE_NUMBER,
        "google/type/postal_address.proto" => POSTAL_ADDRESS,
        "google/type/quaternion.proto" => QUATERNION,
        "google/type/timeofday.proto" => TIMEOFDAY,
        _ => return None,
    };
    Some(source)
}

// ============================================================================
// google/protobuf
// ============================================================================

const ANY: &str = r#"syntax = "proto3";

package google.protobuf;

// `Any` contains an arbitrary serialized protocol buffer message along with a
// URL that describes the type of the serialized message.
message Any {
  string type_url = 1;
  bytes value = 2;
}
"#;

const API: &str = r#"syntax = "proto3";

package google.protobuf;

import "google/protobuf/source_context.proto";
import "google/protobuf/type.proto";

// Api is a light-weight descriptor for an API Interface.
message Api {
  string name = 1;
  repeated Method methods = 2;
  repeated Option options = 3;
  string version = 4;
  SourceContext source_context = 5;
  repeated Mixin mixins = 6;
  Syntax syntax = 7;
}

// Method represents a method of an API interface.
message Method {
  string name = 1;
  string request_type_url = 2;
  bool request_streaming = 3;
  string response_type_url = 4;
  bool response_streaming = 5;
  repeated Option options = 6;
  Syntax syntax = 7;
}

// Declares an API Interface to be included in this interface.
message Mixin {
  string name = 1;
  string root = 2;
}
"#;

const DESCRIPTOR: &str = r#"syntax = "proto2";

package google.protobuf;

// The protocol compiler can output a FileDescriptorSet containing the .proto
// files it parses.
message FileDescriptorSet {
  repeated FileDescriptorProto file = 1;
}

// Describes a complete .proto file.
message FileDescriptorProto {
  optional string name = 1;
  optional string package = 2;
  repeated string dependency = 3;
  repeated int32 public_dependency = 10;
  repeated int32 weak_dependency = 11;
  repeated DescriptorProto message_type = 4;
  repeated EnumDescriptorProto enum_type = 5;
  repeated ServiceDescriptorProto service = 6;
  repeated FieldDescriptorProto extension = 7;
  optional FileOptions options = 8;
  optional string syntax = 12;
  optional string edition = 14;
}

// Describes a message type.
message DescriptorProto {
  optional string name = 1;
  repeated FieldDescriptorProto field = 2;
  repeated FieldDescriptorProto extension = 6;
  repeated DescriptorProto nested_type = 3;
  repeated EnumDescriptorProto enum_type = 4;
  optional MessageOptions options = 7;
  repeated string reserved_name = 10;
}

// Describes a field within a message.
message FieldDescriptorProto {
  enum Type {
    TYPE_DOUBLE = 1;
    TYPE_FLOAT = 2;
    TYPE_INT64 = 3;
    TYPE_UINT64 = 4;
    TYPE_INT32 = 5;
    TYPE_FIXED64 = 6;
    TYPE_FIXED32 = 7;
    TYPE_BOOL = 8;
    TYPE_STRING = 9;
    TYPE_GROUP = 10;
    TYPE_MESSAGE = 11;
    TYPE_BYTES = 12;
    TYPE_UINT32 = 13;
    TYPE_ENUM = 14;
    TYPE_SFIXED32 = 15;
    TYPE_SFIXED64 = 16;
    TYPE_SINT32 = 17;
    TYPE_SINT64 = 18;
  }

  enum Label {
    LABEL_OPTIONAL = 1;
    LABEL_REPEATED = 3;
    LABEL_REQUIRED = 2;
  }

  optional string name = 1;
  optional int32 number = 3;
  optional Label label = 4;
  optional Type type = 5;
  optional string type_name = 6;
  optional string extendee = 2;
  optional string default_value = 7;
  optional int32 oneof_index = 9;
  optional string json_name = 10;
  optional FieldOptions options = 8;
  optional bool proto3_optional = 17;
}

// Describes an enum type.
message EnumDescriptorProto {
  optional string name = 1;
  repeated string value = 2;
  optional EnumOptions options = 3;
  repeated string reserved_name = 5;
}

// Describes a service.
message ServiceDescriptorProto {
  optional string name = 1;
  repeated MethodDescriptorProto method = 2;
  optional ServiceOptions options = 3;
}

// Describes a method of a service.
message MethodDescriptorProto {
  optional string name = 1;
  optional string input_type = 2;
  optional string output_type = 3;
  optional MethodOptions options = 4;
  optional bool client_streaming = 5 [default = false];
  optional bool server_streaming = 6 [default = false];
}

message FileOptions {
  optional string java_package = 1;
  optional string java_outer_classname = 8;
  optional bool java_multiple_files = 10 [default = false];
  optional string go_package = 11;
  optional bool deprecated = 23 [default = false];
  optional bool cc_enable_arenas = 31 [default = true];
  optional string objc_class_prefix = 36;
  optional string csharp_namespace = 37;
  optional string swift_prefix = 39;
  optional string php_namespace = 41;
  optional string ruby_package = 45;

  extensions 1000 to max;
}

message MessageOptions {
  optional bool message_set_wire_format = 1 [default = false];
  optional bool deprecated = 3 [default = false];
  optional bool map_entry = 7;

  extensions 1000 to max;
}

message FieldOptions {
  optional bool packed = 2;
  optional bool lazy = 5 [default = false];
  optional bool deprecated = 3 [default = false];
  optional bool weak = 10 [default = false];
  optional string json_name = 11;

  extensions 1000 to max;
}

message OneofOptions {
  extensions 1000 to max;
}

message EnumOptions {
  optional bool allow_alias = 2;
  optional bool deprecated = 3 [default = false];

  extensions 1000 to max;
}

message EnumValueOptions {
  optional bool deprecated = 1 [default = false];

  extensions 1000 to max;
}

message ServiceOptions {
  optional bool deprecated = 33 [default = false];

  extensions 1000 to max;
}

message MethodOptions {
  optional bool deprecated = 33 [default = false];

  extensions 1000 to max;
}

message ExtensionRangeOptions {
  extensions 1000 to max;
}
"#;

const DURATION: &str = r#"syntax = "proto3";

package google.protobuf;

// A signed, fixed-length span of time.
message Duration {
  int64 seconds = 1;
  int32 nanos = 2;
}
"#;

const EMPTY: &str = r#"syntax = "proto3";

package google.protobuf;

// A generic empty message that you can re-use to avoid defining duplicated
// empty messages in your APIs.
message Empty {}
"#;

const FIELD_MASK: &str = r#"syntax = "proto3";

package google.protobuf;

// `FieldMask` represents a set of symbolic field paths.
message FieldMask {
  repeated string paths = 1;
}
"#;

const SOURCE_CONTEXT: &str = r#"syntax = "proto3";

package google.protobuf;

// `SourceContext` represents information about the source of a
// protobuf element, like the file in which it is defined.
message SourceContext {
  string file_name = 1;
}
"#;

const STRUCT: &str = r#"syntax = "proto3";

package google.protobuf;

// `Struct` represents a structured data value, consisting of fields
// which map to dynamically typed values.
message Struct {
  map<string, Value> fields = 1;
}

// `Value` represents a dynamically typed value.
message Value {
  oneof kind {
    NullValue null_value = 1;
    double number_value = 2;
    string string_value = 3;
    bool bool_value = 4;
    Struct struct_value = 5;
    ListValue list_value = 6;
  }
}

// `NullValue` is a singleton enumeration to represent the null value.
enum NullValue {
  NULL_VALUE = 0;
}

// `ListValue` is a wrapper around a repeated field of values.
message ListValue {
  repeated Value values = 1;
}
"#;

const TIMESTAMP: &str = r#"syntax = "proto3";

package google.protobuf;

// A Timestamp represents a point in time independent of any time zone or local
// calendar, encoded as a count of seconds and fractions of seconds at
// nanosecond resolution.
message Timestamp {
  int64 seconds = 1;
  int32 nanos = 2;
}
"#;

const TYPE: &str = r#"syntax = "proto3";

package google.protobuf;

import "google/protobuf/any.proto";
import "google/protobuf/source_context.proto";

// A protocol buffer message type.
message Type {
  string name = 1;
  repeated Field fields = 2;
  repeated string oneofs = 3;
  repeated Option options = 4;
  SourceContext source_context = 5;
  Syntax syntax = 6;
  string edition = 7;
}

// A single field of a message type.
message Field {
  enum Kind {
    TYPE_UNKNOWN = 0;
    TYPE_DOUBLE = 1;
    TYPE_FLOAT = 2;
    TYPE_INT64 = 3;
    TYPE_UINT64 = 4;
    TYPE_INT32 = 5;
    TYPE_FIXED64 = 6;
    TYPE_FIXED32 = 7;
    TYPE_BOOL = 8;
    TYPE_STRING = 9;
    TYPE_GROUP = 10;
    TYPE_MESSAGE = 11;
    TYPE_BYTES = 12;
    TYPE_UINT32 = 13;
    TYPE_ENUM = 14;
    TYPE_SFIXED32 = 15;
    TYPE_SFIXED64 = 16;
    TYPE_SINT32 = 17;
    TYPE_SINT64 = 18;
  }

  enum Cardinality {
    CARDINALITY_UNKNOWN = 0;
    CARDINALITY_OPTIONAL = 1;
    CARDINALITY_REQUIRED = 2;
    CARDINALITY_REPEATED = 3;
  }

  Kind kind = 1;
  Cardinality cardinality = 2;
  int32 number = 3;
  string name = 4;
  string type_url = 6;
  int32 oneof_index = 7;
  bool packed = 8;
  repeated Option options = 9;
  string json_name = 10;
  string default_value = 11;
}

// Enum type definition.
message Enum {
  string name = 1;
  repeated EnumValue enumvalue = 2;
  repeated Option options = 3;
  SourceContext source_context = 4;
  Syntax syntax = 5;
  string edition = 6;
}

// Enum value definition.
message EnumValue {
  string name = 1;
  int32 number = 2;
  repeated Option options = 3;
}

// A protocol buffer option, which can be attached to a message, field,
// enumeration, etc.
message Option {
  string name = 1;
  Any value = 2;
}

// The syntax in which a protocol buffer element is defined.
enum Syntax {
  SYNTAX_PROTO2 = 0;
  SYNTAX_PROTO3 = 1;
  SYNTAX_EDITIONS = 2;
}
"#;

const WRAPPERS: &str = r#"syntax = "proto3";

package google.protobuf;

// Wrapper message for `double`.
message DoubleValue {
  double value = 1;
}

// Wrapper message for `float`.
message FloatValue {
  float value = 1;
}

// Wrapper message for `int64`.
message Int64Value {
  int64 value = 1;
}

// Wrapper message for `uint64`.
message UInt64Value {
  uint64 value = 1;
}

// Wrapper message for `int32`.
message Int32Value {
  int32 value = 1;
}

// Wrapper message for `uint32`.
message UInt32Value {
  uint32 value = 1;
}

// Wrapper message for `bool`.
message BoolValue {
  bool value = 1;
}

// Wrapper message for `string`.
message StringValue {
  string value = 1;
}

// Wrapper message for `bytes`.
message BytesValue {
  bytes value = 1;
}
"#;

// ============================================================================
// google/type
// ============================================================================

const CALENDAR_PERIOD: &str = r#"syntax = "proto3";

package google.type;

// A `CalendarPeriod` represents the abstract concept of a time period that has
// a canonical start.
enum CalendarPeriod {
  CALENDAR_PERIOD_UNSPECIFIED = 0;
  DAY = 1;
  WEEK = 2;
  FORTNIGHT = 3;
  MONTH = 4;
  QUARTER = 5;
  HALF = 6;
  YEAR = 7;
}
"#;

const COLOR: &str = r#"syntax = "proto3";

package google.type;

import "google/protobuf/wrappers.proto";

// Represents a color in the RGBA color space.
message Color {
  float red = 1;
  float green = 2;
  float blue = 3;
  google.protobuf.FloatValue alpha = 4;
}
"#;

const DATE: &str = r#"syntax = "proto3";

package google.type;

// Represents a whole or partial calendar date, such as a birthday.
message Date {
  int32 year = 1;
  int32 month = 2;
  int32 day = 3;
}
"#;

const DATETIME: &str = r#"syntax = "proto3";

package google.type;

import "google/protobuf/duration.proto";

// Represents civil time (or occasionally physical time).
message DateTime {
  int32 year = 1;
  int32 month = 2;
  int32 day = 3;
  int32 hours = 4;
  int32 minutes = 5;
  int32 seconds = 6;
  int32 nanos = 7;

  oneof time_offset {
    google.protobuf.Duration utc_offset = 8;
    TimeZone time_zone = 9;
  }
}

// Represents a time zone from the IANA Time Zone Database.
message TimeZone {
  string id = 1;
  string version = 2;
}
"#;

const DAYOFWEEK: &str = r#"syntax = "proto3";

package google.type;

// Represents a day of the week.
enum DayOfWeek {
  DAY_OF_WEEK_UNSPECIFIED = 0;
  MONDAY = 1;
  TUESDAY = 2;
  WEDNESDAY = 3;
  THURSDAY = 4;
  FRIDAY = 5;
  SATURDAY = 6;
  SUNDAY = 7;
}
"#;

const DECIMAL: &str = r#"syntax = "proto3";

package google.type;

// A representation of a decimal value, such as 2.5.
message Decimal {
  string value = 1;
}
"#;

const EXPR: &str = r#"syntax = "proto3";

package google.type;

// Represents a textual expression in the Common Expression Language (CEL)
// syntax.
message Expr {
  string expression = 1;
  string title = 2;
  string description = 3;
  string location = 4;
}
"#;

const FRACTION: &str = r#"syntax = "proto3";

package google.type;

// Represents a fraction in terms of a numerator divided by a denominator.
message Fraction {
  int64 numerator = 1;
  int64 denominator = 2;
}
"#;

const INTERVAL: &str = r#"syntax = "proto3";

package google.type;

import "google/protobuf/timestamp.proto";

// Represents a time interval, encoded as a Timestamp start (inclusive) and a
// Timestamp end (exclusive).
message Interval {
  google.protobuf.Timestamp start_time = 1;
  google.protobuf.Timestamp end_time = 2;
}
"#;

const LATLNG: &str = r#"syntax = "proto3";

package google.type;

// An object that represents a latitude/longitude pair.
message LatLng {
  double latitude = 1;
  double longitude = 2;
}
"#;

const LOCALIZED_TEXT: &str = r#"syntax = "proto3";

package google.type;

// Localized variant of a text in a particular language.
message LocalizedText {
  string text = 1;
  string language_code = 2;
}
"#;

const MONEY: &str = r#"syntax = "proto3";

package google.type;

// Represents an amount of money with its currency type.
message Money {
  string currency_code = 1;
  int64 units = 2;
  int32 nanos = 3;
}
"#;

const MONTH: &str = r#"syntax = "proto3";

package google.type;

// Represents a month in the Gregorian calendar.
enum Month {
  MONTH_UNSPECIFIED = 0;
  JANUARY = 1;
  FEBRUARY = 2;
  MARCH = 3;
  APRIL = 4;
  MAY = 5;
  JUNE = 6;
  JULY = 7;
  AUGUST = 8;
  SEPTEMBER = 9;
  OCTOBER = 10;
  NOVEMBER = 11;
  DECEMBER = 12;
}
"#;

const PHONE_NUMBER: &str = r#"syntax = "proto3";

package google.type;

// An object representing a phone number, suitable as an API wire format.
message PhoneNumber {
  // An object representing a short code.
  message ShortCode {
    string region_code = 1;
    string number = 2;
  }

  oneof kind {
    string e164_number = 1;
    ShortCode short_code = 2;
  }

  string extension = 3;
}
"#;

const POSTAL_ADDRESS: &str = r#"syntax = "proto3";

package google.type;

// Represents a postal address, e.g. for postal delivery or payments addresses.
message PostalAddress {
  int32 revision = 1;
  string region_code = 2;
  string language_code = 3;
  string postal_code = 4;
  string sorting_code = 5;
  string administrative_area = 6;
  string locality = 7;
  string sublocality = 8;
  repeated string address_lines = 9;
  repeated string recipients = 10;
  string organization = 11;
}
"#;

const QUATERNION: &str = r#"syntax = "proto3";

package google.type;

// A quaternion is defined as the quotient of two directed lines in a
// three-dimensional space or equivalently as the quotient of two Euclidean
// vectors.
message Quaternion {
  double x = 1;
  double y = 2;
  double z = 3;
  double w = 4;
}
"#;

const TIMEOFDAY: &str = r#"syntax = "proto3";

package google.type;

// Represents a time of day.
message TimeOfDay {
  int32 hours = 1;
  int32 minutes = 2;
  int32 seconds = 3;
  int32 nanos = 4;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::WELL_KNOWN_IMPORTS;
    use crate::syntax::parse;

    #[test]
    fn test_every_well_known_import_has_a_clean_body() {
        for path in WELL_KNOWN_IMPORTS {
            let Some(source) = fallback_source(path) else {
                panic!("no fallback for {path}");
            };
            let file = parse(source, path);
            assert!(file.errors.is_empty(), "{path}: {:?}", file.errors);
        }
        assert!(fallback_source("google/protobuf/unknown.proto").is_none());
    }
}
