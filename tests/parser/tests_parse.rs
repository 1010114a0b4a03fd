use std::sync::Arc;

use protosense::syntax::{
    FieldLabel, MessageBody, ParseEngine, ParserSelector, Strategy, TreeParser, parse,
};
use rstest::rstest;

const SAMPLE: &str = r#"syntax = "proto3";
package shop.v1;

// An order.
message Order {
  string id = 1;
  repeated Line lines = 2;
  map<string, string> labels = 3;
  message Line { string sku = 1; int32 quantity = 2; }
}

enum State {
  STATE_UNSPECIFIED = 0;
  STATE_OPEN = 1;
}

service Orders {
  rpc Get(Order) returns (Order);
}
"#;

const LEGACY: &str = r#"syntax = "proto2";
package shop.v2;

/* Legacy order schema. */
message Order {
  option deprecated = true;
  option (shop.v2.audited) = { level: 2 };
  /**
   * The lines.
   */
  repeated .shop.v2.Line lines = 1;
  optional string note = 2; /* free text */
  required int32 option = 3;
  oneof pick {
    option (shop.v2.choice) = "first";
    int32 first = 4;
    .shop.v2.Line second = 5;
  }
}

message Line { optional int64 qty = 1; }
"#;

#[rstest]
#[case::proto3(SAMPLE)]
#[case::comments_options_labels(LEGACY)]
fn test_engines_produce_the_same_ast(#[case] source: &str) {
    let tree = Arc::new(TreeParser::new());
    tree.initialize().expect("grammar self-check");
    let selector = ParserSelector::default().with_alternate(tree.clone());
    selector.set_prefer_alternate(true);
    assert_eq!(selector.select(), Strategy::Alternate);

    let via_tree = selector.parse(source, "file:///shop.proto");
    let direct = parse(source, "file:///shop.proto");
    assert!(direct.errors.is_empty(), "{:?}", direct.errors);
    assert_eq!(via_tree, direct);
    assert_eq!(tree.parse(source, "file:///shop.proto").ok(), Some(direct));
}

#[test]
fn test_legacy_fixture_shape() {
    let file = parse(LEGACY, "file:///shop.proto");
    let order = file.messages().next().expect("Order");
    assert_eq!(order.doc.as_deref(), Some("Legacy order schema."));
    assert!(order.options().any(|o| o.name.is("deprecated")));
    assert_eq!(order.options().count(), 2);

    let fields: Vec<_> = order.fields().collect();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].label, Some(FieldLabel::Repeated));
    assert_eq!(fields[0].field_type.name, ".shop.v2.Line");
    assert_eq!(fields[0].doc.as_deref(), Some("The lines."));
    assert_eq!(fields[1].doc.as_deref(), Some("free text"));
    assert_eq!(fields[2].name, "option");

    let pick = order.oneofs().next().expect("oneof");
    assert_eq!(pick.fields().count(), 2);
}

#[test]
fn test_deep_nesting_reports_instead_of_overflowing() {
    let depth = 1000;
    let source = format!("{}{}", "message M { ".repeat(depth), "} ".repeat(depth));
    let file = parse(&source, "file:///deep.proto");
    assert_eq!(file.errors.len(), 1);
    assert_eq!(file.messages().count(), 1);
}

#[rstest]
#[case::missing_name("message { int32 x = 1; }\nmessage Ok {}\n", &["", "Ok"])]
#[case::bad_field("message A { int32 = 1; }\nmessage B {}\n", &["A", "B"])]
#[case::unterminated("message A { int32 x = 1;", &["A"])]
fn test_syntax_errors_keep_partial_definitions(#[case] source: &str, #[case] names: &[&str]) {
    let file = parse(source, "file:///bad.proto");
    assert!(!file.errors.is_empty());
    let found: Vec<&str> = file.messages().map(|m| m.name.as_str()).collect();
    assert_eq!(found, names);
}

#[test]
fn test_parse_is_deterministic() {
    assert_eq!(parse(SAMPLE, "a.proto"), parse(SAMPLE, "a.proto"));
}
