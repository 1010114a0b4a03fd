use protosense::hir::SymbolKind;
use protosense::ide::{DocumentSymbol, WORKSPACE_SYMBOL_LIMIT, document_symbols};
use protosense::Span;
use protosense::syntax::{Definition, parse};

use crate::helpers::host_helpers::host_from_sources;

const USERS: &str = r#"syntax = "proto3";
package acme.users;

message UserMessage { string id = 1; }
message UserRequest { string id = 1; }
message CreateUserRequest { UserMessage payload = 1; }
"#;

fn names(symbols: &[DocumentSymbol]) -> Vec<&str> {
    symbols.iter().map(|s| s.name.as_ref()).collect()
}

#[test]
fn test_exact_match_ranks_first() {
    let host = host_from_sources(&[("file:///users.proto", USERS)]);
    let analysis = host.analysis();

    let results = analysis.workspace_symbols("usermessage");
    assert_eq!(results[0].name.as_ref(), "UserMessage");
    assert_eq!(results[0].full_name.as_ref(), "acme.users.UserMessage");

    let results = analysis.workspace_symbols("UserRequest");
    let found: Vec<&str> = results.iter().take(2).map(|s| s.name.as_ref()).collect();
    assert_eq!(found, vec!["UserRequest", "CreateUserRequest"]);
    assert!(results[1].score > results[2].score);
}

#[test]
fn test_equal_scores_sort_by_name() {
    let host = host_from_sources(&[("file:///users.proto", USERS)]);
    let results = host.analysis().workspace_symbols("User");
    let found: Vec<&str> = results.iter().take(2).map(|s| s.name.as_ref()).collect();
    assert_eq!(found, vec!["UserMessage", "UserRequest"]);
    assert_eq!(results[0].score, results[1].score);
}

#[test]
fn test_results_are_capped() {
    let source: String = (0..150).map(|i| format!("message M{i:03} {{}}\n")).collect();
    let host = host_from_sources(&[("file:///many.proto", &source)]);
    let analysis = host.analysis();

    assert_eq!(analysis.workspace_symbols("").len(), WORKSPACE_SYMBOL_LIMIT);
    assert_eq!(analysis.workspace_symbols("m").len(), WORKSPACE_SYMBOL_LIMIT);
    assert!(analysis.workspace_symbols("zzz").is_empty());
}

#[test]
fn test_document_symbols_skip_empty_names() {
    let file = parse(
        "message { int32 lost = 1; }\nmessage Kept { int32 x = 1; }\n",
        "file:///broken.proto",
    );
    assert!(!file.errors.is_empty());

    let symbols = document_symbols(&file);
    assert_eq!(names(&symbols), vec!["Kept"]);
    assert_eq!(names(&symbols[0].children), vec!["x"]);
    assert_eq!(symbols[0].children[0].kind, SymbolKind::Field);
}

#[test]
fn test_selection_range_is_clamped() {
    let mut file = parse("message Outer {\n  int32 x = 1;\n}\n", "file:///a.proto");
    if let Some(Definition::Message(m)) = file.definitions.first_mut() {
        m.name_span = Span::from_coords(40, 0, 40, 5);
    }
    let symbols = document_symbols(&file);
    let outer = &symbols[0];
    assert!(outer.range.contains_span(&outer.selection_range));
}
