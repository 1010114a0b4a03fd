use serde_json::json;

use super::*;
use crate::syntax::parse;

fn analyzer_with(files: &[(&str, &str)]) -> SemanticAnalyzer {
    let mut analyzer = SemanticAnalyzer::new();
    for (uri, text) in files {
        analyzer.update_file(uri, parse(text, uri));
    }
    analyzer
}

fn validate(
    engine: &DiagnosticsEngine,
    analyzer: &SemanticAnalyzer,
    uri: &str,
) -> Vec<Diagnostic> {
    let file = analyzer.file(uri).cloned().unwrap_or_else(|| panic!("{uri} not indexed"));
    engine.validate(uri, &file, analyzer)
}

fn with_code<'d>(diagnostics: &'d [Diagnostic], rule: Rule) -> Vec<&'d Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.code.as_deref() == Some(rule.id()))
        .collect()
}

const DATE: &str = r#"
syntax = "proto3";
package google.type;
message Date { int32 year = 1; int32 month = 2; int32 day = 3; }
"#;

const USES_DATE: &str = r#"
syntax = "proto3";
package billing;
import "date.proto";
message Invoice { google.type.Date due = 1; }
"#;

#[test]
fn test_non_canonical_import_defaults_to_error() {
    let analyzer = analyzer_with(&[
        ("builtin:///google/type/date.proto", DATE),
        ("file:///ws/invoice.proto", USES_DATE),
    ]);
    let engine = DiagnosticsEngine::default();
    let diagnostics = validate(&engine, &analyzer, "file:///ws/invoice.proto");

    let found = with_code(&diagnostics, Rule::NonCanonicalImportPath);
    assert_eq!(found.len(), 1, "{diagnostics:#?}");
    assert_eq!(found[0].severity, Severity::Error);
    assert_eq!(
        found[0].message.as_ref(),
        "Import \"date.proto\" should be imported via \"google/type/date.proto\""
    );
    assert!(with_code(&diagnostics, Rule::UnresolvedImport).is_empty());
    assert!(with_code(&diagnostics, Rule::ReferenceErrors).is_empty());
}

#[test]
fn test_severity_override_applies_to_next_validation() {
    let analyzer = analyzer_with(&[
        ("builtin:///google/type/date.proto", DATE),
        ("file:///ws/invoice.proto", USES_DATE),
    ]);
    let engine = DiagnosticsEngine::default();
    engine.update_settings_from_value(&json!({ "nonCanonicalImportPath": "hint" }));

    let diagnostics = validate(&engine, &analyzer, "file:///ws/invoice.proto");
    let found = with_code(&diagnostics, Rule::NonCanonicalImportPath);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Hint);
}

#[test]
fn test_vendored_and_builtin_files_are_skipped() {
    let broken = "message bad_name { Missing m = 0; ";
    let analyzer = analyzer_with(&[
        ("file:///ws/vendor/lib.proto", broken),
        ("builtin:///google/type/date.proto", DATE),
    ]);
    let engine = DiagnosticsEngine::default();
    assert!(validate(&engine, &analyzer, "file:///ws/vendor/lib.proto").is_empty());
    assert!(validate(&engine, &analyzer, "builtin:///google/type/date.proto").is_empty());
}

#[test]
fn test_master_switch_disables_everything() {
    let analyzer = analyzer_with(&[("file:///ws/a.proto", "message {")]);
    let engine = DiagnosticsEngine::default();
    engine.update_settings_from_value(&json!({ "enabled": false }));
    assert!(validate(&engine, &analyzer, "file:///ws/a.proto").is_empty());
}

#[test]
fn test_syntax_errors_are_reported() {
    let analyzer = analyzer_with(&[("file:///ws/a.proto", "syntax = \"proto3\";\nmessage A {")]);
    let diagnostics = validate(&DiagnosticsEngine::default(), &analyzer, "file:///ws/a.proto");
    let found = with_code(&diagnostics, Rule::SyntaxErrors);
    assert!(!found.is_empty());
    assert!(found.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn test_naming_conventions() {
    let source = r#"
syntax = "proto3";
package t;
message order_line { int32 ItemCount = 1; }
enum Kind { first = 0; }
"#;
    let analyzer = analyzer_with(&[("file:///ws/a.proto", source)]);
    let diagnostics = validate(&DiagnosticsEngine::default(), &analyzer, "file:///ws/a.proto");
    let messages: Vec<&str> = with_code(&diagnostics, Rule::NamingConventions)
        .iter()
        .map(|d| d.message.as_ref())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Message name \"order_line\" should be PascalCase",
            "Field name \"ItemCount\" should be lower_snake_case",
            "Enum value \"first\" should be UPPER_SNAKE_CASE",
        ]
    );
}

#[test]
fn test_unresolved_types_and_map_keys() {
    let source = r#"
syntax = "proto3";
package t;
message A {
  Missing m = 1;
  map<double, string> bad = 2;
}
"#;
    let analyzer = analyzer_with(&[("file:///ws/a.proto", source)]);
    let diagnostics = validate(&DiagnosticsEngine::default(), &analyzer, "file:///ws/a.proto");
    let messages: Vec<&str> = with_code(&diagnostics, Rule::ReferenceErrors)
        .iter()
        .map(|d| d.message.as_ref())
        .collect();
    assert_eq!(
        messages,
        vec!["Unresolved type \"Missing\"", "Invalid map key type \"double\""]
    );
}

#[test]
fn test_field_tag_issues_and_duplicates() {
    let source = r#"
syntax = "proto3";
package t;
message M {
  reserved 5;
  reserved "old";
  int32 zero = 0;
  int32 internal = 19000;
  int32 five = 5;
  string old = 6;
  int32 a = 7;
  int32 b = 7;
}
enum E { E_ONE = 1; E_TWO = 1; }
"#;
    let analyzer = analyzer_with(&[("file:///ws/a.proto", source)]);
    let diagnostics = validate(&DiagnosticsEngine::default(), &analyzer, "file:///ws/a.proto");

    let tags = with_code(&diagnostics, Rule::FieldTagIssues);
    assert_eq!(tags.len(), 5, "{tags:#?}");
    assert!(tags.iter().any(|d| d.message.contains("out of range (1-536870911)")));
    assert!(tags.iter().any(|d| d.message.contains("19000")));
    assert!(tags.iter().any(|d| d.message.as_ref() == "Field number 5 of \"five\" is reserved"));
    assert!(tags.iter().any(|d| d.message.as_ref() == "Field name \"old\" is reserved"));
    assert!(tags.iter().any(|d| d.message.contains("first enum value must be zero")));

    let duplicates = with_code(&diagnostics, Rule::DuplicateFieldNumber);
    assert_eq!(duplicates.len(), 2, "{duplicates:#?}");
    assert_eq!(
        duplicates[0].message.as_ref(),
        "Field number 7 is already used by \"a\""
    );
    assert_eq!(duplicates[0].related.len(), 1);
    assert_eq!(
        duplicates[1].message.as_ref(),
        "Enum value number 1 is already used by \"E_ONE\""
    );
}

#[test]
fn test_allow_alias_permits_shared_numbers() {
    let source = r#"
syntax = "proto3";
enum E {
  option allow_alias = true;
  E_ZERO = 0;
  E_DEFAULT = 0;
}
"#;
    let analyzer = analyzer_with(&[("file:///ws/a.proto", source)]);
    let diagnostics = validate(&DiagnosticsEngine::default(), &analyzer, "file:///ws/a.proto");
    assert!(with_code(&diagnostics, Rule::DuplicateFieldNumber).is_empty());
}

#[test]
fn test_duplicate_definition_reported_on_later_file() {
    let first = "syntax = \"proto3\";\npackage t;\nmessage Dup {}\n";
    let second = "syntax = \"proto3\";\npackage t;\nmessage Dup {}\n";
    let analyzer = analyzer_with(&[("file:///ws/a.proto", first), ("file:///ws/b.proto", second)]);
    let engine = DiagnosticsEngine::default();

    let in_first = validate(&engine, &analyzer, "file:///ws/a.proto");
    assert!(with_code(&in_first, Rule::DuplicateFieldNumber).is_empty());

    let in_second = validate(&engine, &analyzer, "file:///ws/b.proto");
    let found = with_code(&in_second, Rule::DuplicateFieldNumber);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].related[0].uri.as_ref(), "file:///ws/a.proto");
}

#[test]
fn test_circular_import_reported_once() {
    let a = "syntax = \"proto3\";\npackage t;\nimport \"b.proto\";\nmessage A {}\n";
    let b = "syntax = \"proto3\";\npackage t;\nimport \"a.proto\";\nmessage B {}\n";
    let analyzer = analyzer_with(&[("file:///ws/a.proto", a), ("file:///ws/b.proto", b)]);
    let engine = DiagnosticsEngine::default();

    let mut circular = Vec::new();
    for uri in ["file:///ws/a.proto", "file:///ws/b.proto"] {
        let diagnostics = validate(&engine, &analyzer, uri);
        circular.extend(with_code(&diagnostics, Rule::CircularImport).into_iter().cloned());
    }
    assert_eq!(circular.len(), 1, "{circular:#?}");
    assert_eq!(circular[0].uri.as_ref(), "file:///ws/b.proto");
    assert_eq!(
        circular[0].message.as_ref(),
        "Circular import: /ws/b.proto -> /ws/a.proto -> /ws/b.proto"
    );
}

#[test]
fn test_unresolved_and_unused_imports() {
    let used = "syntax = \"proto3\";\npackage t;\nmessage Used {}\n";
    let idle = "syntax = \"proto3\";\npackage t;\nmessage Idle {}\n";
    let main = r#"
syntax = "proto3";
package t;
import "used.proto";
import "idle.proto";
import "nowhere.proto";
import "google/protobuf/empty.proto";
message Main { Used u = 1; }
"#;
    let analyzer = analyzer_with(&[
        ("file:///ws/used.proto", used),
        ("file:///ws/idle.proto", idle),
        ("file:///ws/main.proto", main),
    ]);
    let diagnostics = validate(&DiagnosticsEngine::default(), &analyzer, "file:///ws/main.proto");

    let unresolved = with_code(&diagnostics, Rule::UnresolvedImport);
    assert_eq!(unresolved.len(), 1);
    assert_eq!(
        unresolved[0].message.as_ref(),
        "Import \"nowhere.proto\" could not be resolved"
    );

    let unused = with_code(&diagnostics, Rule::UnusedImport);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].message.as_ref(), "Import \"idle.proto\" is unused");
    assert_eq!(unused[0].severity, Severity::Hint);
}

#[test]
fn test_discouraged_and_deprecated() {
    let source = r#"
package t;
message Old { option deprecated = true; }
message User {
  required string name = 1;
  optional Old legacy = 2;
}
"#;
    let analyzer = analyzer_with(&[("file:///ws/a.proto", source)]);
    let diagnostics = validate(&DiagnosticsEngine::default(), &analyzer, "file:///ws/a.proto");

    let discouraged = with_code(&diagnostics, Rule::DiscouragedConstructs);
    assert_eq!(discouraged.len(), 2, "{discouraged:#?}");
    assert!(discouraged[0].message.starts_with("Missing syntax statement"));

    let deprecated = with_code(&diagnostics, Rule::DeprecatedUsage);
    assert_eq!(deprecated.len(), 1);
    assert_eq!(deprecated[0].message.as_ref(), "Message \"t.Old\" is deprecated");
}

#[test]
fn test_opt_in_rules() {
    let source = r#"
syntax = "proto3";
package t;
// Documented.
message Kept { Loose l = 1; }
message Loose {}
"#;
    let analyzer = analyzer_with(&[("file:///ws/a.proto", source)]);
    let engine = DiagnosticsEngine::default();
    let diagnostics = validate(&engine, &analyzer, "file:///ws/a.proto");
    assert!(with_code(&diagnostics, Rule::UnusedSymbol).is_empty());
    assert!(with_code(&diagnostics, Rule::MissingDocumentation).is_empty());

    engine.update_settings_from_value(&json!({
        "unusedSymbols": true,
        "documentationComments": true,
    }));
    let diagnostics = validate(&engine, &analyzer, "file:///ws/a.proto");
    let unused: Vec<&str> = with_code(&diagnostics, Rule::UnusedSymbol)
        .iter()
        .map(|d| d.message.as_ref())
        .collect();
    assert_eq!(unused, vec!["Message \"Kept\" is never used"]);
    let undocumented: Vec<&str> = with_code(&diagnostics, Rule::MissingDocumentation)
        .iter()
        .map(|d| d.message.as_ref())
        .collect();
    assert_eq!(undocumented, vec!["Message \"Loose\" has no documentation comment"]);
}

#[test]
fn test_edition_features() {
    let source = r#"
edition = "2023";
package t;
option features.field_presence = IMPLICIT;
option features.enum_type = WIDE;
option features.made_up = OPEN;
message M {
  int32 a = 1 [features.field_presence = EXPLICIT];
}
"#;
    let analyzer = analyzer_with(&[("file:///ws/a.proto", source)]);
    let diagnostics = validate(&DiagnosticsEngine::default(), &analyzer, "file:///ws/a.proto");
    let messages: Vec<&str> = with_code(&diagnostics, Rule::EditionFeatures)
        .iter()
        .map(|d| d.message.as_ref())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Invalid value for feature \"enum_type\"; expected one of OPEN, CLOSED",
            "Unknown feature \"made_up\"",
        ]
    );
}

#[test]
fn test_features_outside_editions_and_unknown_edition() {
    let proto3 = "syntax = \"proto3\";\noption features.enum_type = OPEN;\n";
    let future = "edition = \"2099\";\n";
    let analyzer = analyzer_with(&[("file:///ws/a.proto", proto3), ("file:///ws/b.proto", future)]);
    let engine = DiagnosticsEngine::default();

    let a = validate(&engine, &analyzer, "file:///ws/a.proto");
    let found = with_code(&a, Rule::EditionFeatures);
    assert_eq!(found.len(), 1);
    assert!(found[0].message.contains("only be set in editions files"));

    let b = validate(&engine, &analyzer, "file:///ws/b.proto");
    let found = with_code(&b, Rule::EditionFeatures);
    assert_eq!(found.len(), 1);
    assert!(found[0].message.starts_with("Unsupported edition \"2099\""));
}

#[test]
fn test_unindexed_file_resolves_against_workspace() {
    let analyzer = analyzer_with(&[("file:///ws/user.proto", "syntax = \"proto3\";\npackage t;\nmessage User {}\n")]);
    let draft = parse(
        "syntax = \"proto3\";\npackage t;\nimport \"user.proto\";\nmessage Draft { User u = 1; }\n",
        "file:///ws/draft.proto",
    );
    let diagnostics = DiagnosticsEngine::default().validate("file:///ws/draft.proto", &draft, &analyzer);
    assert!(with_code(&diagnostics, Rule::ReferenceErrors).is_empty());
    assert!(with_code(&diagnostics, Rule::UnresolvedImport).is_empty());
}
