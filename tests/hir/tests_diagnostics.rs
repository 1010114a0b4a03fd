//! Diagnostics through the host, against preloaded well-known protos.

use protosense::hir::{Diagnostic, Rule, Severity};
use protosense::ide::AnalysisHost;
use protosense::project::WellKnownLoader;
use serde_json::json;

const USER: &str = "file:///ws/event.proto";

fn host_with_well_known() -> AnalysisHost {
    let mut host = AnalysisHost::new();
    let report = WellKnownLoader::new().preload_into_host(&mut host);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    host
}

fn with_rule(diagnostics: &[Diagnostic], rule: Rule) -> Vec<&Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.code.as_deref() == Some(rule.id()))
        .collect()
}

#[test]
fn test_non_canonical_well_known_import() {
    let mut host = host_with_well_known();
    let source = r#"syntax = "proto3";
package events;
import "type/date.proto";
message Event { google.type.Date day = 1; }
"#;
    host.set_file_content(USER, source);

    let diagnostics = host.analysis().diagnostics(USER);
    let found = with_rule(&diagnostics, Rule::NonCanonicalImportPath);
    assert_eq!(found.len(), 1, "{diagnostics:#?}");
    assert_eq!(found[0].severity, Severity::Error);
    assert_eq!(
        found[0].message.as_ref(),
        "Import \"type/date.proto\" should be imported via \"google/type/date.proto\""
    );
    assert!(with_rule(&diagnostics, Rule::ReferenceErrors).is_empty());

    host.update_settings_from_value(&json!({ "nonCanonicalImportPath": "hint" }));
    let diagnostics = host.analysis().diagnostics(USER);
    let found = with_rule(&diagnostics, Rule::NonCanonicalImportPath);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Hint);
}

#[test]
fn test_canonical_import_is_clean() {
    let mut host = host_with_well_known();
    let source = r#"syntax = "proto3";
package events;
import "google/protobuf/timestamp.proto";
message Event { google.protobuf.Timestamp at = 1; }
"#;
    host.set_file_content(USER, source);

    let diagnostics = host.analysis().diagnostics(USER);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn test_well_known_files_produce_no_diagnostics() {
    let host = host_with_well_known();
    let analysis = host.analysis();
    let diagnostics = analysis.diagnostics("builtin:///google/protobuf/descriptor.proto");
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn test_message_level_deprecation_reaches_references() {
    let mut host = AnalysisHost::new();
    let source = r#"syntax = "proto3";
package legacy;
/* Kept for old clients. */
message Old {
  option deprecated = true;
  int32 id = 1;
}
message User { Old old = 1; }
"#;
    let errors = host.set_file_content(USER, source);
    assert!(errors.is_empty(), "{errors:?}");

    let diagnostics = host.analysis().diagnostics(USER);
    assert!(with_rule(&diagnostics, Rule::SyntaxErrors).is_empty(), "{diagnostics:#?}");
    assert!(with_rule(&diagnostics, Rule::ReferenceErrors).is_empty());
    let found = with_rule(&diagnostics, Rule::DeprecatedUsage);
    assert_eq!(found.len(), 1, "{diagnostics:#?}");
    assert_eq!(found[0].message.as_ref(), "Message \"legacy.Old\" is deprecated");
    assert_eq!(found[0].range.start.line, 7);
}
