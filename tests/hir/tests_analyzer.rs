use protosense::hir::{HirSymbol, SemanticAnalyzer};
use protosense::syntax::{ProtoFile, parse};

use crate::helpers::host_helpers::{analyzer_from_sources, resolved_target};

const A: &str = "syntax = \"proto3\";
package test;
message Foo { Bar bar = 1; }
message Bar {}
";
const B: &str = "syntax = \"proto3\";
package test;
message Baz { Foo foo = 1; Bar bar = 2; }
";

fn snapshot(analyzer: &SemanticAnalyzer) -> (Vec<HirSymbol>, usize, usize) {
    let symbols = analyzer.all_symbols().cloned().collect();
    let foo = analyzer.find_references("test.Foo", "file:///a.proto");
    (symbols, analyzer.reference_count(), foo.len())
}

#[test]
fn test_update_is_idempotent() {
    let mut analyzer = analyzer_from_sources(&[("file:///a.proto", A), ("file:///b.proto", B)]);
    let once = snapshot(&analyzer);

    analyzer.update_file("file:///a.proto", parse(A, "file:///a.proto"));
    analyzer.update_file("file:///b.proto", parse(B, "file:///b.proto"));
    assert_eq!(snapshot(&analyzer), once);
    assert_eq!(
        analyzer.find_references("test.Bar", "file:///a.proto"),
        analyzer_from_sources(&[("file:///a.proto", A), ("file:///b.proto", B)])
            .find_references("test.Bar", "file:///a.proto")
    );
}

#[test]
fn test_empty_update_purges_contribution() {
    let mut analyzer = analyzer_from_sources(&[("file:///a.proto", A), ("file:///b.proto", B)]);
    assert_eq!(analyzer.find_references("test.Bar", "file:///a.proto").len(), 2);

    analyzer.update_file("file:///b.proto", ProtoFile::empty("file:///b.proto"));
    assert!(analyzer.lookup("test.Baz").is_none());
    let bar = analyzer.find_references("test.Bar", "file:///a.proto");
    assert!(bar.references.iter().all(|r| r.site.uri.as_ref() != "file:///b.proto"));
    assert_eq!(bar.len(), 1);

    analyzer.remove_file("file:///a.proto");
    assert!(analyzer.lookup("test.Foo").is_none());
    assert!(analyzer.find_references("test.Bar", "file:///a.proto").is_empty());
}

#[test]
fn test_nested_type_shadows_top_level() {
    let source = r#"syntax = "proto3";
package test;
message Inner {}
message Outer {
  message Inner {}
  Inner value = 1;
}
message Other {
  Inner value = 1;
}
"#;
    let analyzer = analyzer_from_sources(&[("file:///n.proto", source)]);
    let targets: Vec<Option<String>> = analyzer
        .resolved_refs("file:///n.proto")
        .into_iter()
        .map(|r| r.target.map(|s| s.full_name.to_string()))
        .collect();
    assert_eq!(
        targets,
        vec![Some("test.Outer.Inner".to_string()), Some("test.Inner".to_string())]
    );
    assert_eq!(
        resolved_target(&analyzer, "file:///n.proto", "Inner").as_deref(),
        Some("test.Outer.Inner")
    );
}

#[test]
fn test_public_imports_are_visible_transitively() {
    let analyzer = analyzer_from_sources(&[
        ("file:///ws/base.proto", "syntax = \"proto3\";\npackage base;\nmessage Id {}\n"),
        (
            "file:///ws/reexport.proto",
            "syntax = \"proto3\";\nimport public \"base.proto\";\n",
        ),
        (
            "file:///ws/user.proto",
            "syntax = \"proto3\";\npackage app;\nimport \"reexport.proto\";\n\
             message User { base.Id id = 1; }\n",
        ),
    ]);
    assert_eq!(
        resolved_target(&analyzer, "file:///ws/user.proto", "base.Id").as_deref(),
        Some("base.Id")
    );
    assert!(
        analyzer
            .visible_uris("file:///ws/user.proto")
            .iter()
            .any(|uri| uri.as_ref() == "file:///ws/base.proto")
    );
}
