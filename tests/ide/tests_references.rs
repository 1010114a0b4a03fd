use protosense::Position;
use protosense::hir::ReferenceLocation;
use protosense::ide::AnalysisHost;

use crate::helpers::host_helpers::host_from_sources;

const A: &str = "file:///ws/a.proto";
const B: &str = "file:///ws/b.proto";
const C: &str = "file:///ws/c.proto";

fn workspace() -> AnalysisHost {
    host_from_sources(&[
        (A, "syntax = \"proto3\";\npackage test;\nmessage Foo {}\n"),
        (
            B,
            "syntax = \"proto3\";\npackage test;\nimport \"a.proto\";\n\
             message B { Foo foo = 1; }\n",
        ),
        (
            C,
            "syntax = \"proto3\";\npackage other;\nimport \"a.proto\";\n\
             message C { test.Foo foo = 1; }\n",
        ),
    ])
}

#[test]
fn test_reference_counts_split_by_document() {
    let host = workspace();
    let analysis = host.analysis();

    let from_a = analysis.references("test.Foo", A);
    assert_eq!(from_a.internal, 0);
    assert_eq!(from_a.external, 2);
    assert_eq!(from_a.len(), 2);
    assert!(from_a.references.iter().all(|r| r.location == ReferenceLocation::External));

    let from_c = analysis.references("test.Foo", C);
    assert_eq!((from_c.internal, from_c.external), (1, 1));
}

#[test]
fn test_code_lens_titles() {
    let host = workspace();
    let lenses = host.analysis().code_lenses(A);
    assert_eq!(lenses.len(), 1);
    assert_eq!(lenses[0].title, "2 references (0 in this file, 2 external)");

    let lenses = host.analysis().code_lenses(B);
    assert_eq!(lenses[0].title, "0 references");
}

#[test]
fn test_find_references_from_cursor() {
    let host = workspace();
    let analysis = host.analysis();

    // On `Foo` in `Foo foo = 1;`.
    let refs = analysis.find_references(B, Position::new(3, 13), true);
    assert_eq!(refs.len(), 3);
    assert!(refs[0].is_definition);
    assert_eq!(refs[0].uri.as_ref(), A);
    assert_eq!(refs.iter().filter(|r| r.internal).count(), 1);
}

#[test]
fn test_removed_file_drops_its_references() {
    let mut host = workspace();
    host.remove_file(C);
    let result = host.analysis().references("test.Foo", A);
    assert_eq!(result.len(), 1);
    assert!(result.references.iter().all(|r| r.site.uri.as_ref() == B));
}

#[test]
fn test_document_links() {
    let host = workspace();
    let links = host.analysis().document_links(B);
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].target_uri.as_ref(), A);
    assert_eq!(links[1].tooltip, "Go to test.Foo");
}
