use std::fs;

use protosense::ide::AnalysisHost;
use protosense::project::{LoadError, WellKnownLoader, WorkspaceLoader};
use tempfile::TempDir;

#[test]
fn test_workspace_with_well_known_imports() {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir_all(dir.path().join("api")).expect("create dirs");
    fs::write(
        dir.path().join("api/order.proto"),
        "syntax = \"proto3\";\npackage api;\nimport \"google/type/money.proto\";\n\
         message Order { google.type.Money total = 1; }\n",
    )
    .expect("write order.proto");
    fs::write(dir.path().join("notes.txt"), "not a proto").expect("write notes");

    let mut host = AnalysisHost::new();
    WellKnownLoader::new().preload_into_host(&mut host);
    let report = WorkspaceLoader::new()
        .load_directory_into_host(dir.path(), &mut host)
        .expect("directory exists");

    assert_eq!(report.loaded.len(), 1);
    let uri = &report.loaded[0];
    assert!(host.analysis().diagnostics(uri).is_empty());
    assert_eq!(host.analysis().references("google.type.Money", uri).internal, 1);
}

#[test]
fn test_missing_workspace_directory() {
    let dir = TempDir::new().expect("tempdir");
    let result = WorkspaceLoader::new()
        .load_directory_into_host(dir.path().join("missing"), &mut AnalysisHost::new());
    let Err(error) = result else {
        panic!("expected an error");
    };
    assert!(matches!(error, LoadError::DirectoryNotFound(_)));
    assert!(error.to_string().starts_with("directory not found"));
}
