use std::fs;
use std::path::Path;

use protosense::Config;
use protosense::hir::WELL_KNOWN_IMPORTS;
use protosense::ide::AnalysisHost;
use protosense::project::{SourceKind, WellKnownLoader, fallback_source};
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, text: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().expect("has parent")).expect("create dirs");
    fs::write(path, text).expect("write file");
}

#[test]
fn test_preload_from_config_prefers_include_dir() {
    let include = TempDir::new().expect("tempdir");
    let cache = TempDir::new().expect("tempdir");
    write(
        include.path(),
        "google/protobuf/timestamp.proto",
        "syntax = \"proto3\";\npackage google.protobuf;\n\
         message Timestamp { int64 seconds = 1; }\n",
    );

    let config = Config::from_value(&serde_json::json!({
        "wellKnown": {
            "includeDir": include.path(),
            "cacheDir": cache.path(),
        }
    }));
    let mut host = AnalysisHost::from_config(&config);
    let report = WellKnownLoader::from_config(&config.well_known).preload_into_host(&mut host);

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.count(SourceKind::Include), 1);
    assert_eq!(report.count(SourceKind::Builtin), WELL_KNOWN_IMPORTS.len() - 1);
    assert_eq!(report.materialized.len(), WELL_KNOWN_IMPORTS.len() - 1);
    assert!(!cache.path().join("google/protobuf/timestamp.proto").exists());

    let Some(timestamp) = report.uri_of("google/protobuf/timestamp.proto") else {
        panic!("timestamp.proto not loaded");
    };
    assert!(timestamp.starts_with("file://"));
    let analysis = host.analysis();
    let Some(symbol) = analysis.analyzer().lookup("google.protobuf.Timestamp") else {
        panic!("Timestamp not indexed");
    };
    assert_eq!(symbol.uri.as_ref(), timestamp);
}

#[test]
fn test_materialized_cache_matches_inline_body() {
    let cache = TempDir::new().expect("tempdir");
    let loader = WellKnownLoader::new().with_cache_dir(cache.path());
    let mut host = AnalysisHost::new();
    loader.preload_into_host(&mut host);

    let written = fs::read_to_string(cache.path().join("google/type/money.proto"))
        .expect("money.proto materialized");
    assert_eq!(Some(written.as_str()), fallback_source("google/type/money.proto"));
    assert_eq!(host.file_count(), WELL_KNOWN_IMPORTS.len());
}

#[test]
fn test_user_files_resolve_against_preloaded_types() {
    let mut host = AnalysisHost::new();
    WellKnownLoader::new().preload_into_host(&mut host);
    host.set_file_content(
        "file:///ws/event.proto",
        "syntax = \"proto3\";\nimport \"google/protobuf/duration.proto\";\n\
         message Event { google.protobuf.Duration ttl = 1; }\n",
    );

    let analysis = host.analysis();
    let refs = analysis.references("google.protobuf.Duration", "file:///ws/event.proto");
    assert_eq!(refs.internal, 1);
    assert!(analysis.diagnostics("file:///ws/event.proto").is_empty());
}
