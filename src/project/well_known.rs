//! Well-known proto preloading.
//!
//! Every entry of [`WELL_KNOWN_IMPORTS`] is looked up in priority order:
//!
//! ```text
//! include dir  →  resource dir  →  cache dir  →  inline body (builtin:///)
//! ```
//!
//! On-disk sources are indexed under `file://` URIs. When the inline body is
//! used and a cache directory is configured, the body is written there so
//! the next lookup finds it on disk. Failures are per entry: they are logged,
//! recorded in the [`PreloadReport`] and the loop moves on.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::{LoadError, fallback_source, file_uri};
use crate::base::constants::BUILTIN_URI_PREFIX;
use crate::config::WellKnownConfig;
use crate::hir::{SemanticAnalyzer, WELL_KNOWN_IMPORTS};
use crate::ide::AnalysisHost;
use crate::syntax::{ParserSelector, ProtoFile};

/// Where a well-known proto's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Include,
    Resource,
    Cache,
    Builtin,
}

/// A located well-known proto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownSource {
    /// The import path, e.g. `google/protobuf/any.proto`.
    pub import_path: &'static str,
    pub uri: String,
    pub kind: SourceKind,
    pub text: String,
}

/// Outcome of a preload pass.
#[derive(Debug, Default)]
pub struct PreloadReport {
    /// `(import path, uri, kind)` for every proto that was indexed.
    pub loaded: Vec<(&'static str, String, SourceKind)>,
    /// Cache files written from inline bodies.
    pub materialized: Vec<PathBuf>,
    pub errors: Vec<LoadError>,
}

impl PreloadReport {
    pub fn count(&self, kind: SourceKind) -> usize {
        self.loaded.iter().filter(|(_, _, k)| *k == kind).count()
    }

    pub fn uri_of(&self, import_path: &str) -> Option<&str> {
        self.loaded
            .iter()
            .find(|(path, _, _)| *path == import_path)
            .map(|(_, uri, _)| uri.as_str())
    }
}

/// Locates and preloads the well-known protos.
#[derive(Debug, Clone, Default)]
pub struct WellKnownLoader {
    include_dir: Option<PathBuf>,
    resource_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
}

impl WellKnownLoader {
    /// A loader that only knows the inline bodies.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &WellKnownConfig) -> Self {
        Self {
            include_dir: config.include_dir.clone(),
            resource_dir: config.resource_dir.clone(),
            cache_dir: config.cache_dir.clone(),
        }
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(dir.into());
        self
    }

    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Preload into a host, parsing with the host's parser.
    pub fn preload_into_host(&self, host: &mut AnalysisHost) -> PreloadReport {
        let (files, report) = self.load(host.parser());
        host.set_files(files);
        report
    }

    /// Preload directly into an analyzer with the default parser.
    pub fn preload_into(&self, analyzer: &mut SemanticAnalyzer) -> PreloadReport {
        let (files, report) = self.load(&ParserSelector::default());
        analyzer.update_files(files);
        report
    }

    /// Locate and parse every well-known proto without indexing them.
    pub fn load(&self, parser: &ParserSelector) -> (Vec<ProtoFile>, PreloadReport) {
        let mut report = PreloadReport::default();
        let mut sources = Vec::with_capacity(WELL_KNOWN_IMPORTS.len());

        for &import_path in WELL_KNOWN_IMPORTS {
            match self.locate(import_path, &mut report.errors) {
                Some(source) => {
                    if source.kind == SourceKind::Builtin {
                        self.materialize(&source, &mut report);
                    }
                    debug!(
                        import_path,
                        uri = %source.uri,
                        kind = ?source.kind,
                        "well-known proto located"
                    );
                    sources.push(source);
                }
                None => warn!(import_path, "no source for well-known proto"),
            }
        }

        let files: Vec<ProtoFile> = sources
            .par_iter()
            .map(|source| parser.parse(&source.text, &source.uri))
            .collect();
        report.loaded = sources
            .into_iter()
            .map(|s| (s.import_path, s.uri, s.kind))
            .collect();
        debug!(count = files.len(), "well-known protos parsed");
        (files, report)
    }

    /// The first readable source for `import_path`. Read failures are
    /// recorded and the next candidate is tried.
    pub fn locate(
        &self,
        import_path: &'static str,
        errors: &mut Vec<LoadError>,
    ) -> Option<WellKnownSource> {
        for (dir, kind) in self.disk_candidates() {
            let path = dir.join(import_path);
            if !path.is_file() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(text) => {
                    return Some(WellKnownSource {
                        import_path,
                        uri: file_uri(&path),
                        kind,
                        text,
                    });
                }
                Err(source) => {
                    warn!(
                        path = %path.display(),
                        error = %source,
                        "failed to read well-known proto"
                    );
                    errors.push(LoadError::Read { path, source });
                }
            }
        }

        fallback_source(import_path).map(|text| WellKnownSource {
            import_path,
            uri: format!("{BUILTIN_URI_PREFIX}{import_path}"),
            kind: SourceKind::Builtin,
            text: text.to_string(),
        })
    }

    fn disk_candidates(&self) -> impl Iterator<Item = (&Path, SourceKind)> {
        [
            (self.include_dir.as_deref(), SourceKind::Include),
            (self.resource_dir.as_deref(), SourceKind::Resource),
            (self.cache_dir.as_deref(), SourceKind::Cache),
        ]
        .into_iter()
        .filter_map(|(dir, kind)| dir.map(|dir| (dir, kind)))
    }

    /// Write an inline body into the cache directory, unless the proto
    /// already exists in one of the configured directories.
    fn materialize(&self, source: &WellKnownSource, report: &mut PreloadReport) {
        let Some(cache_dir) = &self.cache_dir else {
            return;
        };
        if self
            .disk_candidates()
            .any(|(dir, _)| dir.join(source.import_path).exists())
        {
            return;
        }

        let target = cache_dir.join(source.import_path);
        let written = match target.parent() {
            Some(parent) => fs::create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|()| fs::write(&target, &source.text));

        match written {
            Ok(()) => {
                debug!(path = %target.display(), "materialized well-known proto");
                report.materialized.push(target);
            }
            Err(error) => {
                warn!(path = %target.display(), %error, "failed to cache well-known proto");
                report.errors.push(LoadError::Write {
                    path: target,
                    source: error,
                });
            }
        }
    }
}
