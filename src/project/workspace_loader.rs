use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{LoadError, file_uri};
use crate::base::constants::PROTO_FILE_EXTENSION;
use crate::ide::AnalysisHost;
use crate::syntax::{ParserSelector, ProtoFile};

/// Outcome of loading a directory.
#[derive(Debug, Default)]
pub struct WorkspaceLoadReport {
    /// URIs that were indexed, in discovery order.
    pub loaded: Vec<String>,
    /// Per-file failures; the rest of the workspace still loads.
    pub errors: Vec<LoadError>,
}

/// Loads every `.proto` file under a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Recursively collect `.proto` paths under `dir`, sorted.
    pub fn collect_file_paths(&self, dir: &Path) -> (Vec<PathBuf>, Vec<LoadError>) {
        let mut paths = Vec::new();
        let mut errors = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_proto(entry.path()) {
                        paths.push(entry.into_path());
                    }
                }
                Err(source) => {
                    let path = source.path().unwrap_or(dir).to_path_buf();
                    warn!(
                        path = %path.display(),
                        error = %source,
                        "failed to walk workspace"
                    );
                    errors.push(LoadError::Walk { path, source });
                }
            }
        }
        paths.sort();
        (paths, errors)
    }

    /// Read and parse every `.proto` file under `dir` in parallel, then apply
    /// them to the host in a single batch.
    pub fn load_directory_into_host(
        &self,
        dir: impl AsRef<Path>,
        host: &mut AnalysisHost,
    ) -> Result<WorkspaceLoadReport, LoadError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LoadError::DirectoryNotFound(dir.to_path_buf()));
        }

        let (paths, mut errors) = self.collect_file_paths(dir);
        let parser = host.parser();
        let parsed: Vec<Result<ProtoFile, LoadError>> = paths
            .par_iter()
            .map(|path| load_and_parse(path, parser))
            .collect();

        let mut files = Vec::with_capacity(parsed.len());
        for result in parsed {
            match result {
                Ok(file) => files.push(file),
                Err(error) => {
                    warn!(%error, "skipping workspace file");
                    errors.push(error);
                }
            }
        }

        let loaded = files.iter().map(|f| f.uri.clone()).collect();
        debug!(
            dir = %dir.display(),
            files = files.len(),
            errors = errors.len(),
            "workspace loaded"
        );
        host.set_files(files);
        Ok(WorkspaceLoadReport { loaded, errors })
    }

    /// Read, parse and index one file. Returns its URI.
    pub fn load_file_into_host(
        &self,
        path: impl AsRef<Path>,
        host: &mut AnalysisHost,
    ) -> Result<String, LoadError> {
        let file = load_and_parse(path.as_ref(), host.parser())?;
        let uri = file.uri.clone();
        host.set_file(file);
        Ok(uri)
    }
}

fn is_proto(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(PROTO_FILE_EXTENSION)
}

fn load_and_parse(path: &Path, parser: &ParserSelector) -> Result<ProtoFile, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parser.parse(&text, &file_uri(path)))
}
