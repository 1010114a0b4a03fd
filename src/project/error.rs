//! Errors raised while reading protos from disk.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl LoadError {
    /// The file or directory the failure is about.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::DirectoryNotFound(path) => path,
            Self::Read { path, .. } | Self::Write { path, .. } | Self::Walk { path, .. } => path,
        }
    }
}
