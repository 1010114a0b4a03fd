//! Project management: well-known preloading and workspace loading.
//!
//! Both loaders read from disk, parse with the host's parser and feed the
//! results through the same update path editors use for open documents.

mod error;
mod fallback;
pub mod well_known;
pub mod workspace_loader;

use std::path::Path;

pub use error::LoadError;
pub use fallback::fallback_source;
pub use well_known::{PreloadReport, SourceKind, WellKnownLoader, WellKnownSource};
pub use workspace_loader::{WorkspaceLoadReport, WorkspaceLoader};

use crate::base::constants::FILE_URI_PREFIX;

/// The `file://` URI for a path on disk.
pub fn file_uri(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("{FILE_URI_PREFIX}{path}")
    } else {
        format!("{FILE_URI_PREFIX}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_uri() {
        assert_eq!(file_uri(Path::new("/ws/a.proto")), "file:///ws/a.proto");
        assert_eq!(file_uri(Path::new("C:\\ws\\a.proto")), "file:///C:/ws/a.proto");
    }
}
