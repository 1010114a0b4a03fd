//! Project layer tests: well-known preloading and workspace loading on disk.

pub mod tests_preload;
pub mod tests_workspace;
