//! Host configuration, read from camelCase JSON.
//!
//! ```json
//! {
//!   "preferTreeParser": true,
//!   "diagnostics": { "nonCanonicalImportPath": "hint" },
//!   "wellKnown": { "includeDir": "/usr/include", "cacheDir": "/tmp/wkt" }
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::hir::DiagnosticsSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Parse with the tree engine when it is available.
    pub prefer_tree_parser: bool,
    /// Raw diagnostics settings; see [`DiagnosticsSettings::from_value`].
    pub diagnostics: Value,
    pub well_known: WellKnownConfig,
}

/// Where well-known protos are looked up, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WellKnownConfig {
    /// An include directory discovered from an installed compiler.
    pub include_dir: Option<PathBuf>,
    /// Protos bundled with the host application.
    pub resource_dir: Option<PathBuf>,
    /// Writable directory fallback content is materialized into.
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Like [`Config::from_json`] on an already parsed value, but never fails:
    /// a malformed value is logged and the defaults are used.
    pub fn from_value(value: &Value) -> Self {
        match Self::deserialize(value) {
            Ok(config) => config,
            Err(error) => {
                warn!(%error, "invalid configuration; using defaults");
                Self::default()
            }
        }
    }

    pub fn diagnostics_settings(&self) -> DiagnosticsSettings {
        DiagnosticsSettings::from_value(&self.diagnostics)
    }
}
