//! Parser engine selection.
//!
//! Two engines implement the same contract: [`ProtoParser`] builds the AST
//! directly, [`TreeParser`] goes through the lossless rowan tree and lowers
//! it. [`ParserSelector`] decides which one to run for every call.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, warn};

use super::ast::ProtoFile;
use super::{lower, parser};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseEngineError {
    #[error("parser engine `{engine}` is not initialized")]
    NotInitialized { engine: &'static str },
    #[error("parser engine `{engine}` failed: {message}")]
    Failed {
        engine: &'static str,
        message: String,
    },
    #[error("parser engine `{engine}` panicked: {message}")]
    Panicked {
        engine: &'static str,
        message: String,
    },
}

/// The parse contract: text plus URI in, AST out.
pub trait ParseEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the engine can currently accept parse calls.
    fn is_initialized(&self) -> bool;

    fn parse(&self, text: &str, uri: &str) -> Result<ProtoFile, ParseEngineError>;
}

/// Recursive-descent parser producing the AST directly. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtoParser;

impl ParseEngine for ProtoParser {
    fn name(&self) -> &'static str {
        "proto"
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn parse(&self, text: &str, uri: &str) -> Result<ProtoFile, ParseEngineError> {
        Ok(parser::parse(text, uri))
    }
}

const SELF_CHECK_SOURCE: &str = r#"syntax = "proto3";
package selfcheck;
message Probe { string name = 1; map<string, int32> counts = 2; }
enum Mode { MODE_UNSPECIFIED = 0; }
service Prober { rpc Check(Probe) returns (stream Probe); }
"#;

/// Lossless-tree parser; must be initialized before use.
#[derive(Debug, Default)]
pub struct TreeParser {
    initialized: AtomicBool,
}

impl TreeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the grammar over a known-good document and mark the engine available
    /// if it round-trips without errors.
    pub fn initialize(&self) -> Result<(), ParseEngineError> {
        let parse = crate::parser::parse(SELF_CHECK_SOURCE);
        let file = lower::lower(&parse, SELF_CHECK_SOURCE, "selfcheck.proto");
        if !parse.ok() || file.has_errors() || file.definitions.len() != 3 {
            return Err(ParseEngineError::Failed {
                engine: self.name(),
                message: "grammar self-check failed".to_string(),
            });
        }
        self.initialized.store(true, Ordering::Release);
        debug!(engine = self.name(), "parser engine initialized");
        Ok(())
    }

    pub fn shutdown(&self) {
        self.initialized.store(false, Ordering::Release);
    }
}

impl ParseEngine for TreeParser {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn parse(&self, text: &str, uri: &str) -> Result<ProtoFile, ParseEngineError> {
        if !self.is_initialized() {
            return Err(ParseEngineError::NotInitialized {
                engine: self.name(),
            });
        }
        let parse = crate::parser::parse(text);
        Ok(lower::lower(&parse, text, uri))
    }
}

/// Which engine a call will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Primary,
    Alternate,
}

/// Routes parse calls to the primary engine or, when preferred and
/// available, the alternate one.
pub struct ParserSelector {
    primary: Arc<dyn ParseEngine>,
    alternate: Option<Arc<dyn ParseEngine>>,
    prefer_alternate: AtomicBool,
}

impl std::fmt::Debug for ParserSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserSelector")
            .field("primary", &self.primary.name())
            .field("alternate", &self.alternate.as_ref().map(|a| a.name()))
            .field("prefer_alternate", &self.prefers_alternate())
            .finish()
    }
}

impl Default for ParserSelector {
    fn default() -> Self {
        Self::new(Arc::new(ProtoParser))
    }
}

impl ParserSelector {
    pub fn new(primary: Arc<dyn ParseEngine>) -> Self {
        Self {
            primary,
            alternate: None,
            prefer_alternate: AtomicBool::new(false),
        }
    }

    pub fn with_alternate(mut self, alternate: Arc<dyn ParseEngine>) -> Self {
        self.alternate = Some(alternate);
        self
    }

    pub fn set_prefer_alternate(&self, prefer: bool) {
        self.prefer_alternate.store(prefer, Ordering::Release);
    }

    pub fn prefers_alternate(&self) -> bool {
        self.prefer_alternate.load(Ordering::Acquire)
    }

    /// Decide the engine for the next call. Evaluated fresh every time.
    pub fn select(&self) -> Strategy {
        match &self.alternate {
            Some(alt) if self.prefers_alternate() && alt.is_initialized() => Strategy::Alternate,
            _ => Strategy::Primary,
        }
    }

    /// Parse with the selected engine. Failures of the alternate engine,
    /// including panics, fall back to the primary for this call only.
    pub fn parse(&self, text: &str, uri: &str) -> ProtoFile {
        if let (Strategy::Alternate, Some(alt)) = (self.select(), &self.alternate) {
            match self.run_alternate(alt.as_ref(), text, uri) {
                Ok(file) => return file,
                Err(err) => warn!(%uri, error = %err, "alternate parser failed, using primary"),
            }
        }
        self.parse_primary(text, uri)
    }

    fn run_alternate(
        &self,
        engine: &dyn ParseEngine,
        text: &str,
        uri: &str,
    ) -> Result<ProtoFile, ParseEngineError> {
        debug!(%uri, engine = engine.name(), "parsing with alternate engine");
        match catch_unwind(AssertUnwindSafe(|| engine.parse(text, uri))) {
            Ok(result) => result,
            Err(payload) => Err(ParseEngineError::Panicked {
                engine: engine.name(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    fn parse_primary(&self, text: &str, uri: &str) -> ProtoFile {
        match self.primary.parse(text, uri) {
            Ok(file) => file,
            Err(err) => {
                warn!(%uri, error = %err, "primary parser failed, using built-in parser");
                parser::parse(text, uri)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
