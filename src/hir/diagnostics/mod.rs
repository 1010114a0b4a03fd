//! Diagnostics - rule-based validation of a file against the workspace.
//!
//! [`DiagnosticsEngine::validate`] runs every enabled [`Rule`] over one
//! file's AST plus the analyzer's symbol table. Each rule reports at its
//! configured severity; settings can be swapped at any time and apply to
//! the next call.
//!
//! ## Rule modules
//!
//! - `naming` - naming conventions
//! - `resolution` - unresolved type references, map key types
//! - `imports` - unresolved, unused, non-canonical and circular imports
//! - `fields` - field numbers, reserved names, duplicates
//! - `usage` - discouraged constructs, deprecated and unused symbols, docs
//! - `editions` - edition strings and `features.*` values

mod editions;
mod fields;
mod imports;
mod naming;
mod resolution;
mod settings;
mod usage;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

pub use settings::{DiagnosticsSettings, Rule};

use super::analyzer::SemanticAnalyzer;
use super::symbols::{FileSymbols, HirSymbol, TypeRef, extract_symbols};
use crate::base::Span;
use crate::base::constants::is_external_dependency;
use crate::syntax::{
    Definition, EnumDefinition, ExtendDefinition, GroupDefinition, MessageDefinition,
    MessageElement, OneofDefinition, OneofElement, ProtoFile, ServiceDefinition, qualify,
};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }

    /// Parse a settings value; `info` and `information` are synonyms.
    pub fn parse(text: &str) -> Option<Severity> {
        match text.to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "information" | "info" => Some(Severity::Info),
            "hint" => Some(Severity::Hint),
            _ => None,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The document containing this diagnostic.
    pub uri: Arc<str>,
    pub range: Span,
    pub severity: Severity,
    /// Rule identifier, e.g. `nonCanonicalImportPath`.
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub uri: Arc<str>,
    pub range: Span,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn new(
        uri: impl Into<Arc<str>>,
        range: Span,
        severity: Severity,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            uri: uri.into(),
            range,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during validation.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Validates files. Settings live behind a lock so they can be replaced
/// while the engine is shared.
#[derive(Debug, Default)]
pub struct DiagnosticsEngine {
    settings: RwLock<DiagnosticsSettings>,
}

impl DiagnosticsEngine {
    pub fn new(settings: DiagnosticsSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Replace the settings; the next `validate` call uses them.
    pub fn update_settings(&self, settings: DiagnosticsSettings) {
        *self.settings.write() = settings;
    }

    /// Merge a JSON settings object into the current settings.
    pub fn update_settings_from_value(&self, value: &serde_json::Value) {
        self.settings.write().apply_value(value);
    }

    pub fn settings(&self) -> DiagnosticsSettings {
        self.settings.read().clone()
    }

    /// Every diagnostic for `file`, in rule order. Vendored and built-in
    /// documents are not validated.
    pub fn validate(
        &self,
        uri: &str,
        file: &ProtoFile,
        analyzer: &SemanticAnalyzer,
    ) -> Vec<Diagnostic> {
        let settings = self.settings.read().clone();
        if !settings.enabled || is_external_dependency(uri) {
            return Vec::new();
        }

        let mut checker = Checker::new(uri, file, analyzer, &settings);
        checker.syntax_errors();
        naming::check(&mut checker);
        resolution::check(&mut checker);
        imports::check(&mut checker);
        fields::check(&mut checker);
        usage::check(&mut checker);
        editions::check(&mut checker);

        let diagnostics = checker.collector.take();
        debug!(%uri, count = diagnostics.len(), "validated file");
        diagnostics
    }
}

// ============================================================================
// CHECKER
// ============================================================================

/// Per-call state shared by the rule modules.
pub(super) struct Checker<'a> {
    pub uri: &'a str,
    pub file: &'a ProtoFile,
    pub analyzer: &'a SemanticAnalyzer,
    pub symbols: FileSymbols,
    /// Resolution of each entry of `symbols.type_refs`.
    pub resolved: Vec<Option<&'a HirSymbol>>,
    settings: &'a DiagnosticsSettings,
    collector: DiagnosticCollector,
}

impl<'a> Checker<'a> {
    fn new(
        uri: &'a str,
        file: &'a ProtoFile,
        analyzer: &'a SemanticAnalyzer,
        settings: &'a DiagnosticsSettings,
    ) -> Self {
        let mut symbols = extract_symbols(file);
        for symbol in &mut symbols.symbols {
            symbol.uri = Arc::from(uri);
        }
        let resolver = analyzer.resolver_for_file(uri, file);
        let resolved = symbols
            .type_refs
            .iter()
            .map(|r| resolver.resolve(&r.name, &r.scope, r.kind))
            .collect();
        Self {
            uri,
            file,
            analyzer,
            symbols,
            resolved,
            settings,
            collector: DiagnosticCollector::new(),
        }
    }

    pub fn enabled(&self, rule: Rule) -> bool {
        self.settings.is_enabled(rule)
    }

    pub fn report(&mut self, rule: Rule, range: Span, message: impl Into<Arc<str>>) {
        self.report_with(rule, range, message, None);
    }

    pub fn report_with(
        &mut self,
        rule: Rule,
        range: Span,
        message: impl Into<Arc<str>>,
        related: Option<RelatedInfo>,
    ) {
        if !self.enabled(rule) {
            return;
        }
        let mut diagnostic = Diagnostic::new(self.uri, range, self.settings.severity(rule), message)
            .with_code(rule.id());
        if let Some(related) = related {
            diagnostic = diagnostic.with_related(related);
        }
        self.collector.add(diagnostic);
    }

    /// Type references of the file with their resolution.
    pub fn refs(&self) -> impl Iterator<Item = (&TypeRef, Option<&'a HirSymbol>)> + '_ {
        self.symbols
            .type_refs
            .iter()
            .zip(self.resolved.iter().copied())
    }

    fn syntax_errors(&mut self) {
        let errors: Vec<_> = self
            .file
            .errors
            .iter()
            .map(|e| (e.span, e.message.clone()))
            .collect();
        for (span, message) in errors {
            self.report(Rule::SyntaxErrors, span, message);
        }
    }
}

// ============================================================================
// AST WALK
// ============================================================================

/// A definition visited by [`walk`], with its full name where it has one.
#[derive(Clone, Copy)]
pub(super) enum Node<'n, 'a> {
    Message(&'n str, &'a MessageDefinition),
    Group(&'n str, &'a GroupDefinition),
    Enum(&'a EnumDefinition),
    Service(&'a ServiceDefinition),
    Oneof(&'a OneofDefinition),
    Extend(&'a ExtendDefinition),
}

type Visitor<'v, 'a> = dyn FnMut(Node<'_, 'a>) + 'v;

/// Visit every definition in the file, depth-first in source order.
pub(super) fn walk<'a>(file: &'a ProtoFile, visit: &mut Visitor<'_, 'a>) {
    let package = file.package_name();
    for definition in &file.definitions {
        match definition {
            Definition::Message(m) => walk_message(package, m, visit),
            Definition::Enum(e) => visit(Node::Enum(e)),
            Definition::Service(s) => visit(Node::Service(s)),
            Definition::Extend(x) => walk_extend(package, x, visit),
        }
    }
}

fn walk_message<'a>(scope: &str, message: &'a MessageDefinition, visit: &mut Visitor<'_, 'a>) {
    let full_name = qualify(scope, &message.name);
    visit(Node::Message(&full_name, message));
    walk_elements(&full_name, &message.elements, visit);
}

fn walk_group<'a>(scope: &str, group: &'a GroupDefinition, visit: &mut Visitor<'_, 'a>) {
    let full_name = qualify(scope, &group.name);
    visit(Node::Group(&full_name, group));
    walk_elements(&full_name, &group.elements, visit);
}

fn walk_extend<'a>(scope: &str, extend: &'a ExtendDefinition, visit: &mut Visitor<'_, 'a>) {
    visit(Node::Extend(extend));
    for group in &extend.groups {
        walk_group(scope, group, visit);
    }
}

fn walk_elements<'a>(scope: &str, elements: &'a [MessageElement], visit: &mut Visitor<'_, 'a>) {
    for element in elements {
        match element {
            MessageElement::Message(m) => walk_message(scope, m, visit),
            MessageElement::Group(g) => walk_group(scope, g, visit),
            MessageElement::Enum(e) => visit(Node::Enum(e)),
            MessageElement::Extend(x) => walk_extend(scope, x, visit),
            MessageElement::Oneof(o) => {
                visit(Node::Oneof(o));
                for member in &o.elements {
                    if let OneofElement::Group(g) = member {
                        walk_group(scope, g, visit);
                    }
                }
            }
            MessageElement::Field(_)
            | MessageElement::MapField(_)
            | MessageElement::Reserved(_)
            | MessageElement::Extensions(_)
            | MessageElement::Option(_) => {}
        }
    }
}

#[cfg(test)]
mod tests;
