//! Diagnostic rules and their user-configurable settings.

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::warn;

use super::Severity;

/// Every rule the engine knows, identified in settings and diagnostic codes
/// by [`Rule::id`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    SyntaxErrors,
    NamingConventions,
    ReferenceErrors,
    UnresolvedImport,
    UnusedImport,
    NonCanonicalImportPath,
    FieldTagIssues,
    DuplicateFieldNumber,
    DiscouragedConstructs,
    DeprecatedUsage,
    UnusedSymbol,
    CircularImport,
    MissingDocumentation,
    EditionFeatures,
}

impl Rule {
    pub const ALL: [Rule; 14] = [
        Rule::SyntaxErrors,
        Rule::NamingConventions,
        Rule::ReferenceErrors,
        Rule::UnresolvedImport,
        Rule::UnusedImport,
        Rule::NonCanonicalImportPath,
        Rule::FieldTagIssues,
        Rule::DuplicateFieldNumber,
        Rule::DiscouragedConstructs,
        Rule::DeprecatedUsage,
        Rule::UnusedSymbol,
        Rule::CircularImport,
        Rule::MissingDocumentation,
        Rule::EditionFeatures,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Rule::SyntaxErrors => "syntaxErrors",
            Rule::NamingConventions => "namingConventions",
            Rule::ReferenceErrors => "referenceErrors",
            Rule::UnresolvedImport => "unresolvedImport",
            Rule::UnusedImport => "unusedImport",
            Rule::NonCanonicalImportPath => "nonCanonicalImportPath",
            Rule::FieldTagIssues => "fieldTagIssues",
            Rule::DuplicateFieldNumber => "duplicateFieldNumber",
            Rule::DiscouragedConstructs => "discouragedConstructs",
            Rule::DeprecatedUsage => "deprecatedUsage",
            Rule::UnusedSymbol => "unusedSymbol",
            Rule::CircularImport => "circularImport",
            Rule::MissingDocumentation => "missingDocumentation",
            Rule::EditionFeatures => "editionFeatures",
        }
    }

    pub fn from_id(id: &str) -> Option<Rule> {
        Rule::ALL.into_iter().find(|r| r.id() == id)
    }

    pub fn default_severity(self) -> Severity {
        match self {
            Rule::SyntaxErrors
            | Rule::ReferenceErrors
            | Rule::UnresolvedImport
            | Rule::NonCanonicalImportPath
            | Rule::FieldTagIssues
            | Rule::DuplicateFieldNumber
            | Rule::CircularImport
            | Rule::EditionFeatures => Severity::Error,
            Rule::NamingConventions | Rule::DiscouragedConstructs | Rule::DeprecatedUsage => {
                Severity::Warning
            }
            Rule::MissingDocumentation => Severity::Info,
            Rule::UnusedImport | Rule::UnusedSymbol => Severity::Hint,
        }
    }

    /// The settings key that switches this rule on or off. Syntax errors
    /// are always reported.
    pub fn toggle(self) -> Option<&'static str> {
        match self {
            Rule::SyntaxErrors => None,
            Rule::NamingConventions => Some("namingConventions"),
            Rule::ReferenceErrors => Some("referenceChecks"),
            Rule::UnresolvedImport | Rule::UnusedImport | Rule::NonCanonicalImportPath => {
                Some("importChecks")
            }
            Rule::FieldTagIssues => Some("fieldTagChecks"),
            Rule::DuplicateFieldNumber => Some("duplicateFieldChecks"),
            Rule::DiscouragedConstructs => Some("discouragedConstructs"),
            Rule::DeprecatedUsage => Some("deprecatedUsage"),
            Rule::UnusedSymbol => Some("unusedSymbols"),
            Rule::CircularImport => Some("circularDependencies"),
            Rule::MissingDocumentation => Some("documentationComments"),
            Rule::EditionFeatures => Some("editionFeatures"),
        }
    }
}

/// Toggle keys and whether they are on by default.
const TOGGLES: &[(&str, bool)] = &[
    ("namingConventions", true),
    ("referenceChecks", true),
    ("importChecks", true),
    ("fieldTagChecks", true),
    ("duplicateFieldChecks", true),
    ("discouragedConstructs", true),
    ("deprecatedUsage", true),
    ("unusedSymbols", false),
    ("circularDependencies", true),
    ("documentationComments", false),
    ("editionFeatures", true),
];

fn known_toggle(key: &str) -> Option<&'static str> {
    TOGGLES.iter().map(|(k, _)| *k).find(|k| *k == key)
}

/// Which rules run and at what severity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticsSettings {
    /// Master switch for the whole engine.
    pub enabled: bool,
    toggles: FxHashMap<&'static str, bool>,
    severities: FxHashMap<Rule, Severity>,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            toggles: TOGGLES.iter().copied().collect(),
            severities: FxHashMap::default(),
        }
    }
}

impl DiagnosticsSettings {
    /// Read settings from a JSON object. Unknown keys, wrong-typed values and
    /// invalid severities are logged and ignored.
    pub fn from_value(value: &Value) -> Self {
        let mut settings = Self::default();
        settings.apply_value(value);
        settings
    }

    /// Apply a JSON settings object on top of the current values.
    pub fn apply_value(&mut self, value: &Value) {
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                warn!(?value, "diagnostics settings must be an object; using defaults");
            }
            return;
        };

        for (key, value) in object {
            match (key.as_str(), value) {
                ("enabled", Value::Bool(on)) => self.enabled = *on,
                ("severity", Value::Object(overrides)) => {
                    for (rule, severity) in overrides {
                        self.apply_severity(rule, severity);
                    }
                }
                (key, Value::Bool(on)) if known_toggle(key).is_some() => {
                    self.set_toggle(key, *on);
                }
                (key, Value::String(_)) if Rule::from_id(key).is_some() => {
                    self.apply_severity(key, value);
                }
                (key, _)
                    if key == "enabled" || key == "severity" || known_toggle(key).is_some() =>
                {
                    warn!(%key, ?value, "ignoring diagnostics setting with unexpected type");
                }
                (key, _) => warn!(%key, "ignoring unknown diagnostics setting"),
            }
        }
    }

    fn apply_severity(&mut self, rule: &str, severity: &Value) {
        let Some(parsed_rule) = Rule::from_id(rule) else {
            warn!(%rule, "ignoring severity for unknown diagnostic rule");
            return;
        };
        match severity.as_str().and_then(Severity::parse) {
            Some(severity) => self.set_severity(parsed_rule, severity),
            None => warn!(%rule, ?severity, "ignoring invalid diagnostic severity"),
        }
    }

    /// Switch a toggle key on or off. Returns false for unknown keys.
    pub fn set_toggle(&mut self, key: &str, on: bool) -> bool {
        match known_toggle(key) {
            Some(key) => {
                self.toggles.insert(key, on);
                true
            }
            None => false,
        }
    }

    pub fn set_severity(&mut self, rule: Rule, severity: Severity) {
        self.severities.insert(rule, severity);
    }

    pub fn is_enabled(&self, rule: Rule) -> bool {
        if !self.enabled {
            return false;
        }
        match rule.toggle() {
            Some(key) => self.toggles.get(key).copied().unwrap_or(false),
            None => true,
        }
    }

    pub fn severity(&self, rule: Rule) -> Severity {
        self.severities
            .get(&rule)
            .copied()
            .unwrap_or_else(|| rule.default_severity())
    }
}
