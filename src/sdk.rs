//! Aspect-model SDK interfaces
//!
//! Turtle parsing, SHACL validation, migration and pretty printing belong to an external SDK.
//! The store only talks to it through the two traits here:
//!
//! - [`AspectModelResolver`] parses content and finds the URN a model declares for itself.
//! - [`ModelToolkit`] validates, migrates and serialises parsed models.
//!
//! [`DeclarationResolver`] is the built-in resolver used when no SDK is wired in. It reads
//! prefix declarations and typed element statements, which is all URN resolution needs.

use crate::error::SdkError;
use crate::identifier::AspectModelUrn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Namespace every meta-model vocabulary lives under.
pub const META_MODEL_NAMESPACE: &str = "urn:samm:org.eclipse.esmf.samm:";

/// Element types that can give a model its identity, in priority order.
const IDENTIFYING_TYPES: &[&str] = &[
    "Aspect",
    "Entity",
    "AbstractEntity",
    "Property",
    "AbstractProperty",
    "Characteristic",
    "Constraint",
    "Operation",
    "Event",
    "Unit",
];

/// Options forwarded to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Whether the SDK should type-check literals while parsing.
    pub strict_type_checking: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_type_checking: true,
        }
    }
}

impl ParseOptions {
    /// Options used when persisting content, which is never type-checked on the way to disk.
    pub fn for_save() -> Self {
        Self {
            strict_type_checking: false,
        }
    }
}

/// Parsed model handed between the resolver and the toolkit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedModel {
    pub source: String,
    pub prefixes: BTreeMap<String, String>,
    pub options: ParseOptions,
}

/// One violation reported by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub error_code: String,
    pub message: String,
    pub focus_element: Option<String>,
    #[serde(default)]
    pub fixes: Vec<String>,
}

/// Validation outcome; empty means the model conforms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Parsing and identity resolution.
pub trait AspectModelResolver: Send + Sync {
    fn parse_turtle(&self, content: &str, options: ParseOptions) -> Result<ParsedModel, SdkError>;

    fn resolve_aspect_model_urn(&self, model: &ParsedModel) -> Result<AspectModelUrn, SdkError>;

    /// Parse then resolve in one step.
    fn resolve_content(
        &self,
        content: &str,
        options: ParseOptions,
    ) -> Result<AspectModelUrn, SdkError> {
        let model = self.parse_turtle(content, options)?;
        self.resolve_aspect_model_urn(&model)
    }
}

/// Validation, migration and serialisation of parsed models.
pub trait ModelToolkit: Send + Sync {
    fn validate(&self, model: &ParsedModel) -> ValidationReport;

    fn migrate(&self, model: ParsedModel) -> Result<ParsedModel, SdkError>;

    fn pretty_print(&self, model: &ParsedModel, urn: &AspectModelUrn) -> String;
}

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?mi)^\s*@?prefix\s+([A-Za-z][\w\-.]*)?:\s*<([^>]*)>\s*\.?\s*$")
            .expect("prefix pattern is a valid regex")
    })
}

fn typed_statement_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(<[^>\s]+>|[A-Za-z][\w\-.]*:[\w\-]*|:[\w\-]+)\s+(?:a|rdf:type)\s+(<[^>\s]+>|[A-Za-z][\w\-.]*:[\w\-]+|:[\w\-]+)",
        )
        .expect("typed statement pattern is a valid regex")
    })
}

/// Resolver reading prefix declarations and `subject a type` statements.
#[derive(Debug, Default, Clone)]
pub struct DeclarationResolver;

impl DeclarationResolver {
    pub fn new() -> Self {
        Self
    }

    fn expand(term: &str, prefixes: &BTreeMap<String, String>) -> Option<String> {
        if let Some(iri) = term.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            return Some(iri.to_string());
        }
        let (prefix, local) = term.split_once(':')?;
        prefixes
            .get(prefix)
            .map(|namespace| format!("{}{}", namespace, local))
    }

    fn type_rank(type_iri: &str) -> Option<usize> {
        if !type_iri.starts_with(META_MODEL_NAMESPACE) {
            return None;
        }
        let local = type_iri.rsplit_once('#').map(|(_, local)| local)?;
        IDENTIFYING_TYPES
            .iter()
            .position(|t| *t == local)
            .or(Some(IDENTIFYING_TYPES.len()))
    }
}

impl AspectModelResolver for DeclarationResolver {
    fn parse_turtle(&self, content: &str, options: ParseOptions) -> Result<ParsedModel, SdkError> {
        if content.trim().is_empty() {
            return Err(SdkError::Parse("model content is empty".to_string()));
        }
        let mut prefixes = BTreeMap::new();
        for line in content.lines() {
            let trimmed = line.trim_start();
            let lowered = trimmed.to_ascii_lowercase();
            if !(lowered.starts_with("@prefix") || lowered.starts_with("prefix ")) {
                continue;
            }
            let captures = prefix_pattern()
                .captures(line)
                .ok_or_else(|| SdkError::Parse(format!("malformed prefix declaration: {}", trimmed)))?;
            let name = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            prefixes.insert(name.to_string(), captures[2].to_string());
        }
        Ok(ParsedModel {
            source: content.to_string(),
            prefixes,
            options,
        })
    }

    fn resolve_aspect_model_urn(&self, model: &ParsedModel) -> Result<AspectModelUrn, SdkError> {
        let mut best: Option<(usize, String)> = None;
        for captures in typed_statement_pattern().captures_iter(&model.source) {
            let Some(type_iri) = Self::expand(&captures[2], &model.prefixes) else {
                continue;
            };
            let Some(rank) = Self::type_rank(&type_iri) else {
                continue;
            };
            let Some(subject) = Self::expand(&captures[1], &model.prefixes) else {
                continue;
            };
            if subject.starts_with(META_MODEL_NAMESPACE) {
                continue;
            }
            if best.as_ref().map(|(r, _)| rank < *r).unwrap_or(true) {
                best = Some((rank, subject));
            }
        }
        let (_, subject) = best.ok_or_else(|| {
            SdkError::Resolve("no meta-model element declaration found".to_string())
        })?;
        subject
            .parse()
            .map_err(|e| SdkError::Resolve(format!("{} ({})", subject, e)))
    }
}
