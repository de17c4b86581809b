//! Model identifiers
//!
//! A stored model is addressed in three interchangeable shapes:
//!
//! - a colon token `namespace:version:fileName`,
//! - a URN `urn:samm:namespace:version#name`,
//! - a relative path `namespace/version/fileName` under a storage root.
//!
//! Everything here is pure string and path manipulation; no I/O happens in this module.

use crate::error::StoreError;
use crate::types::{LATEST_FILE_NAME, TTL_EXTENSION, URN_PREFIX};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::str::FromStr;
use std::sync::OnceLock;

/// Logical address of a stored model, possibly only partially qualified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelIdentifier {
    /// Token with an unsupported number of parts, or empty parts.
    Invalid,
    NamespaceOnly {
        namespace: String,
    },
    NamespaceVersion {
        namespace: String,
        version: String,
    },
    Full {
        namespace: String,
        version: String,
        file_name: String,
    },
}

impl ModelIdentifier {
    pub fn full(
        namespace: impl Into<String>,
        version: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        ModelIdentifier::Full {
            namespace: namespace.into(),
            version: version.into(),
            file_name: file_name.into(),
        }
    }

    /// Parse a `namespace[:version[:fileName]]` token.
    ///
    /// Anything other than one to three non-empty parts yields [`ModelIdentifier::Invalid`]
    /// rather than an error; callers check [`ModelIdentifier::is_valid`] before use.
    pub fn parse(token: &str) -> Self {
        let parts: Vec<&str> = token.split(':').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return ModelIdentifier::Invalid;
        }
        match parts.as_slice() {
            [namespace] => ModelIdentifier::NamespaceOnly {
                namespace: namespace.to_string(),
            },
            [namespace, version] => ModelIdentifier::NamespaceVersion {
                namespace: namespace.to_string(),
                version: version.to_string(),
            },
            [namespace, version, file_name] => {
                ModelIdentifier::full(*namespace, *version, *file_name)
            }
            _ => ModelIdentifier::Invalid,
        }
    }

    /// Identifier of the file a URN's element is stored in.
    pub fn from_urn(urn: &AspectModelUrn) -> Self {
        ModelIdentifier::full(urn.namespace(), urn.version(), urn.file_name())
    }

    /// Resolve either a real URN or a path-like reference.
    ///
    /// A version segment carrying the model extension means the caller passed a path that was
    /// merely prefixed with the URN scheme; that input is parsed by path segments instead.
    pub fn from_urn_or_path(input: &str) -> Self {
        let stripped = input.strip_prefix(URN_PREFIX).unwrap_or(input);
        if let Some((head, name)) = stripped.rsplit_once('#') {
            if let Some((namespace, version)) = head.rsplit_once(':') {
                if !version.contains(TTL_EXTENSION) && !name.is_empty() {
                    return ModelIdentifier::full(
                        namespace,
                        version,
                        format!("{}{}", name, TTL_EXTENSION),
                    );
                }
            }
        }
        Self::from_relative_path(stripped)
    }

    fn from_relative_path(path: &str) -> Self {
        let segments: Vec<&str> = path
            .split(|c| c == '/' || c == '\\' || c == ':' || c == '#')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [] => ModelIdentifier::Invalid,
            [namespace] => ModelIdentifier::NamespaceOnly {
                namespace: namespace.to_string(),
            },
            [namespace, version] => ModelIdentifier::NamespaceVersion {
                namespace: namespace.to_string(),
                version: version.to_string(),
            },
            [.., namespace, version, file_name] => {
                let file_name = if file_name.ends_with(TTL_EXTENSION) {
                    file_name.to_string()
                } else {
                    format!("{}{}", file_name, TTL_EXTENSION)
                };
                ModelIdentifier::full(*namespace, *version, file_name)
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, ModelIdentifier::Invalid)
    }

    pub fn is_fully_qualified(&self) -> bool {
        matches!(self, ModelIdentifier::Full { .. })
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            ModelIdentifier::Invalid => None,
            ModelIdentifier::NamespaceOnly { namespace }
            | ModelIdentifier::NamespaceVersion { namespace, .. }
            | ModelIdentifier::Full { namespace, .. } => Some(namespace),
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            ModelIdentifier::NamespaceVersion { version, .. }
            | ModelIdentifier::Full { version, .. } => Some(version),
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            ModelIdentifier::Full { file_name, .. } => Some(file_name),
            _ => None,
        }
    }

    /// The `namespace:version` key this identifier lists under.
    pub fn namespace_key(&self) -> Option<String> {
        match (self.namespace(), self.version()) {
            (Some(namespace), Some(version)) => Some(format!("{}:{}", namespace, version)),
            _ => None,
        }
    }

    /// Path of the identified file or directory relative to a storage root.
    ///
    /// The `latest.ttl` marker is already a complete relative path and never gets a
    /// namespace prefix. An invalid identifier maps to the empty path.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            ModelIdentifier::Invalid => PathBuf::new(),
            ModelIdentifier::NamespaceOnly { namespace } => PathBuf::from(namespace),
            ModelIdentifier::NamespaceVersion { namespace, version } => {
                PathBuf::from(namespace).join(version)
            }
            ModelIdentifier::Full { file_name, .. } if file_name == LATEST_FILE_NAME => {
                PathBuf::from(LATEST_FILE_NAME)
            }
            ModelIdentifier::Full {
                namespace,
                version,
                file_name,
            } => PathBuf::from(namespace).join(version).join(file_name),
        }
    }

    /// URN of the model element named after this identifier's file.
    pub fn to_urn(&self) -> Result<AspectModelUrn, StoreError> {
        match self {
            ModelIdentifier::Full {
                namespace,
                version,
                file_name,
            } => {
                let name = file_name.strip_suffix(TTL_EXTENSION).unwrap_or(file_name);
                AspectModelUrn::new(namespace, version, name)
            }
            other => Err(StoreError::InvalidAspectModel(format!(
                "'{}' is not a fully qualified model identifier",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelIdentifier::Invalid => f.write_str("<invalid>"),
            ModelIdentifier::NamespaceOnly { namespace } => f.write_str(namespace),
            ModelIdentifier::NamespaceVersion { namespace, version } => {
                write!(f, "{}:{}", namespace, version)
            }
            ModelIdentifier::Full {
                namespace,
                version,
                file_name,
            } => write!(f, "{}:{}:{}", namespace, version, file_name),
        }
    }
}

/// Parse a colon token into an identifier.
pub fn parse_identifier(token: &str) -> ModelIdentifier {
    ModelIdentifier::parse(token)
}

/// Join an identifier's parts with the platform separator.
pub fn build_file_path(identifier: &ModelIdentifier) -> PathBuf {
    identifier.relative_path()
}

/// Turn a root-relative path into its colon token.
///
/// Replaces the last separator with `:`, then the new last separator (if any) with `:`,
/// then drops every remaining separator. `acme/1.0.0/Foo.ttl` becomes `acme:1.0.0:Foo.ttl`
/// and `acme/1.0.0` becomes `acme:1.0.0`. Paths nested deeper than three segments collapse
/// their leading segments together; names that already contain `:` are not supported.
pub fn to_directory_token(path: &Path) -> String {
    let mut token = path.to_string_lossy().into_owned();
    for _ in 0..2 {
        if let Some(index) = token.rfind(MAIN_SEPARATOR) {
            token.replace_range(index..index + MAIN_SEPARATOR.len_utf8(), ":");
        }
    }
    token.retain(|c| c != MAIN_SEPARATOR);
    token
}

/// Turn a `namespace:version:name.ttl` token into a URN.
///
/// Only the last `:` becomes the `#` fragment separator.
pub fn file_name_to_urn(token: &str) -> Result<AspectModelUrn, StoreError> {
    let trimmed = token.strip_suffix(TTL_EXTENSION).unwrap_or(token);
    let candidate = match trimmed.rfind(':') {
        Some(index) => format!("{}{}#{}", URN_PREFIX, &trimmed[..index], &trimmed[index + 1..]),
        None => format!("{}{}", URN_PREFIX, trimmed),
    };
    candidate.parse()
}

/// Turn a stored file's `namespace/version/name.ttl` position into a URN.
pub fn file_to_urn(path: &Path) -> Result<AspectModelUrn, StoreError> {
    let segments: Vec<String> = path
        .components()
        .rev()
        .take(3)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    match segments.as_slice() {
        [file_name, version, namespace] => {
            file_name_to_urn(&format!("{}:{}:{}", namespace, version, file_name))
        }
        _ => Err(StoreError::InvalidAspectModel(format!(
            "{} is not located at <namespace>/<version>/<file>",
            path.display()
        ))),
    }
}

fn urn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^urn:samm:(?P<namespace>[A-Za-z0-9][A-Za-z0-9_\-]*(?:\.[A-Za-z0-9_\-]+)*):(?P<version>\d+\.\d+\.\d+(?:-[0-9A-Za-z.\-]+)?(?:\+[0-9A-Za-z.\-]+)?)#(?P<name>[A-Za-z_][A-Za-z0-9_\-]*)$",
        )
        .expect("URN pattern is a valid regex")
    })
}

/// Well-formed `urn:samm:<namespace>:<version>#<name>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectModelUrn {
    namespace: String,
    version: String,
    name: String,
}

impl AspectModelUrn {
    pub fn new(namespace: &str, version: &str, name: &str) -> Result<Self, StoreError> {
        format!("{}{}:{}#{}", URN_PREFIX, namespace, version, name).parse()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `namespace:version`
    pub fn namespace_key(&self) -> String {
        format!("{}:{}", self.namespace, self.version)
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, TTL_EXTENSION)
    }

    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.namespace)
            .join(&self.version)
            .join(self.file_name())
    }
}

impl FromStr for AspectModelUrn {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = urn_pattern().captures(s).ok_or_else(|| {
            StoreError::InvalidAspectModel(format!("'{}' is not a valid aspect model URN", s))
        })?;
        Ok(AspectModelUrn {
            namespace: captures["namespace"].to_string(),
            version: captures["version"].to_string(),
            name: captures["name"].to_string(),
        })
    }
}

impl TryFrom<String> for AspectModelUrn {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectModelUrn> for String {
    fn from(urn: AspectModelUrn) -> Self {
        urn.to_string()
    }
}

impl fmt::Display for AspectModelUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}#{}",
            URN_PREFIX, self.namespace, self.version, self.name
        )
    }
}
