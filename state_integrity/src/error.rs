//! Error taxonomy and advisory diagnostics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can be wrong with a document.
///
/// Migration and repair never fail; they record these as [`Diagnostic`]s.
/// Validation reports them as a result value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IntegrityError {
    /// A required subtree is missing or has the wrong JSON type.
    #[error("structural error at {path}: {message}")]
    Structural { path: String, message: String },

    /// A number was outside its range or could not be read.
    #[error("range error at {path}: {message}")]
    Range { path: String, message: String },

    /// A cross-reference did not resolve.
    #[error("dangling reference at {path}: {message}")]
    Reference { path: String, message: String },

    /// The input matched no known schema generation.
    #[error("unknown schema version at {path}: {message}")]
    UnknownVersion { path: String, message: String },
}

impl IntegrityError {
    pub fn structural(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn range(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Range {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn reference(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reference {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unknown_version(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnknownVersion {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Dotted path of the offending value.
    pub fn path(&self) -> &str {
        match self {
            Self::Structural { path, .. }
            | Self::Range { path, .. }
            | Self::Reference { path, .. }
            | Self::UnknownVersion { path, .. } => path,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A value was normalized without losing information.
    Info,
    /// A value was replaced or dropped.
    Warning,
    /// The document could not be trusted and was replaced.
    Error,
}

/// One advisory note produced while migrating or repairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: IntegrityError,
}

impl Diagnostic {
    pub fn new(severity: Severity, error: IntegrityError) -> Self {
        Self { severity, error }
    }

    pub fn info(error: IntegrityError) -> Self {
        Self::new(Severity::Info, error)
    }

    pub fn warning(error: IntegrityError) -> Self {
        Self::new(Severity::Warning, error)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.error)
    }
}

/// Ordered collection of diagnostics produced by one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            severity = ?diagnostic.severity,
            path = diagnostic.error.path(),
            "{}",
            diagnostic.error
        );
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Diagnostics whose path starts with `prefix`.
    pub fn under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.0
            .iter()
            .filter(move |d| d.error.path().starts_with(prefix))
    }

    /// Highest severity recorded, if any.
    pub fn worst(&self) -> Option<Severity> {
        self.0.iter().map(|d| d.severity).max()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

/// Failure to load an [`crate::IntegrityConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
