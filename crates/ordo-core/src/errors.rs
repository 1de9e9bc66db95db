//! Structured error types shared across ORDO crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`OrdoError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the ORDO engine.
///
/// The variants map the failure taxonomy of the order machinery: `Generators`
/// is the only recoverable family (the caller may retry with a different
/// generating set); `Precondition` and `Inclusion` signal caller misuse on
/// exact data and are never retried; `Matrix` and `Algebra` surface structural
/// failures inside the linear algebra and algebra layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum OrdoError {
    /// Exact matrix and polynomial arithmetic errors.
    #[error("matrix error: {0}")]
    Matrix(ErrorInfo),
    /// Structure constant and algebra construction errors.
    #[error("algebra error: {0}")]
    Algebra(ErrorInfo),
    /// Supplied generators do not close into a ring of the expected rank.
    #[error("generators error: {0}")]
    Generators(ErrorInfo),
    /// A stated precondition of the operation does not hold.
    #[error("precondition error: {0}")]
    Precondition(ErrorInfo),
    /// Conductor requested for orders that are not integrally nested.
    #[error("inclusion error: {0}")]
    Inclusion(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl OrdoError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            OrdoError::Matrix(info)
            | OrdoError::Algebra(info)
            | OrdoError::Generators(info)
            | OrdoError::Precondition(info)
            | OrdoError::Inclusion(info) => info,
        }
    }
}
