//! Error types for schema declaration, layer loading, and resolution.

use crate::FieldType;
use std::fmt;
use thiserror::Error;

/// Errors returned while declaring schemas, loading layers, or resolving.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a JSON5 document failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting JSON values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// Parsing a `.env` file failed.
    #[error("failed to parse dotenv file: {0}")]
    DotEnvFailed(#[from] dotenvy::Error),
    /// A specific field failed validation.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// Generic validation failure.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Resolution found one or more violations.
    #[error("{0}")]
    Resolution(ResolutionReport),
}

impl ConfigError {
    /// Violations carried by a resolution failure; empty for other errors.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ConfigError::Resolution(report) => &report.violations,
            _ => &[],
        }
    }
}

/// A single problem found while resolving a schema against its layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// No layer supplied the key and the schema declares no default.
    MissingRequiredValue { key: String },
    /// A raw value did not parse as the declared type.
    TypeCoercionFailure {
        key: String,
        raw: String,
        expected: FieldType,
    },
    /// Strict mode: a layer carries a key the schema does not declare.
    UnknownKey { key: String, layer: String },
}

impl Violation {
    /// The dotted key the violation is about.
    pub fn key(&self) -> &str {
        match self {
            Violation::MissingRequiredValue { key }
            | Violation::TypeCoercionFailure { key, .. }
            | Violation::UnknownKey { key, .. } => key,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingRequiredValue { key } => {
                write!(f, "{key}: missing required value")
            }
            Violation::TypeCoercionFailure { key, raw, expected } => {
                write!(f, "{key}: cannot convert {raw:?} to {expected}")
            }
            Violation::UnknownKey { key, layer } => {
                write!(f, "{key}: unknown key (from {layer})")
            }
        }
    }
}

/// Every violation found in one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Name of the schema being resolved.
    pub schema: String,
    /// Schema prefix, used to print every key as written in the layers.
    pub prefix: Option<String>,
    /// Violations in the order they were found.
    pub violations: Vec<Violation>,
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.violations.len();
        let noun = if count == 1 { "problem" } else { "problems" };
        write!(f, "configuration '{}' has {count} {noun}:", self.schema)?;
        for violation in &self.violations {
            match (&self.prefix, violation) {
                (Some(prefix), Violation::MissingRequiredValue { .. })
                | (Some(prefix), Violation::TypeCoercionFailure { .. }) => {
                    write!(f, "\n  - {prefix}.{violation}")?
                }
                _ => write!(f, "\n  - {violation}")?,
            }
        }
        Ok(())
    }
}
