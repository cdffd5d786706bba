use std::path::PathBuf;
use thiserror::Error;

use crate::validate::ValidationErrors;

/// Every failure envfig reports.
///
/// Two tiers: *structural* errors (bad files, bad values, bad rules) abort the
/// call at the first problem; [`Validation`](EnvfigError::Validation) carries
/// every constraint violation found in one pass. See
/// [`is_structural`](EnvfigError::is_structural).
#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum EnvfigError {
    #[error("Cannot determine the working directory: {0}")]
    NoWorkingDirectory(#[source] std::io::Error),

    #[error("No ancestor directory named '{anchor}' above {start}")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(help("run from inside the project tree or pick another seed root"))
    )]
    AnchorNotFound { anchor: String, start: PathBuf },

    #[error("No platform config directory available for '{app_name}'")]
    PlatformDirUnavailable { app_name: String },

    #[error("Env file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    EnvFileParse {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unsupported value for '{key}' in {path}: only scalars and scalar arrays are allowed")]
    UnsupportedFileValue { key: String, path: PathBuf },

    #[error("Invalid value for '{field}' (from {key}): {reason}")]
    InvalidValue {
        field: String,
        key: String,
        reason: String,
    },

    #[error("Fields '{first}' and '{second}' both bind to {key}")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },

    #[error("Unknown rule '{rule}' on field '{field}'")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(help("register it with .conform_rule() or .validation_rule() on the builder"))
    )]
    UnknownRule { field: String, rule: String },

    #[error("Invalid rule '{rule}' on field '{field}': {reason}")]
    InvalidRule {
        field: String,
        rule: String,
        reason: String,
    },

    #[error(transparent)]
    #[cfg_attr(feature = "rich-errors", diagnostic(transparent))]
    Validation(#[from] ValidationErrors),
}

impl EnvfigError {
    /// `true` for everything except aggregated validation failures.
    pub fn is_structural(&self) -> bool {
        !matches!(self, EnvfigError::Validation(_))
    }

    /// The validation failures, if this is a validation error.
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            EnvfigError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
