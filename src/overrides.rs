//! Explicit overrides layered over an environment provider.
//!
//! Overrides are keyed by normalised environment name, so `app.port`,
//! `APP_PORT` and `app_port` all address the same variable.

use std::collections::BTreeMap;
use std::fmt;

use crate::env::{EnvProvider, env_key};

/// Which layer answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Set programmatically on the builder or via `--set`.
    Override,
    /// Read from the environment provider.
    Environment,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Override => f.write_str("override"),
            Source::Environment => f.write_str("environment"),
        }
    }
}

/// Read-side view the binder resolves keys against.
pub struct Lookup<'a> {
    overrides: BTreeMap<String, String>,
    provider: &'a dyn EnvProvider,
}

impl<'a> Lookup<'a> {
    pub fn new(provider: &'a dyn EnvProvider) -> Self {
        Self {
            overrides: BTreeMap::new(),
            provider,
        }
    }

    /// Add an override; a later override for the same name wins.
    pub fn with_override(mut self, key: &str, value: impl Into<String>) -> Self {
        self.overrides.insert(env_key(key), value.into());
        self
    }

    pub fn with_overrides<'k, I, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'k str, V)>,
        V: Into<String>,
    {
        entries
            .into_iter()
            .fold(self, |lookup, (key, value)| lookup.with_override(key, value))
    }

    /// The value for an environment name and where it came from.
    pub fn get(&self, name: &str) -> Option<(String, Source)> {
        if let Some(value) = self.overrides.get(name) {
            return Some((value.clone(), Source::Override));
        }
        self.provider
            .var(name)
            .map(|value| (value, Source::Environment))
    }
}

/// Split a `KEY=VALUE` argument. The value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
