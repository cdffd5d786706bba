//! Validation: check every field's declared constraints after binding and
//! conformance, and report all failures together.
//!
//! The walk visits every field of the record in declaration order, including
//! fields that are not bound under the active tag. Every rule on a field is
//! checked, so one field can report several violations; only `omitempty` ends
//! the field's rules early, when its value is zero. Problems with the rules
//! themselves (unknown name, bad parameter) abort the walk as structural
//! errors.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::env::env_key;
use crate::error::EnvfigError;
use crate::leaf::Leaf;
use crate::rules::{OMITEMPTY, Rules, Verdict, invalid_rule, parse_field_rules, unknown_rule};
use crate::schema::{Config, FieldKind, FieldMeta, Schema, Slot, dotted};

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
#[error(
    "{field}{} [{rule}]: {message}",
    .key.as_deref().map(|k| format!(" ({k})")).unwrap_or_default()
)]
pub struct Violation {
    /// Dotted Rust field path, e.g. `app.required`.
    pub field: String,
    /// The environment variable the field binds to, if bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    pub message: String,
}

/// Every violation found in one validation pass, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// The first violation for a field path, if that field failed.
    pub fn field(&self, path: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.field == path)
    }

    /// Every violation for a field path, in rule declaration order.
    pub fn field_all<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.field == path)
    }

    /// Render as a JSON array of violations.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }
}

impl From<Vec<Violation>> for ValidationErrors {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(feature = "rich-errors")]
impl miette::Diagnostic for ValidationErrors {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("envfig::validation"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!(
            "{} field(s) failed validation",
            self.violations.len()
        )))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn miette::Diagnostic> + 'a>> {
        Some(Box::new(
            self.violations
                .iter()
                .map(|v| v as &dyn miette::Diagnostic),
        ))
    }
}

/// Validate a record against its declared rules.
///
/// `tag` only decides which environment name each violation reports.
pub fn validate<C: Config>(record: &C, rules: &Rules, tag: &str) -> Result<(), EnvfigError> {
    validate_schema(record, C::schema(), rules, tag)
}

pub(crate) fn validate_schema(
    record: &dyn Config,
    schema: &'static Schema,
    rules: &Rules,
    tag: &str,
) -> Result<(), EnvfigError> {
    let mut violations = Vec::new();
    walk(record, schema, rules, tag, "", Some(""), &mut violations)?;

    if violations.is_empty() {
        tracing::debug!(event = "envfig.validate.passed", record = schema.name);
        return Ok(());
    }
    tracing::warn!(
        event = "envfig.validate.failed",
        record = schema.name,
        violations = violations.len(),
    );
    Err(ValidationErrors::from(violations).into())
}

fn walk(
    record: &dyn Config,
    schema: &'static Schema,
    rules: &Rules,
    tag: &str,
    prefix: &str,
    key_prefix: Option<&str>,
    out: &mut Vec<Violation>,
) -> Result<(), EnvfigError> {
    for (index, meta) in schema.fields.iter().enumerate() {
        let field = dotted(prefix, meta.name);
        let key = key_prefix.and_then(|p| meta.key(tag).map(|k| dotted(p, k)));
        match (meta.kind, record.slot(index)) {
            (FieldKind::Nested(child), Some(Slot::Nested(nested))) => {
                walk(nested, child(), rules, tag, &field, key.as_deref(), out)?;
            }
            (FieldKind::Leaf, Some(Slot::Leaf(leaf))) => {
                check_leaf(leaf, meta, rules, &field, key.as_deref(), out)?;
            }
            _ => tracing::debug!(
                event = "envfig.validate.slot_mismatch",
                record = schema.name,
                field = %field,
            ),
        }
    }
    Ok(())
}

fn check_leaf(
    leaf: &dyn Leaf,
    meta: &FieldMeta,
    rules: &Rules,
    field: &str,
    key: Option<&str>,
    out: &mut Vec<Violation>,
) -> Result<(), EnvfigError> {
    let value = leaf.value();
    for rule in parse_field_rules(field, meta.validate)? {
        if rule.name == OMITEMPTY {
            if value.is_zero() {
                break;
            }
            continue;
        }
        let check = rules
            .validation_rule(rule.name)
            .ok_or_else(|| unknown_rule(field, rule.name))?;
        let verdict = check
            .check(&value, rule.param)
            .map_err(|e| invalid_rule(field, &rule, e))?;
        if let Verdict::Fail(message) = verdict {
            out.push(Violation {
                field: field.to_string(),
                key: key.map(env_key),
                rule: rule.name.to_string(),
                param: rule.param.map(str::to_string),
                message,
            });
        }
    }
    Ok(())
}
