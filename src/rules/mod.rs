//! Rule registry shared by the conformance pipeline and the validator.
//!
//! Rules are declared on fields as comma-separated specs:
//! `conform = "trim,lcase"`, `validate = "required,min=1,max=65535"`. Each
//! entry is a name optionally followed by `=param`. Names resolve through a
//! [`Rules`] registry, which starts with the built-in set and accepts custom
//! rules.

mod constraints;
mod modifiers;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::error::EnvfigError;
use crate::leaf::{Leaf, Value};
use crate::schema::{FieldKind, Schema, dotted};

/// One parsed entry of a rule spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec<'a> {
    pub name: &'a str,
    pub param: Option<&'a str>,
}

impl fmt::Display for RuleSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param {
            Some(param) => write!(f, "{}={}", self.name, param),
            None => f.write_str(self.name),
        }
    }
}

/// Split a comma-separated rule spec. Blank entries are ignored.
pub fn parse_rules(spec: &str) -> Result<Vec<RuleSpec<'_>>, String> {
    let mut rules = Vec::new();
    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (name, param) = match entry.split_once('=') {
            Some((name, param)) => (name.trim(), Some(param.trim())),
            None => (entry, None),
        };
        if name.is_empty() {
            return Err(format!("rule '{entry}' has no name"));
        }
        rules.push(RuleSpec { name, param });
    }
    Ok(rules)
}

/// A rule was declared with parameters it cannot use, or on a field it
/// cannot apply to. Always structural.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct RuleError {
    pub reason: String,
}

impl RuleError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outcome of a validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    /// `Pass` when `ok`, otherwise `Fail` with the message.
    pub fn check(ok: bool, message: impl FnOnce() -> String) -> Self {
        if ok { Verdict::Pass } else { Verdict::Fail(message()) }
    }
}

/// Mutates a leaf in place.
pub trait ConformRule: Send + Sync {
    fn apply(&self, leaf: &mut dyn Leaf, param: Option<&str>) -> Result<(), RuleError>;
}

impl<F> ConformRule for F
where
    F: Fn(&mut dyn Leaf, Option<&str>) -> Result<(), RuleError> + Send + Sync,
{
    fn apply(&self, leaf: &mut dyn Leaf, param: Option<&str>) -> Result<(), RuleError> {
        self(leaf, param)
    }
}

/// Judges a leaf's current value.
pub trait ValidationRule: Send + Sync {
    fn check(&self, value: &Value<'_>, param: Option<&str>) -> Result<Verdict, RuleError>;
}

impl<F> ValidationRule for F
where
    F: Fn(&Value<'_>, Option<&str>) -> Result<Verdict, RuleError> + Send + Sync,
{
    fn check(&self, value: &Value<'_>, param: Option<&str>) -> Result<Verdict, RuleError> {
        self(value, param)
    }
}

/// Validation rule that stops evaluation of the remaining rules on a field
/// whose value is zero.
pub const OMITEMPTY: &str = "omitempty";

/// Named conformance and validation rules.
#[derive(Clone)]
pub struct Rules {
    conform: HashMap<String, Arc<dyn ConformRule>>,
    validate: HashMap<String, Arc<dyn ValidationRule>>,
}

impl Default for Rules {
    fn default() -> Self {
        let mut rules = Self::empty();
        modifiers::register(&mut rules);
        constraints::register(&mut rules);
        rules
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut conform: Vec<_> = self.conform.keys().collect();
        let mut validate: Vec<_> = self.validate.keys().collect();
        conform.sort();
        validate.sort();
        f.debug_struct("Rules")
            .field("conform", &conform)
            .field("validate", &validate)
            .finish()
    }
}

impl Rules {
    /// A registry with no rules at all.
    pub fn empty() -> Self {
        Self {
            conform: HashMap::new(),
            validate: HashMap::new(),
        }
    }

    /// Register (or replace) a conformance rule.
    pub fn add_conform(&mut self, name: impl Into<String>, rule: impl ConformRule + 'static) {
        self.conform.insert(name.into(), Arc::new(rule));
    }

    /// Register (or replace) a validation rule.
    pub fn add_validation(&mut self, name: impl Into<String>, rule: impl ValidationRule + 'static) {
        self.validate.insert(name.into(), Arc::new(rule));
    }

    pub fn conform_rule(&self, name: &str) -> Option<&dyn ConformRule> {
        self.conform.get(name).map(|r| r.as_ref())
    }

    pub fn validation_rule(&self, name: &str) -> Option<&dyn ValidationRule> {
        self.validate.get(name).map(|r| r.as_ref())
    }

    fn knows_validation(&self, name: &str) -> bool {
        name == OMITEMPTY || self.validate.contains_key(name)
    }

    /// Check that every rule declared anywhere in `schema` parses and is
    /// registered, before any field is touched.
    pub fn preflight(&self, schema: &'static Schema) -> Result<(), EnvfigError> {
        self.preflight_at(schema, "")
    }

    fn preflight_at(&self, schema: &'static Schema, prefix: &str) -> Result<(), EnvfigError> {
        for field in schema.fields {
            let path = dotted(prefix, field.name);
            match field.kind {
                FieldKind::Nested(child) => self.preflight_at(child(), &path)?,
                FieldKind::Leaf => {
                    for rule in parse_field_rules(&path, field.conform)? {
                        if self.conform_rule(rule.name).is_none() {
                            return Err(unknown_rule(&path, rule.name));
                        }
                    }
                    for rule in parse_field_rules(&path, field.validate)? {
                        if !self.knows_validation(rule.name) {
                            return Err(unknown_rule(&path, rule.name));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn parse_field_rules<'a>(
    field: &str,
    spec: &'a str,
) -> Result<Vec<RuleSpec<'a>>, EnvfigError> {
    parse_rules(spec).map_err(|reason| EnvfigError::InvalidRule {
        field: field.to_string(),
        rule: spec.to_string(),
        reason,
    })
}

pub(crate) fn unknown_rule(field: &str, rule: &str) -> EnvfigError {
    EnvfigError::UnknownRule {
        field: field.to_string(),
        rule: rule.to_string(),
    }
}

pub(crate) fn invalid_rule(field: &str, rule: &RuleSpec<'_>, err: RuleError) -> EnvfigError {
    EnvfigError::InvalidRule {
        field: field.to_string(),
        rule: rule.to_string(),
        reason: err.reason,
    }
}

/// The parameter, or an error naming the rule that needs one.
pub(crate) fn require_param<'p>(rule: &str, param: Option<&'p str>) -> Result<&'p str, RuleError> {
    match param {
        Some(p) if !p.is_empty() => Ok(p),
        _ => Err(RuleError::new(format!("'{rule}' needs a parameter, e.g. {rule}=...",))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::fixtures::test::{Configuration, Misdeclared};

    #[test]
    fn parse_names_and_params() {
        let rules = parse_rules("required, min=1 ,oneof=a b c").unwrap();
        assert_eq!(
            rules,
            vec![
                RuleSpec { name: "required", param: None },
                RuleSpec { name: "min", param: Some("1") },
                RuleSpec { name: "oneof", param: Some("a b c") },
            ]
        );
    }

    #[test]
    fn parse_skips_blank_entries() {
        assert!(parse_rules("").unwrap().is_empty());
        assert_eq!(parse_rules("trim,,").unwrap().len(), 1);
    }

    #[test]
    fn parse_rejects_nameless_entry() {
        let err = parse_rules("=3").unwrap_err();
        assert!(err.contains("no name"));
    }

    #[test]
    fn rule_spec_display_roundtrips_text() {
        let rules = parse_rules("default=8080").unwrap();
        assert_eq!(rules[0].to_string(), "default=8080");
    }

    #[test]
    fn defaults_include_builtins() {
        let rules = Rules::default();
        assert!(rules.conform_rule("trim").is_some());
        assert!(rules.conform_rule("default").is_some());
        assert!(rules.validation_rule("required").is_some());
        assert!(rules.validation_rule("oneof").is_some());
        assert!(rules.validation_rule("nope").is_none());
    }

    #[test]
    fn custom_validation_rule_registers() {
        let mut rules = Rules::empty();
        let even = |value: &Value<'_>, _: Option<&str>| -> Result<Verdict, RuleError> {
            Ok(Verdict::check(
                matches!(value, Value::Int(i) if i % 2 == 0),
                || "must be even".into(),
            ))
        };
        rules.add_validation("even", even);
        let rule = rules.validation_rule("even").unwrap();
        assert_eq!(rule.check(&Value::Int(4), None).unwrap(), Verdict::Pass);
        assert!(matches!(rule.check(&Value::Int(3), None).unwrap(), Verdict::Fail(_)));
    }

    #[test]
    fn preflight_accepts_known_rules() {
        Rules::default().preflight(Configuration::schema()).unwrap();
    }

    #[test]
    fn preflight_reports_unknown_rule_with_field_path() {
        let err = Rules::default().preflight(Misdeclared::schema()).unwrap_err();
        match err {
            EnvfigError::UnknownRule { field, rule } => {
                assert_eq!(field, "name");
                assert_eq!(rule, "sparkle");
            }
            other => panic!("Expected UnknownRule, got: {other:?}"),
        }
    }

    #[test]
    fn preflight_accepts_omitempty() {
        let rules = Rules::empty();
        assert!(rules.knows_validation(OMITEMPTY));
    }

    #[test]
    fn require_param_reports_rule() {
        let err = require_param("min", None).unwrap_err();
        assert!(err.reason.contains("min"));
        assert_eq!(require_param("min", Some("3")).unwrap(), "3");
    }
}
