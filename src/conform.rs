//! Conformance: normalise bound fields in place before validation.
//!
//! Each leaf's `conform` rules run in declaration order, so
//! `conform = "trim,default=info"` trims first and then fills the default
//! when nothing is left. Nested records are walked depth-first.

use crate::error::EnvfigError;
use crate::rules::{Rules, invalid_rule, parse_field_rules, unknown_rule};
use crate::schema::{Config, FieldKind, Schema, SlotMut, dotted};

/// Apply every declared conformance rule of `record`.
pub fn conform<C: Config>(record: &mut C, rules: &Rules) -> Result<(), EnvfigError> {
    conform_schema(record, C::schema(), rules, "")
}

pub(crate) fn conform_schema(
    record: &mut dyn Config,
    schema: &'static Schema,
    rules: &Rules,
    prefix: &str,
) -> Result<(), EnvfigError> {
    for (index, meta) in schema.fields.iter().enumerate() {
        let field = dotted(prefix, meta.name);
        match (meta.kind, record.slot_mut(index)) {
            (FieldKind::Nested(child), Some(SlotMut::Nested(nested))) => {
                conform_schema(nested, child(), rules, &field)?;
            }
            (FieldKind::Leaf, Some(SlotMut::Leaf(leaf))) => {
                for rule in parse_field_rules(&field, meta.conform)? {
                    let apply = rules
                        .conform_rule(rule.name)
                        .ok_or_else(|| unknown_rule(&field, rule.name))?;
                    apply
                        .apply(leaf, rule.param)
                        .map_err(|e| invalid_rule(&field, &rule, e))?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}
