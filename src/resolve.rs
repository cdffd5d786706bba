//! Core binding pipeline: fill a typed record from a lookup, normalise it and
//! check it.
//!
//! Operates on a pre-built [`Lookup`] with no file I/O, so the whole pipeline
//! is testable with an in-memory environment. Steps:
//!
//! 1. Check that every declared rule name is registered (nothing mutated yet)
//! 2. Compose the bindings for the active tag
//! 3. Bind: look up each binding's environment name and coerce the raw text
//! 4. Run conformance rules
//! 5. Run validation and report every violation at once

use crate::compose::compose_schema;
use crate::conform::conform_schema;
use crate::error::EnvfigError;
use crate::leaf::LeafKind;
use crate::overrides::Lookup;
use crate::rules::Rules;
use crate::schema::{Config, leaf_mut};
use crate::validate::validate_schema;

/// Everything a resolve call needs besides the target record.
pub struct ResolveInput<'a> {
    /// Where raw values come from.
    pub lookup: Lookup<'a>,
    /// Tag convention selecting each field's key.
    pub tag: &'a str,
    pub rules: &'a Rules,
}

/// Bind, conform and validate `target` in place.
///
/// Fields whose environment name is unset keep their current value. A value
/// that cannot be coerced aborts with [`EnvfigError::InvalidValue`]; after a
/// structural error the record may be partially bound.
pub fn resolve<C: Config>(target: &mut C, input: &ResolveInput<'_>) -> Result<(), EnvfigError> {
    let schema = C::schema();
    input.rules.preflight(schema)?;
    let bindings = compose_schema(schema, input.tag)?;

    let mut bound = 0usize;
    for binding in &bindings {
        let key = binding.env_key();
        let Some((raw, source)) = input.lookup.get(&key) else {
            tracing::debug!(event = "envfig.bind.missing", key = %key);
            continue;
        };
        let Some(leaf) = leaf_mut(&mut *target, &binding.indices) else {
            continue;
        };
        if raw.is_empty() && leaf.kind() != LeafKind::Text {
            tracing::debug!(event = "envfig.bind.empty", key = %key);
            continue;
        }
        leaf.assign(&raw).map_err(|e| EnvfigError::InvalidValue {
            field: binding.field.clone(),
            key: key.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(event = "envfig.bind.resolved", key = %key, source = %source);
        bound += 1;
    }
    tracing::info!(
        event = "envfig.bind.completed",
        record = schema.name,
        tag = input.tag,
        fields = bindings.len(),
        bound,
    );

    conform_schema(&mut *target, schema, input.rules, "")?;
    validate_schema(&*target, schema, input.rules, input.tag)
}
