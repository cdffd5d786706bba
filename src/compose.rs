//! Key composition: walk a record's schema and produce one binding per leaf
//! field that carries a key for the active tag.
//!
//! Nested records extend the dotted path with their own key segment. A
//! field without a key for the tag is skipped together with its whole
//! subtree. That is how a field opts out of binding.

use std::collections::HashMap;

use crate::env::env_key;
use crate::error::EnvfigError;
use crate::schema::{Config, FieldKind, Schema, dotted};

/// One leaf field and where its value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Dotted key path, e.g. `app.port`.
    pub path: String,
    /// Dotted Rust field path, e.g. `app.port` (differs when keys are renamed).
    pub field: String,
    /// Field indices from the root record down to the leaf.
    pub indices: Vec<usize>,
}

impl Binding {
    /// The environment variable this binding reads, e.g. `APP_PORT`.
    pub fn env_key(&self) -> String {
        env_key(&self.path)
    }
}

/// Compose the bindings of `C` under `tag`, in field declaration order.
pub fn compose<C: Config>(tag: &str) -> Result<Vec<Binding>, EnvfigError> {
    compose_schema(C::schema(), tag)
}

/// Like [`compose`] but from a schema value.
///
/// Two leaves whose paths normalise to the same environment name are
/// rejected with [`EnvfigError::DuplicateKey`].
pub fn compose_schema(schema: &'static Schema, tag: &str) -> Result<Vec<Binding>, EnvfigError> {
    let mut out = Vec::new();
    walk(schema, tag, "", "", &mut Vec::new(), &mut out);

    let mut seen: HashMap<String, &str> = HashMap::new();
    for binding in &out {
        if let Some(first) = seen.insert(binding.env_key(), &binding.field) {
            return Err(EnvfigError::DuplicateKey {
                key: binding.env_key(),
                first: first.to_string(),
                second: binding.field.clone(),
            });
        }
    }
    Ok(out)
}

fn walk(
    schema: &'static Schema,
    tag: &str,
    path: &str,
    field_path: &str,
    indices: &mut Vec<usize>,
    out: &mut Vec<Binding>,
) {
    for (index, field) in schema.fields.iter().enumerate() {
        let Some(key) = field.key(tag) else {
            continue;
        };
        let child_path = dotted(path, key);
        let child_field = dotted(field_path, field.name);
        indices.push(index);
        match field.kind {
            FieldKind::Nested(child) => {
                walk(child(), tag, &child_path, &child_field, indices, out);
            }
            FieldKind::Leaf => out.push(Binding {
                path: child_path,
                field: child_field,
                indices: indices.clone(),
            }),
        }
        indices.pop();
    }
}
