//! Flatten a TOML document into environment variable pairs.
//!
//! Nested tables become dotted paths, which are then normalised to env names:
//! `[app] port = 8080` → `("APP_PORT", "8080")`. Scalars are rendered as text
//! and arrays of scalars are comma-joined so the list leaves can split them
//! again. Arrays holding tables or other arrays have no env representation.

use toml::{Table, Value};

use crate::env::env_key;
use crate::schema::dotted;

/// A value with no env representation, by its dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedValue(pub String);

/// Flatten `table` into `(ENV_NAME, text)` pairs, tables walked in key order.
pub fn flatten(table: &Table) -> Result<Vec<(String, String)>, UnsupportedValue> {
    let mut out = Vec::new();
    walk(table, "", &mut out)?;
    Ok(out)
}

fn walk(
    table: &Table,
    prefix: &str,
    out: &mut Vec<(String, String)>,
) -> Result<(), UnsupportedValue> {
    for (key, value) in table {
        let path = dotted(prefix, key);
        match value {
            Value::Table(child) => walk(child, &path, out)?,
            Value::Array(items) => {
                let rendered = items
                    .iter()
                    .map(scalar)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| UnsupportedValue(path.clone()))?;
                out.push((env_key(&path), rendered.join(",")));
            }
            other => {
                let text = scalar(other).ok_or_else(|| UnsupportedValue(path.clone()))?;
                out.push((env_key(&path), text));
            }
        }
    }
    Ok(())
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}
