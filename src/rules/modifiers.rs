//! Built-in conformance rules.

use crate::leaf::{Leaf, LeafKind};

use super::{RuleError, Rules, require_param};

pub(super) fn register(rules: &mut Rules) {
    rules.add_conform("trim", text_rule("trim", |s| s.trim().to_string()));
    rules.add_conform("ltrim", text_rule("ltrim", |s| s.trim_start().to_string()));
    rules.add_conform("rtrim", text_rule("rtrim", |s| s.trim_end().to_string()));
    rules.add_conform("lcase", text_rule("lcase", str::to_lowercase));
    rules.add_conform("ucase", text_rule("ucase", str::to_uppercase));
    rules.add_conform("title", text_rule("title", title_case));
    rules.add_conform("default", default_value);
}

/// Wrap a string transformation. Non-text leaves are rejected; an unset
/// optional string is left alone.
fn text_rule(
    name: &'static str,
    transform: fn(&str) -> String,
) -> impl Fn(&mut dyn Leaf, Option<&str>) -> Result<(), RuleError> + Send + Sync {
    move |leaf: &mut dyn Leaf, _param: Option<&str>| {
        if leaf.kind() != LeafKind::Text {
            return Err(RuleError::new(format!(
                "'{name}' applies to text, not {}",
                leaf.kind()
            )));
        }
        if let Some(text) = leaf.text_mut() {
            *text = transform(text);
        }
        Ok(())
    }
}

/// `default=<v>`: assign `v` when the field still holds its zero value.
fn default_value(leaf: &mut dyn Leaf, param: Option<&str>) -> Result<(), RuleError> {
    let param = require_param("default", param)?;
    if leaf.value().is_zero() {
        leaf.assign(param)
            .map_err(|e| RuleError::new(format!("default '{param}' does not fit: {e}")))?;
    }
    Ok(())
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
