//! Record description: the static field-descriptor table every bindable
//! struct exposes, and the index-based handles used to reach its fields.
//!
//! `#[derive(Config)]` generates all of this. A hand-written implementation
//! only has to keep `schema().fields[i]` and `slot(i)` pointing at the same
//! field.

use crate::leaf::Leaf;

/// Tag name used when the caller does not pick one.
pub const DEFAULT_TAG: &str = "env";

/// Static description of one record type.
#[derive(Debug)]
pub struct Schema {
    /// The Rust type name, used in diagnostics.
    pub name: &'static str,
    /// Described fields in declaration order.
    pub fields: &'static [FieldMeta],
}

/// Per-field annotations.
#[derive(Debug)]
pub struct FieldMeta {
    /// The Rust field name.
    pub name: &'static str,
    /// Binding keys as `(tag, key segment)` pairs.
    pub keys: &'static [(&'static str, &'static str)],
    /// Comma-separated conformance rules, applied in order.
    pub conform: &'static str,
    /// Comma-separated validation rules.
    pub validate: &'static str,
    pub kind: FieldKind,
}

impl FieldMeta {
    /// The binding key segment for the given tag convention, if any.
    pub fn key(&self, tag: &str) -> Option<&'static str> {
        self.keys.iter().find(|(t, _)| *t == tag).map(|(_, k)| *k)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A scalar or flat collection implementing [`Leaf`].
    Leaf,
    /// A sub-record; the function returns its schema.
    Nested(fn() -> &'static Schema),
}

/// Shared view of a field.
pub enum Slot<'a> {
    Leaf(&'a dyn Leaf),
    Nested(&'a dyn Config),
}

/// Exclusive view of a field.
pub enum SlotMut<'a> {
    Leaf(&'a mut dyn Leaf),
    Nested(&'a mut dyn Config),
}

/// A record that can be bound from the environment.
///
/// Usually derived:
///
/// ```ignore
/// #[derive(envfig::Config, Default)]
/// struct App {
///     #[config(env = "port", validate = "required,min=1")]
///     port: u16,
/// }
/// ```
pub trait Config {
    fn schema() -> &'static Schema
    where
        Self: Sized;

    /// The field at `index` in [`Schema::fields`].
    fn slot(&self, index: usize) -> Option<Slot<'_>>;

    fn slot_mut(&mut self, index: usize) -> Option<SlotMut<'_>>;
}

/// Follow a path of field indices down to a leaf.
pub(crate) fn leaf_mut<'a>(
    record: &'a mut dyn Config,
    indices: &[usize],
) -> Option<&'a mut dyn Leaf> {
    let (first, rest) = indices.split_first()?;
    match record.slot_mut(*first)? {
        SlotMut::Leaf(leaf) if rest.is_empty() => Some(leaf),
        SlotMut::Nested(nested) if !rest.is_empty() => leaf_mut(nested, rest),
        _ => None,
    }
}

pub(crate) fn dotted(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}
