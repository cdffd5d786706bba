//! Derive macro for `envfig::Config`.
//!
//! Expands a plain struct into a static field-descriptor table plus the
//! index-based accessors the binding pipeline walks. Attribute grammar:
//!
//! ```ignore
//! #[derive(Config, Default)]
//! struct Server {
//!     #[config(env = "host", mapstructure = "host_dir", conform = "trim", validate = "required")]
//!     host: String,
//!     #[config(env = "tls", nested)]
//!     tls: Tls,
//!     // no attribute: not part of the schema, keeps its default value
//!     cache: Vec<u8>,
//! }
//! ```
//!
//! Every `name = "value"` pair other than `conform` and `validate` names a
//! binding key under the tag `name`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Fields, Ident, LitStr, Type, parse_macro_input, spanned::Spanned,
};

#[proc_macro_derive(Config, attributes(config))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

struct FieldSpec {
    ident: Ident,
    ty: Type,
    keys: Vec<(String, String)>,
    conform: String,
    validate: String,
    nested: bool,
}

fn expand(input: DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "#[derive(Config)] does not support generic structs",
        ));
    }

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named,
            other => {
                return Err(Error::new(
                    other.span(),
                    "#[derive(Config)] requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new(
                input.ident.span(),
                "#[derive(Config)] can only be used on structs",
            ));
        }
    };

    let mut specs = Vec::new();
    for field in &named.named {
        if let Some(spec) = parse_field(field)? {
            specs.push(spec);
        }
    }

    let name = &input.ident;
    let name_str = name.to_string();

    let metas = specs.iter().map(|spec| {
        let field_name = spec.ident.to_string();
        let tags = spec.keys.iter().map(|(t, _)| t);
        let keys = spec.keys.iter().map(|(_, k)| k);
        let conform = &spec.conform;
        let validate = &spec.validate;
        let ty = &spec.ty;
        let kind = if spec.nested {
            quote! { ::envfig::FieldKind::Nested(<#ty as ::envfig::Config>::schema) }
        } else {
            quote! { ::envfig::FieldKind::Leaf }
        };
        quote! {
            ::envfig::FieldMeta {
                name: #field_name,
                keys: &[#((#tags, #keys)),*],
                conform: #conform,
                validate: #validate,
                kind: #kind,
            }
        }
    });

    let slot_arms = specs.iter().enumerate().map(|(index, spec)| {
        let ident = &spec.ident;
        let variant = if spec.nested {
            quote! { Nested }
        } else {
            quote! { Leaf }
        };
        quote! {
            #index => ::core::option::Option::Some(::envfig::Slot::#variant(&self.#ident))
        }
    });

    let slot_mut_arms = specs.iter().enumerate().map(|(index, spec)| {
        let ident = &spec.ident;
        let variant = if spec.nested {
            quote! { Nested }
        } else {
            quote! { Leaf }
        };
        quote! {
            #index => ::core::option::Option::Some(::envfig::SlotMut::#variant(&mut self.#ident))
        }
    });

    Ok(quote! {
        #[automatically_derived]
        impl ::envfig::Config for #name {
            fn schema() -> &'static ::envfig::Schema {
                static SCHEMA: ::envfig::Schema = ::envfig::Schema {
                    name: #name_str,
                    fields: &[#(#metas),*],
                };
                &SCHEMA
            }

            fn slot(&self, index: usize) -> ::core::option::Option<::envfig::Slot<'_>> {
                match index {
                    #(#slot_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn slot_mut(&mut self, index: usize) -> ::core::option::Option<::envfig::SlotMut<'_>> {
                match index {
                    #(#slot_mut_arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

/// Returns `None` for fields that carry no `#[config]` attribute at all.
fn parse_field(field: &syn::Field) -> Result<Option<FieldSpec>, Error> {
    let attrs: Vec<_> = field
        .attrs
        .iter()
        .filter(|a| a.path().is_ident("config"))
        .collect();
    if attrs.is_empty() {
        return Ok(None);
    }

    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new(field.span(), "expected a named field"))?;

    let mut spec = FieldSpec {
        ident,
        ty: field.ty.clone(),
        keys: Vec::new(),
        conform: String::new(),
        validate: String::new(),
        nested: false,
    };

    for attr in attrs {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("nested") {
                spec.nested = true;
                return Ok(());
            }
            if meta.path.is_ident("conform") {
                let lit: LitStr = meta.value()?.parse()?;
                append_rules(&mut spec.conform, &lit.value());
                return Ok(());
            }
            if meta.path.is_ident("validate") {
                let lit: LitStr = meta.value()?.parse()?;
                append_rules(&mut spec.validate, &lit.value());
                return Ok(());
            }

            let tag = meta
                .path
                .get_ident()
                .ok_or_else(|| meta.error("expected a tag name such as `env`"))?
                .to_string();
            let lit: LitStr = meta.value()?.parse()?;
            let key = lit.value();
            if key.trim().is_empty() {
                return Err(Error::new(lit.span(), "binding key must not be empty"));
            }
            if key.contains('.') {
                return Err(Error::new(
                    lit.span(),
                    "binding key is a single segment; nesting comes from #[config(nested)]",
                ));
            }
            if spec.keys.iter().any(|(t, _)| *t == tag) {
                return Err(meta.error(format!("duplicate `{tag}` key on this field")));
            }
            spec.keys.push((tag, key));
            Ok(())
        })?;
    }

    if spec.nested && !(spec.conform.is_empty() && spec.validate.is_empty()) {
        return Err(Error::new(
            spec.ident.span(),
            "conformance and validation rules apply to leaf fields, not nested records",
        ));
    }

    Ok(Some(spec))
}

fn append_rules(target: &mut String, rules: &str) {
    if rules.trim().is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(',');
    }
    target.push_str(rules);
}
