//! Declarative environment binding for Rust config structs. Annotate a
//! struct, seed the environment from `.env` files if you want, and bind.
//!
//! ```ignore
//! #[derive(envfig::Config, Default)]
//! struct AppConfig {
//!     #[config(env = "host_dir", validate = "required")]
//!     host: String,
//!     #[config(env = "app", nested)]
//!     app: App,
//! }
//!
//! #[derive(envfig::Config, Default)]
//! struct App {
//!     #[config(env = "port", conform = "default=8080", validate = "min=1024")]
//!     port: u16,
//!     #[config(env = "interval_time_out")]
//!     interval_time_out: std::time::Duration,
//! }
//!
//! let config: AppConfig = Envfig::builder().load()?;
//! ```
//!
//! That call reads `HOST_DIR`, `APP_PORT` and `APP_INTERVAL_TIME_OUT` from the
//! process environment, coerces them into the field types, applies the
//! conformance rules, and validates the result. Every violated constraint is
//! reported at once.
//!
//! # Keys
//!
//! Each annotated field carries a key segment per *tag*: `env = "port"`,
//! `mapstructure = "port"`. The active tag (default `env`, see
//! [`tag()`](EnvfigBuilder::tag)) picks one. A nested record contributes its
//! own segment as a prefix, so `app` + `port` becomes the dotted path
//! `app.port` and the environment name `APP_PORT`: dots turn into
//! underscores, everything is upper-cased.
//!
//! A field with no key for the active tag is not bound. For a nested record
//! that skips its whole subtree. Fields without any `#[config]` attribute are
//! invisible to envfig and keep whatever value the record started with.
//!
//! Two fields whose paths normalise to the same environment name
//! (`app.port` and `app_port`) are rejected with
//! [`EnvfigError::DuplicateKey`].
//!
//! # Pipeline
//!
//! ```text
//! Seed        env files → provider (optional)
//!    ↓
//! Compose     schema + tag → bindings (dotted path, env name, field)
//!    ↓
//! Bind        provider / overrides → typed fields
//!    ↓
//! Conform     conform = "trim,lcase,default=..."
//!    ↓
//! Validate    validate = "required,min=1,oneof=a b"
//! ```
//!
//! Unset variables leave fields untouched. An empty value for a non-text
//! field counts as unset. A value that cannot be coerced (`TEST_VAL=some` for
//! an integer) stops the pipeline with [`EnvfigError::InvalidValue`] naming
//! the field and the variable.
//!
//! # Seeding
//!
//! Development setups often keep variables in `.env` files. The builder's
//! [`env_file()`](EnvfigBuilder::env_file) loads them into the provider
//! before binding. File names are resolved against a [`SeedRoot`]: the working
//! directory by default, or the nearest ancestor directory with a given name
//! ([`anchor()`](EnvfigBuilder::anchor)), which lets tests deep inside a
//! project find files kept at its root.
//!
//! By default ([`SeedMode::Preserve`]) a variable that is already set is
//! never overwritten, so the real environment beats files and the first file
//! beats later ones. Files ending in `.toml` are flattened into variables too.
//!
//! # Providers
//!
//! Values come from an [`EnvProvider`]. [`ProcessEnv`] is the live process
//! environment; [`MapEnv`] is an in-memory map for tests and embedders that
//! must not touch process-wide state. Explicit values passed with
//! [`set()`](EnvfigBuilder::set) beat the provider.
//!
//! # Rules
//!
//! Conformance rules normalise values in place; validation rules judge them.
//! Both are looked up by name in a [`Rules`] registry that starts with the
//! built-in set and takes custom rules through
//! [`conform_rule()`](EnvfigBuilder::conform_rule) and
//! [`validation_rule()`](EnvfigBuilder::validation_rule). Every rule name on
//! the record is checked before any field is touched.
//!
//! # Errors
//!
//! All fallible operations return [`EnvfigError`]. Structural problems (a
//! missing file, a bad value, an unknown rule) abort immediately; validation
//! failures are collected into [`ValidationErrors`], one [`Violation`] per
//! failing rule. With the `rich-errors` feature every error is also a
//! `miette::Diagnostic`.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides
//! [`EnvArgs`]: `--env-file`, `--anchor`, `--tag`, `--override-env` and
//! `--set KEY=VALUE`, ready to flatten into your own parser.

extern crate self as envfig;

pub mod app_error;
pub mod error;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod compose;
mod conform;
mod duration;
mod env;
mod file;
mod flatten;
mod leaf;
pub(crate) mod merge;
mod overrides;
mod resolve;
mod rules;
mod schema;
mod seed;
mod validate;

#[cfg(test)]
mod fixtures;

pub use builder::{Envfig, EnvfigBuilder};
#[cfg(feature = "clap")]
pub use cli::EnvArgs;
pub use compose::{Binding, compose};
pub use conform::conform;
pub use duration::parse_duration;
pub use env::{EnvProvider, MapEnv, ProcessEnv, env_key};
pub use envfig_derive::Config;
pub use error::EnvfigError;
pub use file::find_anchor;
pub use leaf::{CoerceError, FromEnv, Leaf, LeafKind, Value};
pub use overrides::{Lookup, Source};
pub use resolve::{ResolveInput, resolve};
pub use rules::{
    ConformRule, OMITEMPTY, RuleError, RuleSpec, Rules, ValidationRule, Verdict, parse_rules,
};
pub use schema::{Config, DEFAULT_TAG, FieldKind, FieldMeta, Schema, Slot, SlotMut};
pub use seed::{SeedReport, Seeder};
pub use types::{SeedMode, SeedRoot};
pub use validate::{ValidationErrors, Violation, validate};

/// Bind `target` from the process environment.
///
/// `tag` selects the key convention; `None` means [`DEFAULT_TAG`].
pub fn bind<C: Config>(target: &mut C, tag: Option<&str>) -> Result<(), EnvfigError> {
    Envfig::builder()
        .tag(tag.unwrap_or(DEFAULT_TAG))
        .bind(target)
}

/// Load env files into the process environment.
///
/// File names are resolved against the nearest ancestor directory named
/// `anchor`, or the working directory for `None`. Variables that are already
/// set are left alone.
pub fn seed_from_files<I, P>(anchor: Option<&str>, files: I) -> Result<SeedReport, EnvfigError>
where
    I: IntoIterator<Item = P>,
    P: Into<std::path::PathBuf>,
{
    Seeder::new()
        .anchor(anchor.unwrap_or(""))
        .files(files)
        .seed(&mut ProcessEnv)
}
