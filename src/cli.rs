//! Clap adapter for envfig.
//!
//! Compiled only with the `clap` Cargo feature (on by default). [`EnvArgs`]
//! is a clap derive struct you flatten into your own `#[derive(Parser)]`
//! struct; [`EnvArgs::apply`] hands the parsed flags to an
//! [`EnvfigBuilder`](crate::EnvfigBuilder). Without clap, call the builder
//! methods directly.

use std::path::PathBuf;

use clap::Args;

use crate::builder::EnvfigBuilder;
use crate::overrides::parse_assignment;
use crate::types::SeedMode;

/// Common flags for apps that read their configuration from the environment.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     env: EnvArgs,
/// }
/// ```
#[derive(Debug, Clone, Default, Args)]
pub struct EnvArgs {
    /// Env file to load before binding. Repeatable; earlier files win unless
    /// --override-env is given.
    #[arg(long = "env-file", value_name = "FILE")]
    pub env_files: Vec<PathBuf>,

    /// Resolve env files against the nearest ancestor directory with this name.
    #[arg(long, value_name = "DIR_NAME")]
    pub anchor: Option<String>,

    /// Key convention fields bind by (default: env).
    #[arg(long)]
    pub tag: Option<String>,

    /// Let env files overwrite variables that are already set.
    #[arg(long)]
    pub override_env: bool,

    /// Set a value directly, e.g. --set app.port=9090. Beats the environment.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub overrides: Vec<(String, String)>,
}

impl EnvArgs {
    /// Apply the parsed flags to a builder. Flags not given leave the
    /// builder's settings alone.
    pub fn apply<'a>(self, mut builder: EnvfigBuilder<'a>) -> EnvfigBuilder<'a> {
        if let Some(anchor) = &self.anchor {
            builder = builder.anchor(anchor);
        }
        if let Some(tag) = &self.tag {
            builder = builder.tag(tag);
        }
        if self.override_env {
            builder = builder.seed_mode(SeedMode::Override);
        }
        builder = builder.env_files(self.env_files);
        for (key, value) in self.overrides {
            builder = builder.set(&key, value);
        }
        builder
    }
}
