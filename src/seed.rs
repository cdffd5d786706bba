//! Environment seeding: load env files into a provider before binding.
//!
//! Intended for development setups that keep `.env` files next to the code.
//! Files are processed in the order given. Each one is fully parsed before any
//! of its entries are written, so a malformed file contributes nothing; files
//! before it stay applied.
//!
//! `${VAR}` references in dotenv files are expanded while the file is parsed,
//! from the live process environment and earlier lines of the same file. The
//! provider being seeded is not consulted: with a [`MapEnv`](crate::MapEnv),
//! names set by an earlier file or by the map itself expand to the empty
//! string, and process variables can still be substituted in.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::env::EnvProvider;
use crate::error::EnvfigError;
use crate::file::{read_entries, resolve_root};
use crate::merge::{dedupe, inject};
use crate::types::{SeedMode, SeedRoot};

/// What a seeding run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Files loaded, in order.
    pub files: Vec<PathBuf>,
    /// Names written into the provider.
    pub applied: Vec<String>,
    /// Names left alone because the provider already held them.
    pub skipped: Vec<String>,
}

/// Seeds a provider from a list of env files.
#[derive(Debug, Clone, Default)]
pub struct Seeder {
    root: SeedRoot,
    files: Vec<PathBuf>,
    mode: SeedMode,
}

impl Seeder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, root: SeedRoot) -> Self {
        self.root = root;
        self
    }

    /// Resolve file names against the nearest ancestor directory named
    /// `anchor`. An empty anchor means the working directory.
    pub fn anchor(self, anchor: &str) -> Self {
        if anchor.is_empty() {
            self.root(SeedRoot::Cwd)
        } else {
            self.root(SeedRoot::Anchor(anchor.to_string()))
        }
    }

    pub fn file(mut self, name: impl Into<PathBuf>) -> Self {
        self.files.push(name.into());
        self
    }

    pub fn files<I, P>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn mode(mut self, mode: SeedMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Seed `provider`, resolving the root against the process working
    /// directory.
    pub fn seed(&self, provider: &mut dyn EnvProvider) -> Result<SeedReport, EnvfigError> {
        self.seed_in(None, provider)
    }

    /// Like [`seed`](Self::seed) with an explicit working directory.
    pub fn seed_from(
        &self,
        cwd: &Path,
        provider: &mut dyn EnvProvider,
    ) -> Result<SeedReport, EnvfigError> {
        self.seed_in(Some(cwd), provider)
    }

    fn seed_in(
        &self,
        cwd: Option<&Path>,
        provider: &mut dyn EnvProvider,
    ) -> Result<SeedReport, EnvfigError> {
        let mut report = SeedReport::default();
        if self.files.is_empty() {
            return Ok(report);
        }

        let root = resolve_root(&self.root, cwd)?;
        for name in &self.files {
            let path = root.join(name);
            let entries = dedupe(read_entries(&path)?);
            let injected = inject(provider, entries, self.mode);
            tracing::info!(
                event = "envfig.seed.file_loaded",
                path = %path.display(),
                applied = injected.applied.len(),
                skipped = injected.skipped.len(),
            );
            for name in &injected.skipped {
                tracing::debug!(event = "envfig.seed.key_skipped", key = %name);
            }
            report.files.push(path);
            report.applied.extend(injected.applied);
            report.skipped.extend(injected.skipped);
        }
        Ok(report)
    }
}
