use std::path::PathBuf;

use crate::env::{EnvProvider, ProcessEnv};
use crate::error::EnvfigError;
use crate::overrides::Lookup;
use crate::resolve::{self, ResolveInput};
use crate::rules::{ConformRule, Rules, ValidationRule};
use crate::schema::{Config, DEFAULT_TAG};
use crate::seed::{SeedReport, Seeder};
use crate::types::{SeedMode, SeedRoot};

/// Entry point for building an envfig binding.
pub struct Envfig;

impl Envfig {
    pub fn builder<'a>() -> EnvfigBuilder<'a> {
        EnvfigBuilder::new()
    }
}

/// Builder for seeding an environment and binding records from it.
///
/// Controls four things:
///
/// - **Source**: [`provider()`](Self::provider) and [`set()`](Self::set). The
///   live process environment by default; explicit overrides beat it.
/// - **Seeding**: [`env_file()`](Self::env_file), [`seed_root()`](Self::seed_root),
///   [`seed_mode()`](Self::seed_mode). Files are loaded into the provider
///   before anything is bound.
/// - **Keys**: [`tag()`](Self::tag) picks which key convention fields bind by.
/// - **Rules**: [`conform_rule()`](Self::conform_rule) and
///   [`validation_rule()`](Self::validation_rule) extend the built-in set.
pub struct EnvfigBuilder<'a> {
    tag: String,
    provider: Box<dyn EnvProvider + 'a>,
    overrides: Vec<(String, String)>,
    seeder: Seeder,
    rules: Rules,
}

impl<'a> EnvfigBuilder<'a> {
    fn new() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            provider: Box::new(ProcessEnv),
            overrides: Vec::new(),
            seeder: Seeder::new(),
            rules: Rules::default(),
        }
    }

    /// Select the key convention (default: [`DEFAULT_TAG`]).
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    /// Replace the process environment as the value source and seed target.
    ///
    /// Pass `&mut provider` to keep access to it after the builder is consumed.
    pub fn provider(mut self, provider: impl EnvProvider + 'a) -> Self {
        self.provider = Box::new(provider);
        self
    }

    /// Add an explicit value. `key` may be dotted (`app.port`) or an env name
    /// (`APP_PORT`). Overrides beat the provider and are never written into it.
    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.overrides.push((key.to_string(), value.into()));
        self
    }

    /// Like [`set`](Self::set); `None` is ignored (useful for optional clap args).
    pub fn set_opt(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Add an env file to seed from, resolved against the seed root.
    pub fn env_file(mut self, name: impl Into<PathBuf>) -> Self {
        self.seeder = self.seeder.file(name);
        self
    }

    pub fn env_files<I, P>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.seeder = self.seeder.files(names);
        self
    }

    /// Set the directory env files are resolved against (default: [`SeedRoot::Cwd`]).
    pub fn seed_root(mut self, root: SeedRoot) -> Self {
        self.seeder = self.seeder.root(root);
        self
    }

    /// Shorthand for [`SeedRoot::Anchor`]; empty means the working directory.
    pub fn anchor(mut self, anchor: &str) -> Self {
        self.seeder = self.seeder.anchor(anchor);
        self
    }

    /// Set how seeding treats names already present (default: [`SeedMode::Preserve`]).
    pub fn seed_mode(mut self, mode: SeedMode) -> Self {
        self.seeder = self.seeder.mode(mode);
        self
    }

    /// Register a custom conformance rule, or replace a built-in one.
    pub fn conform_rule(mut self, name: &str, rule: impl ConformRule + 'static) -> Self {
        self.rules.add_conform(name, rule);
        self
    }

    /// Register a custom validation rule, or replace a built-in one.
    pub fn validation_rule(mut self, name: &str, rule: impl ValidationRule + 'static) -> Self {
        self.rules.add_validation(name, rule);
        self
    }

    /// Seed the provider from the configured env files.
    fn seed(&mut self) -> Result<SeedReport, EnvfigError> {
        if self.seeder.is_empty() {
            return Ok(SeedReport::default());
        }
        self.seeder.seed(&mut *self.provider)
    }

    /// Seed, then bind, conform and validate `target` in place.
    pub fn bind<C: Config>(mut self, target: &mut C) -> Result<(), EnvfigError> {
        let report = self.seed()?;
        if !report.files.is_empty() {
            tracing::info!(
                event = "envfig.seed.completed",
                files = report.files.len(),
                applied = report.applied.len(),
                skipped = report.skipped.len(),
            );
        }

        let lookup = Lookup::new(&*self.provider)
            .with_overrides(self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        let input = ResolveInput {
            lookup,
            tag: &self.tag,
            rules: &self.rules,
        };
        resolve::resolve(target, &input)
    }

    /// Like [`bind`](Self::bind), starting from `C::default()`.
    pub fn load<C: Config + Default>(self) -> Result<C, EnvfigError> {
        let mut target = C::default();
        self.bind(&mut target)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use crate::fixtures::test::{Configuration, Conformed, Trio};
    use crate::leaf::{Leaf, Value};
    use crate::rules::{RuleError, Verdict};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn testing_env() -> MapEnv {
        MapEnv::new()
            .with("HOST_DIR", "0.0.0.0")
            .with("APP_PORT", "8080")
            .with("APP_SERVICE_NAME", "service-name")
            .with("APP_INTERVAL_TIME_OUT", "30s")
            .with("APP_REQUIRED", "true")
    }

    #[test]
    fn defaults() {
        let builder = Envfig::builder();
        assert_eq!(builder.tag, "env");
        assert!(builder.overrides.is_empty());
        assert!(builder.seeder.is_empty());
    }

    #[test]
    fn set_opt_none_skipped() {
        let builder = Envfig::builder()
            .set_opt("port", Some("3000"))
            .set_opt("host", None::<&str>);
        assert_eq!(builder.overrides, vec![("port".to_string(), "3000".to_string())]);
    }

    #[test]
    fn load_from_provider() {
        let cfg: Configuration = Envfig::builder()
            .provider(testing_env())
            .tag("mapstructure")
            .load()
            .unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.app.interval_time_out, Duration::from_secs(30));
    }

    #[test]
    fn set_beats_provider() {
        let cfg: Configuration = Envfig::builder()
            .provider(testing_env())
            .tag("mapstructure")
            .set("host_dir", "127.0.0.1")
            .load()
            .unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
    }

    #[test]
    fn seeds_before_binding() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".testing.env"),
            "HOST_DIR=0.0.0.0\nAPP_PORT=8080\nAPP_REQUIRED=true\n",
        )
        .unwrap();

        let mut env = MapEnv::new();
        let cfg: Configuration = Envfig::builder()
            .provider(&mut env)
            .tag("mapstructure")
            .seed_root(SeedRoot::Path(dir.path().to_path_buf()))
            .env_file(".testing.env")
            .load()
            .unwrap();
        assert_eq!(cfg.app.port, 8080);
        assert_eq!(env.var("HOST_DIR").as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn seed_failure_aborts_before_binding() {
        let dir = TempDir::new().unwrap();
        let mut trio = Trio::default();
        let err = Envfig::builder()
            .provider(MapEnv::new().with("A", "x"))
            .seed_root(SeedRoot::Path(dir.path().to_path_buf()))
            .env_file(".not.env")
            .bind(&mut trio)
            .unwrap_err();
        assert!(matches!(err, EnvfigError::FileNotFound(_)));
        assert!(trio.a.is_empty());
    }

    #[test]
    fn custom_validation_rule() {
        let env = MapEnv::new().with("A", "x").with("B", "3").with("C", "true");
        let err = Envfig::builder()
            .provider(env)
            .validation_rule(
                "required",
                |value: &Value<'_>, _: Option<&str>| -> Result<Verdict, RuleError> {
                    Ok(Verdict::check(!matches!(value, Value::Int(3)), || {
                        "must not be three".into()
                    }))
                },
            )
            .load::<Trio>()
            .unwrap_err();
        let errors = err.violations().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.field("b").unwrap().message, "must not be three");
    }

    #[test]
    fn custom_conform_rule() {
        let env = MapEnv::new().with("NAME", "api").with("LEVEL", "info");
        let record: Conformed = Envfig::builder()
            .provider(env)
            .conform_rule(
                "lcase",
                |leaf: &mut dyn Leaf, _: Option<&str>| -> Result<(), RuleError> {
                    if let Some(text) = leaf.text_mut() {
                        text.push_str("-svc");
                    }
                    Ok(())
                },
            )
            .load()
            .unwrap();
        assert_eq!(record.name, "api-svc");
    }
}
