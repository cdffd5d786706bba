use std::collections::BTreeMap;

/// Normalise a dotted key path into an environment variable name:
/// `.` becomes `_` and the result is upper-cased.
///
/// `app.service_name` → `APP_SERVICE_NAME`.
pub fn env_key(dotted: &str) -> String {
    dotted.replace('.', "_").to_uppercase()
}

/// A key/value store the seeder writes into and the binder reads from.
///
/// The live process environment is one implementation ([`ProcessEnv`]);
/// [`MapEnv`] keeps everything in memory so tests and embedders never touch
/// process-wide state.
pub trait EnvProvider {
    fn var(&self, name: &str) -> Option<String>;

    fn set_var(&mut self, name: &str, value: &str);

    fn contains(&self, name: &str) -> bool {
        self.var(name).is_some()
    }
}

impl<P: EnvProvider + ?Sized> EnvProvider for &mut P {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }

    fn set_var(&mut self, name: &str, value: &str) {
        (**self).set_var(name, value)
    }
}

impl<P: EnvProvider + ?Sized> EnvProvider for Box<P> {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }

    fn set_var(&mut self, name: &str, value: &str) {
        (**self).set_var(name, value)
    }
}

/// The live process environment.
///
/// Values that are not valid unicode read as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set_var(&mut self, name: &str, value: &str) {
        // SAFETY: seeding runs during single-threaded startup, before any
        // other thread reads the environment. Callers that seed later own
        // that synchronisation.
        unsafe { std::env::set_var(name, value) }
    }
}

/// An in-memory environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl EnvProvider for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set_var(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
