use crate::env::EnvProvider;
use crate::types::SeedMode;

/// Collapse repeated names within one file: the last value wins, the first
/// position is kept.
pub fn dedupe(entries: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::with_capacity(entries.len());
    for (name, value) in entries {
        match out.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => out.push((name, value)),
        }
    }
    out
}

/// Names written and names left alone by one [`inject`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Injected {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

/// Write `entries` into `provider`. Under [`SeedMode::Preserve`] a name the
/// provider already holds is skipped.
pub fn inject(
    provider: &mut dyn EnvProvider,
    entries: Vec<(String, String)>,
    mode: SeedMode,
) -> Injected {
    let mut result = Injected::default();
    for (name, value) in entries {
        if mode == SeedMode::Preserve && provider.contains(&name) {
            result.skipped.push(name);
            continue;
        }
        provider.set_var(&name, &value);
        result.applied.push(name);
    }
    result
}
