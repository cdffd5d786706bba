use std::path::PathBuf;

/// Directory that env file names are joined onto before seeding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeedRoot {
    /// The current working directory.
    #[default]
    Cwd,
    /// The nearest ancestor of the working directory (itself included) whose
    /// final path segment equals the name, e.g. `Anchor("my-service")` for a
    /// checkout at `/home/me/src/my-service/internal/app`.
    Anchor(String),
    /// An explicit directory.
    Path(PathBuf),
    /// Platform config directory for the app name (XDG on Linux,
    /// ~/Library/Application Support on macOS).
    Platform(String),
}

/// How seeded entries treat names that already exist in the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// Existing names are never overwritten: the live environment beats
    /// files, and an earlier file beats a later one.
    #[default]
    Preserve,
    /// Every entry is written: later files beat earlier ones and files beat
    /// the live environment.
    Override,
}
