//! Env file discovery and loading.
//!
//! # Root
//!
//! Every seed file name is joined onto one root directory, resolved from a
//! [`SeedRoot`]:
//!
//! - `Cwd`, `Path`, `Platform` resolve to a single directory directly.
//! - `Anchor(name)` walks from the working directory toward the filesystem
//!   root and stops at the first directory whose own name is `name`. This
//!   lets code running several folders deep inside a project (tests in a
//!   nested package, a binary launched from `target/`) find files kept at the
//!   project root.
//!
//! Absolute file names ignore the root.
//!
//! # Formats
//!
//! Files ending in `.toml` are parsed as TOML and flattened (see
//! [`flatten`](crate::flatten)). Everything else is read as a dotenv file.
//! A file is parsed completely before any of its entries are returned.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::EnvfigError;
use crate::flatten::flatten;
use crate::types::SeedRoot;

/// Resolve `root` to a concrete directory. `cwd` replaces the process working
/// directory when given.
pub fn resolve_root(root: &SeedRoot, cwd: Option<&Path>) -> Result<PathBuf, EnvfigError> {
    match root {
        SeedRoot::Cwd => working_dir(cwd),
        SeedRoot::Anchor(anchor) => {
            let start = working_dir(cwd)?;
            find_anchor(&start, anchor).ok_or_else(|| EnvfigError::AnchorNotFound {
                anchor: anchor.clone(),
                start,
            })
        }
        SeedRoot::Path(dir) => Ok(dir.clone()),
        SeedRoot::Platform(app_name) => directories::ProjectDirs::from("", "", app_name)
            .map(|proj| proj.config_dir().to_path_buf())
            .ok_or_else(|| EnvfigError::PlatformDirUnavailable {
                app_name: app_name.clone(),
            }),
    }
}

fn working_dir(cwd: Option<&Path>) -> Result<PathBuf, EnvfigError> {
    match cwd {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().map_err(EnvfigError::NoWorkingDirectory),
    }
}

/// The nearest directory, `start` included, whose final segment is `anchor`.
pub fn find_anchor(start: &Path, anchor: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.file_name() == Some(OsStr::new(anchor)))
        .map(Path::to_path_buf)
}

/// Read and parse one env file into `(NAME, value)` pairs in file order.
pub fn read_entries(path: &Path) -> Result<Vec<(String, String)>, EnvfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EnvfigError::FileNotFound(path.to_path_buf()),
        _ => EnvfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if path.extension() == Some(OsStr::new("toml")) {
        parse_toml(&content, path)
    } else {
        parse_dotenv(&content, path)
    }
}

/// `${VAR}` references are expanded by dotenvy against the process
/// environment and earlier lines of the same file, never against the
/// provider being seeded. Unknown names expand to the empty string.
fn parse_dotenv(content: &str, path: &Path) -> Result<Vec<(String, String)>, EnvfigError> {
    dotenvy::from_read_iter(content.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| EnvfigError::EnvFileParse {
            path: path.to_path_buf(),
            source: e,
        })
}

fn parse_toml(content: &str, path: &Path) -> Result<Vec<(String, String)>, EnvfigError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| EnvfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    flatten(&table).map_err(|unsupported| EnvfigError::UnsupportedFileValue {
        key: unsupported.0,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn resolve_explicit_path() {
        let p = PathBuf::from("/tmp/myapp");
        let resolved = resolve_root(&SeedRoot::Path(p.clone()), None).unwrap();
        assert_eq!(resolved, p);
    }

    #[test]
    fn resolve_cwd_override() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_root(&SeedRoot::Cwd, Some(dir.path())).unwrap();
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn anchor_found_from_deep_folder() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("config");
        let deep = project.join("deep_folder").join("inner");
        fs::create_dir_all(&deep).unwrap();

        let root = resolve_root(&SeedRoot::Anchor("config".into()), Some(&deep)).unwrap();
        assert_eq!(root, project);
    }

    #[test]
    fn anchor_matches_start_itself() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("config");
        fs::create_dir_all(&project).unwrap();
        assert_eq!(find_anchor(&project, "config"), Some(project.clone()));
    }

    #[test]
    fn anchor_picks_nearest_match() {
        let start = PathBuf::from("/src/config/tools/config/sub");
        assert_eq!(
            find_anchor(&start, "config"),
            Some(PathBuf::from("/src/config/tools/config"))
        );
    }

    #[test]
    fn anchor_requires_whole_segment() {
        let start = PathBuf::from("/src/myconfig/sub");
        assert_eq!(find_anchor(&start, "config"), None);
    }

    #[test]
    fn anchor_not_found_is_error() {
        let dir = TempDir::new().unwrap();
        let err = resolve_root(&SeedRoot::Anchor("no-such-anchor".into()), Some(dir.path()))
            .unwrap_err();
        match err {
            EnvfigError::AnchorNotFound { anchor, start } => {
                assert_eq!(anchor, "no-such-anchor");
                assert_eq!(start, dir.path());
            }
            other => panic!("Expected AnchorNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn dotenv_entries_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".testing.env");
        fs::write(
            &path,
            "# comment\nHOST_DIR=0.0.0.0\nexport APP_PORT=8080\nAPP_SERVICE_NAME=\"service-name\"\n",
        )
        .unwrap();
        let entries = read_entries(&path).unwrap();
        assert_eq!(
            entries,
            vec![
                ("HOST_DIR".to_string(), "0.0.0.0".to_string()),
                ("APP_PORT".to_string(), "8080".to_string()),
                ("APP_SERVICE_NAME".to_string(), "service-name".to_string()),
            ]
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".not.env");
        match read_entries(&path).unwrap_err() {
            EnvfigError::FileNotFound(p) => assert_eq!(p, path),
            other => panic!("Expected FileNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn malformed_dotenv_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".wrong.env");
        fs::write(&path, "HOST_DIR=0.0.0.0\nTHIS IS NOT VALID\n").unwrap();
        match read_entries(&path).unwrap_err() {
            EnvfigError::EnvFileParse { path: p, .. } => assert_eq!(p, path),
            other => panic!("Expected EnvFileParse, got: {other:?}"),
        }
    }

    #[test]
    fn toml_file_is_flattened() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("env.toml");
        fs::write(&path, "host_dir = \"0.0.0.0\"\n[app]\nport = 8080\n").unwrap();
        let entries = read_entries(&path).unwrap();
        assert!(entries.contains(&("HOST_DIR".into(), "0.0.0.0".into())));
        assert!(entries.contains(&("APP_PORT".into(), "8080".into())));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("env.toml");
        fs::write(&path, "port = = 1\n").unwrap();
        assert!(matches!(
            read_entries(&path).unwrap_err(),
            EnvfigError::TomlParse { .. }
        ));
    }

    #[test]
    fn toml_array_of_tables_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("env.toml");
        fs::write(&path, "[[servers]]\nname = \"a\"\n").unwrap();
        match read_entries(&path).unwrap_err() {
            EnvfigError::UnsupportedFileValue { key, .. } => assert_eq!(key, "servers"),
            other => panic!("Expected UnsupportedFileValue, got: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_returns_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".testing.env");
        fs::write(&path, "A=1\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Root can read anything; only assert when the permission bit holds.
        if fs::read_to_string(&path).is_err() {
            assert!(matches!(
                read_entries(&path).unwrap_err(),
                EnvfigError::IoError { .. }
            ));
        }

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
