//! Resolution of a caller-supplied path into a log target

use std::path::{Component, Path, PathBuf};

use crate::error::LogError;

/// Absolute log file path with its directory and extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    /// Absolute path to the log file
    pub path: PathBuf,
    /// Directory containing the log file
    pub directory: PathBuf,
    /// Extension without the leading dot, empty when the file has none
    pub extension: String,
}

impl LogTarget {
    /// Resolve `raw` against the current working directory
    pub fn resolve(raw: &str) -> Result<Self, LogError> {
        let cwd = std::env::current_dir()
            .map_err(|e| LogError::invalid_path(raw, format!("working directory unavailable: {}", e)))?;
        Self::resolve_in(raw, &cwd)
    }

    /// Resolve `raw` against `base`; `~` expands to the home directory
    pub fn resolve_in(raw: &str, base: &Path) -> Result<Self, LogError> {
        if raw.trim().is_empty() {
            return Err(LogError::invalid_path(raw, "path is empty"));
        }

        let expanded = shellexpand::tilde(raw);
        let given = Path::new(expanded.as_ref());
        let joined = if given.is_absolute() {
            given.to_path_buf()
        } else {
            base.join(given)
        };
        let path = normalize(&joined);

        if path.file_name().is_none() {
            return Err(LogError::invalid_path(raw, "path does not name a file"));
        }
        let directory = match path.parent() {
            Some(dir) => dir.to_path_buf(),
            None => return Err(LogError::invalid_path(raw, "path has no parent directory")),
        };
        let extension = match path.extension() {
            Some(e) => e.to_string_lossy().into_owned(),
            // `.log` is all extension, no stem
            None => dotfile_extension(&path).unwrap_or_default(),
        };

        Ok(Self {
            path,
            directory,
            extension,
        })
    }

    /// File name without the extension
    pub fn stem(&self) -> String {
        if dotfile_extension(&self.path).is_some() {
            return String::new();
        }
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Final path component
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Extension of a name like `.log` that is a single leading dot and nothing else
fn dotfile_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let rest = name.strip_prefix('.')?;
    (!rest.is_empty() && !rest.contains('.')).then(|| rest.to_string())
}

/// Remove `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or prefix
                if matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PathBuf {
        std::env::temp_dir().join("rollog-base")
    }

    #[test]
    fn test_resolve_relative() {
        let target = LogTarget::resolve_in("logs/app.log", &base()).unwrap();
        assert_eq!(target.path, base().join("logs").join("app.log"));
        assert_eq!(target.directory, base().join("logs"));
        assert_eq!(target.extension, "log");
        assert_eq!(target.stem(), "app");
        assert_eq!(target.file_name(), "app.log");
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        let abs = std::env::temp_dir().join("other").join("x.txt");
        let target = LogTarget::resolve_in(&abs.to_string_lossy(), &base()).unwrap();
        assert_eq!(target.path, abs);
    }

    #[test]
    fn test_resolve_normalizes_dots() {
        let target = LogTarget::resolve_in("./a/../b/./c.log", &base()).unwrap();
        assert_eq!(target.path, base().join("b").join("c.log"));
    }

    #[test]
    fn test_resolve_no_extension() {
        let target = LogTarget::resolve_in("journal", &base()).unwrap();
        assert_eq!(target.extension, "");
        assert_eq!(target.stem(), "journal");
    }

    #[test]
    fn test_resolve_dotfile_is_all_extension() {
        let target = LogTarget::resolve_in(".log", &base()).unwrap();
        assert_eq!(target.extension, "log");
        assert_eq!(target.stem(), "");
        assert_eq!(target.file_name(), ".log");
    }

    #[test]
    fn test_resolve_empty_is_invalid() {
        let err = LogTarget::resolve_in("  ", &base()).unwrap_err();
        assert!(matches!(err, LogError::InvalidPath { .. }));
    }

    #[test]
    fn test_resolve_parent_does_not_escape_root() {
        let root = if cfg!(windows) { "C:\\" } else { "/" };
        let target = LogTarget::resolve_in(&format!("{}../../x.log", root), &base()).unwrap();
        assert_eq!(target.path, Path::new(root).join("x.log"));
    }

    #[test]
    fn test_resolve_root_is_invalid() {
        let root = if cfg!(windows) { "C:\\" } else { "/" };
        let err = LogTarget::resolve_in(root, &base()).unwrap_err();
        assert!(matches!(err, LogError::InvalidPath { .. }));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let first = LogTarget::resolve("rollog-idempotent.log").unwrap();
        let second = LogTarget::resolve("rollog-idempotent.log").unwrap();
        assert_eq!(first, second);
        assert!(first.path.is_absolute());
    }
}
