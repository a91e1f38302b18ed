//! File system utility functions

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: impl AsRef<Path>) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Make `path` an existing, empty directory
pub fn empty_directory(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                std::fs::remove_dir_all(entry.path())?;
            } else {
                std::fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    } else {
        std::fs::create_dir_all(path)
    }
}

/// Write `bytes` to `path` through a sibling temp file and a rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_directory_exists(parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    std::io::Write::write_all(&mut tmp, bytes)?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Whether a directory entry name is hidden from every scan
///
/// Dot-entries and `node_modules` are never read.
pub fn is_excluded_name(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || crate::constants::source::EXCLUDED_DIRS.contains(&name.as_ref())
}

/// Whether `path` has a source-file extension
pub fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| crate::constants::source::SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Path of `path` relative to `root`, joined with `/` on every platform
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Resolve `.` and `..` components without touching the filesystem
///
/// Returns `None` when the path climbs above its starting point.
pub fn normalize_lexically(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                out.push(component.as_os_str());
                depth = 0;
            }
        }
    }
    Some(out)
}

/// Join a relative, possibly `..`-laden path onto `root`, refusing escapes
pub fn join_within(root: &Path, relative: &Path) -> Option<PathBuf> {
    if relative.is_absolute() {
        return None;
    }
    let normalized = normalize_lexically(relative)?;
    Some(root.join(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directory_exists_nested_path() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("level1").join("level2").join("level3");

        assert!(!nested_path.exists());
        ensure_directory_exists(&nested_path).unwrap();
        assert!(nested_path.is_dir());

        // Should not error on existing directory
        ensure_directory_exists(&nested_path).unwrap();
    }

    #[test]
    fn test_empty_directory_clears_contents() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("project");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.txt"), "a").unwrap();
        fs::write(dir.join("sub/b.txt"), "b").unwrap();

        empty_directory(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);

        let fresh = temp_dir.path().join("fresh");
        empty_directory(&fresh).unwrap();
        assert!(fresh.is_dir());
    }

    #[test]
    fn test_write_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out").join("result.json");
        write_atomic(&target, b"{}").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        write_atomic(&target, b"[]").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "[]");
    }

    #[test]
    fn test_is_excluded_name() {
        assert!(is_excluded_name(OsStr::new("node_modules")));
        assert!(is_excluded_name(OsStr::new(".git")));
        assert!(is_excluded_name(OsStr::new(".env")));
        assert!(!is_excluded_name(OsStr::new("src")));
        assert!(!is_excluded_name(OsStr::new("dist")));
    }

    #[test]
    fn test_has_source_extension() {
        assert!(has_source_extension(Path::new("src/App.tsx")));
        assert!(has_source_extension(Path::new("index.js")));
        assert!(!has_source_extension(Path::new("styles.css")));
        assert!(!has_source_extension(Path::new("Makefile")));
    }

    #[test]
    fn test_relative_slash_path() {
        let root = Path::new("/p/root");
        assert_eq!(
            relative_slash_path(root, &root.join("src").join("App.tsx")).as_deref(),
            Some("src/App.tsx")
        );
        assert_eq!(relative_slash_path(root, Path::new("/elsewhere/x")), None);
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("src/./components/../App.tsx")),
            Some(PathBuf::from("src/App.tsx"))
        );
        assert_eq!(normalize_lexically(Path::new("../outside")), None);
        assert_eq!(normalize_lexically(Path::new("a/../../b")), None);
    }

    #[test]
    fn test_join_within() {
        let root = Path::new("/p");
        assert_eq!(
            join_within(root, Path::new("src/../lib/a.ts")),
            Some(PathBuf::from("/p/lib/a.ts"))
        );
        assert_eq!(join_within(root, Path::new("../../etc/passwd")), None);
        assert_eq!(join_within(root, Path::new("/etc/passwd")), None);
    }
}
