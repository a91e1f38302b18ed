//! In-flight leases and the retention sweep
//!
//! A [`LeaseRegistry`] records which project ids are being materialized or
//! analyzed. The orchestrator holds a [`Lease`] for the whole run and the
//! sweep never deletes anything that belongs to a leased id.
//!
//! Leases are backed by an advisory lock on `<lock_dir>/<id>.lock`, so a
//! sweep running in another process sees them too. The lock is released
//! when the holder drops the lease or exits.

use crate::constants;
use crate::logger::Logger;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// Project ids with a run in flight, shared in-process and across
/// processes through lock files in `lock_dir`
#[derive(Debug, Clone)]
pub struct LeaseRegistry {
    active: Arc<Mutex<HashSet<String>>>,
    lock_dir: PathBuf,
}

/// Held while a run owns a project id; released on drop
#[derive(Debug)]
pub struct Lease {
    registry: LeaseRegistry,
    project_id: String,
    file: File,
}

impl LeaseRegistry {
    /// Registry whose lock files live in `lock_dir` (the projects directory)
    pub fn new(lock_dir: impl Into<PathBuf>) -> Self {
        Self {
            active: Arc::default(),
            lock_dir: lock_dir.into(),
        }
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    pub fn lock_path(&self, project_id: &str) -> PathBuf {
        self.lock_dir.join(format!(
            "{project_id}{}",
            constants::config::LOCK_FILE_SUFFIX
        ))
    }

    /// Take the lease for `project_id`, or `None` if this or another process
    /// already holds it
    pub fn acquire(&self, project_id: &str) -> io::Result<Option<Lease>> {
        if !self.lock().insert(project_id.to_string()) {
            return Ok(None);
        }
        match self.lock_file(project_id) {
            Ok(Some(file)) => Ok(Some(Lease {
                registry: self.clone(),
                project_id: project_id.to_string(),
                file,
            })),
            other => {
                self.lock().remove(project_id);
                other.map(|_| None)
            }
        }
    }

    pub fn is_active(&self, project_id: &str) -> bool {
        self.lock().contains(project_id) || self.held_on_disk(project_id)
    }

    /// Whether a directory entry name belongs to a leased project
    ///
    /// Lock files are protected while held; stale ones age out like any
    /// other entry.
    pub fn protects(&self, entry_name: &str) -> bool {
        let id = entry_name
            .strip_suffix(constants::config::LOCK_FILE_SUFFIX)
            .or_else(|| entry_name.strip_suffix(constants::config::ANALYSIS_FILE_SUFFIX))
            .or_else(|| entry_name.strip_suffix(".zip"))
            .unwrap_or(entry_name);
        self.is_active(id)
    }

    fn lock_file(&self, project_id: &str) -> io::Result<Option<File>> {
        std::fs::create_dir_all(&self.lock_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path(project_id))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {}
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => return Ok(None),
            Err(e) => return Err(e),
        }
        file.set_len(0)?;
        writeln!(&file, "{}", std::process::id())?;
        Ok(Some(file))
    }

    fn held_on_disk(&self, project_id: &str) -> bool {
        let file = match File::open(self.lock_path(project_id)) {
            Ok(file) => file,
            Err(_) => return false,
        };
        match FileExt::try_lock_shared(&file) {
            Ok(()) => {
                let _ = FileExt::unlock(&file);
                false
            }
            // A lock we cannot test is treated as held
            Err(_) => true,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Lease {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        self.registry.lock().remove(&self.project_id);
    }
}

/// Delete entries of `dir` last modified more than `max_age` ago
///
/// Returns the names that were removed. Entries of leased projects are kept,
/// and a failure on one entry is logged and skipped. A missing `dir` sweeps
/// nothing.
pub fn sweep(dir: &Path, max_age: Duration, leases: &LeaseRegistry) -> Result<Vec<String>> {
    let logger = Logger;
    let scope = dir.display().to_string();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let now = SystemTime::now();
    let mut removed = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                logger.warn(&scope, &format!("Skipping unreadable entry: {e}"));
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if leases.protects(&name) {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .map(|modified| now.duration_since(modified).unwrap_or_default());
        let age = match age {
            Ok(age) => age,
            Err(e) => {
                logger.warn(&scope, &format!("Cannot stat {name}: {e}"));
                continue;
            }
        };
        if age <= max_age {
            continue;
        }

        let path = entry.path();
        let result = match entry.file_type() {
            Ok(t) if t.is_dir() => std::fs::remove_dir_all(&path),
            _ => std::fs::remove_file(&path),
        };
        match result {
            Ok(()) => {
                logger.info(&scope, &format!("Removed expired {name}"));
                removed.push(name);
            }
            Err(e) => logger.warn(&scope, &format!("Failed to remove {name}: {e}")),
        }
    }

    removed.sort();
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lease_is_exclusive_and_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let registry = LeaseRegistry::new(temp.path());
        let lease = registry.acquire("p1").unwrap().unwrap();
        assert_eq!(lease.project_id(), "p1");
        assert!(registry.acquire("p1").unwrap().is_none());
        assert!(registry.is_active("p1"));
        assert!(registry.lock_path("p1").is_file());

        drop(lease);
        assert!(!registry.is_active("p1"));
        assert!(registry.acquire("p1").unwrap().is_some());
    }

    #[test]
    fn test_lease_is_visible_to_an_independent_registry() {
        let temp = TempDir::new().unwrap();
        let owner = LeaseRegistry::new(temp.path());
        let other = LeaseRegistry::new(temp.path());

        let lease = owner.acquire("shared").unwrap().unwrap();
        assert!(other.is_active("shared"));
        assert!(other.protects("shared.zip"));
        assert!(other.acquire("shared").unwrap().is_none());

        drop(lease);
        assert!(!other.is_active("shared"));
        assert!(other.acquire("shared").unwrap().is_some());
    }

    #[test]
    fn test_protects_project_artifacts() {
        let temp = TempDir::new().unwrap();
        let registry = LeaseRegistry::new(temp.path());
        let _lease = registry.acquire("abc").unwrap().unwrap();
        assert!(registry.protects("abc"));
        assert!(registry.protects("abc.zip"));
        assert!(registry.protects("abc_analysis.json"));
        assert!(registry.protects("abc.lock"));
        assert!(!registry.protects("abcd"));
        assert!(!registry.protects("other_analysis.json"));
    }

    #[test]
    fn test_sweep_with_zero_age_removes_everything_unleased() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::create_dir_all(dir.join("old/src")).unwrap();
        fs::write(dir.join("old_analysis.json"), "{}").unwrap();
        fs::create_dir_all(dir.join("busy")).unwrap();
        fs::write(dir.join("busy_analysis.json"), "{}").unwrap();

        let registry = LeaseRegistry::new(dir);
        let _lease = registry.acquire("busy").unwrap().unwrap();
        drop(registry.acquire("old").unwrap());
        std::thread::sleep(Duration::from_millis(20));

        let removed = sweep(dir, Duration::ZERO, &registry).unwrap();
        assert_eq!(removed, vec!["old", "old.lock", "old_analysis.json"]);
        assert!(dir.join("busy").exists());
        assert!(dir.join("busy_analysis.json").exists());
        assert!(dir.join("busy.lock").exists());
    }

    #[test]
    fn test_sweep_from_another_registry_keeps_leased_entries() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::create_dir_all(dir.join("busy/src")).unwrap();
        fs::write(dir.join("busy_analysis.json"), "{}").unwrap();

        let _lease = LeaseRegistry::new(dir).acquire("busy").unwrap().unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let removed = sweep(dir, Duration::ZERO, &LeaseRegistry::new(dir)).unwrap();
        assert!(removed.is_empty());
        assert!(dir.join("busy/src").is_dir());
    }

    #[test]
    fn test_sweep_keeps_recent_entries() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("fresh.zip"), "zip").unwrap();

        let removed = sweep(
            temp.path(),
            Duration::from_secs(24 * 3600),
            &LeaseRegistry::new(temp.path()),
        )
        .unwrap();
        assert!(removed.is_empty());
        assert!(temp.path().join("fresh.zip").exists());
    }

    #[test]
    fn test_sweep_missing_directory() {
        let temp = TempDir::new().unwrap();
        let removed = sweep(
            &temp.path().join("nope"),
            Duration::ZERO,
            &LeaseRegistry::new(temp.path()),
        )
        .unwrap();
        assert!(removed.is_empty());
    }
}
