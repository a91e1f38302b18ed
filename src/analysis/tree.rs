//! Bounded file-tree construction
//!
//! Only metadata is read. Each directory is listed in file-name order, noise
//! directories and dot-entries are skipped, and symbolic links are neither
//! followed nor emitted.

use super::types::FileNode;
use crate::config::Limits;
use crate::constants;
use anyhow::{Context, Result};
use std::fs::DirEntry;
use std::path::Path;

/// Build the listing of `root`
///
/// An unreadable root is an error; unreadable subdirectories are listed as
/// empty.
pub fn build_file_tree(root: &Path, limits: &Limits) -> Result<Vec<FileNode>> {
    let entries = eligible_entries(root)
        .with_context(|| format!("Failed to read project directory {}", root.display()))?;
    Ok(build_level(entries, "", 0, limits))
}

fn build_level(
    entries: Vec<DirEntry>,
    prefix: &str,
    depth: usize,
    limits: &Limits,
) -> Vec<FileNode> {
    if depth > limits.max_tree_depth {
        return Vec::new();
    }

    let total = entries.len();
    let mut nodes = Vec::with_capacity(total.min(limits.max_dir_entries) + 1);

    for entry in entries.into_iter().take(limits.max_dir_entries) {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };

        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            let children = eligible_entries(&entry.path())
                .map(|children| build_level(children, &path, depth + 1, limits))
                .unwrap_or_default();
            nodes.push(FileNode::directory(name, path, children));
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let extension = entry
                .path()
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            nodes.push(FileNode::file(name, path, size, extension));
        }
    }

    if total > limits.max_dir_entries {
        nodes.push(FileNode::overflow(total - limits.max_dir_entries));
    }

    nodes
}

/// Entries of `dir` that may appear in the tree, sorted by name
fn eligible_entries(dir: &Path) -> std::io::Result<Vec<DirEntry>> {
    let mut entries: Vec<DirEntry> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| is_listed(e))
        .collect();
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn is_listed(entry: &DirEntry) -> bool {
    let name = entry.file_name();
    let name = name.to_string_lossy();
    if name.starts_with('.') || constants::source::TREE_EXCLUDED_NAMES.contains(&name.as_ref()) {
        return false;
    }
    entry.file_type().is_ok_and(|t| !t.is_symlink())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(nodes: &[FileNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_excludes_noise_and_sorts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::create_dir_all(root.join("node_modules/react")).unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".env"), "SECRET=1").unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("src/components/Button.tsx"), "export {}").unwrap();

        let tree = build_file_tree(root, &Limits::default()).unwrap();
        assert_eq!(names(&tree), vec!["package.json", "src"]);

        let src = &tree[1];
        assert!(src.is_dir());
        let components = &src.children.as_ref().unwrap()[0];
        assert_eq!(components.path, "src/components");
        let button = &components.children.as_ref().unwrap()[0];
        assert_eq!(button.path, "src/components/Button.tsx");
        assert_eq!(button.extension.as_deref(), Some(".tsx"));
        assert_eq!(button.size, Some(9));
    }

    #[test]
    fn test_fan_out_cap_adds_placeholder() {
        let temp = TempDir::new().unwrap();
        for i in 0..200 {
            fs::write(temp.path().join(format!("file{i:03}.js")), "").unwrap();
        }

        let tree = build_file_tree(temp.path(), &Limits::default()).unwrap();
        assert_eq!(tree.len(), 51);
        assert_eq!(tree[0].name, "file000.js");
        assert_eq!(tree[49].name, "file049.js");
        assert_eq!(tree[50], FileNode::overflow(150));
    }

    #[test]
    fn test_depth_cap() {
        let temp = TempDir::new().unwrap();
        let deep = (0..15).map(|i| format!("d{i}")).collect::<Vec<_>>().join("/");
        fs::create_dir_all(temp.path().join(&deep)).unwrap();

        let limits = Limits {
            max_tree_depth: 3,
            ..Limits::default()
        };
        let tree = build_file_tree(temp.path(), &limits).unwrap();

        let mut node = &tree[0];
        let mut levels = 1;
        while let Some(child) = node.children.as_ref().and_then(|c| c.first()) {
            node = child;
            levels += 1;
        }
        assert_eq!(levels, 4);
        assert_eq!(node.children.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_idempotent() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/c.ts"), "x").unwrap();
        fs::write(temp.path().join("z.md"), "").unwrap();

        let first = build_file_tree(temp.path(), &Limits::default()).unwrap();
        let second = build_file_tree(temp.path(), &Limits::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(build_file_tree(&temp.path().join("nope"), &Limits::default()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_emitted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        let tree = build_file_tree(temp.path(), &Limits::default()).unwrap();
        assert_eq!(names(&tree), vec!["real"]);
    }
}
