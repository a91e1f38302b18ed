//! Common test support utilities and fixtures
//!
//! This module provides shared functionality to reduce code duplication
//! across integration and E2E tests.

#![allow(dead_code)]

use codesight::config::Settings;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use std::{fs, process::Command};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Result of running a CLI command
#[derive(Debug)]
pub struct CliOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliOutput {
    /// Parse stderr as the `{error, details?}` payload
    pub fn error_payload(&self) -> serde_json::Value {
        let line = self
            .stderr
            .lines()
            .rev()
            .find(|l| l.trim_start().starts_with('{'))
            .expect("No JSON payload on stderr");
        serde_json::from_str(line).expect("Failed to parse error payload")
    }
}

/// A test workspace with temporary directory and settings rooted in it
pub struct Workspace {
    pub root: TempDir,
    pub config_path: PathBuf,
    pub settings: Settings,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create a new temporary workspace with a settings file
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let config_path = root.path().join("codesight.yaml");
        let settings = Settings::default().with_base_dir(root.path());
        settings
            .save(&config_path)
            .expect("Failed to write settings");
        Self {
            root,
            config_path,
            settings,
        }
    }

    /// Get the workspace root path
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Get the config file path as string
    pub fn config_str(&self) -> &str {
        self.config_path.to_str().expect("Config path not UTF-8")
    }

    /// Directory a project is materialized into
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.settings.project_dir(project_id)
    }

    /// Write a file below the project directory, creating parents
    pub fn write_project_file(&self, project_id: &str, relative: &str, content: &str) {
        let path = self.project_dir(project_id).join(relative);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent");
        fs::write(path, content).expect("Failed to write project file");
    }

    /// Write an archive to the conventional upload location
    pub fn upload(&self, project_id: &str, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.settings.upload_path(project_id);
        write_zip(&path, entries);
        path
    }
}

/// Set the modification time of a file or directory `hours` into the past
pub fn backdate(path: &Path, hours: u64) {
    let file = fs::File::open(path).expect("Failed to open entry to backdate");
    file.set_modified(SystemTime::now() - Duration::from_secs(hours * 3600))
        .expect("Failed to set modification time");
}

/// Write a ZIP archive with the given `(name, content)` entries
///
/// Names ending in `/` become directory entries.
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create archive parent");
    }
    let file = fs::File::create(path).expect("Failed to create archive");
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, options)
                .expect("Failed to add directory");
        } else {
            writer.start_file(*name, options).expect("Failed to add file");
            writer
                .write_all(content.as_bytes())
                .expect("Failed to write entry");
        }
    }
    writer.finish().expect("Failed to finish archive");
}

/// A small React project: an entry point, an App and one component
pub fn react_project() -> Vec<(&'static str, &'static str)> {
    vec![
        ("package.json", r#"{"name":"demo","version":"1.0.0"}"#),
        (
            "src/index.tsx",
            "import React from 'react';\nimport App from './App';\n\nrender(<App />);\n",
        ),
        (
            "src/App.tsx",
            "import React, { useState } from 'react';\n\
             import Button from './components/Button';\n\n\
             export default function App() {\n\
             \x20 const [count, setCount] = useState(0);\n\
             \x20 return <Button onClick={() => setCount(count + 1)} />;\n\
             }\n",
        ),
        (
            "src/components/Button.tsx",
            "export const Button = ({ onClick }) => <button onClick={onClick}>Go</button>;\n\
             export default Button;\n",
        ),
        ("node_modules/react/index.js", "module.exports = {};\n"),
    ]
}

/// Run the codesight binary with given arguments
pub fn run_cli(args: &[&str], cwd: Option<&Path>) -> CliOutput {
    run_cli_with_env(args, cwd, &[])
}

/// Run the codesight binary with extra environment variables
pub fn run_cli_with_env(args: &[&str], cwd: Option<&Path>, env: &[(&str, &Path)]) -> CliOutput {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_codesight"));
    cmd.args(args);
    cmd.env_remove("GITHUB_TOKEN");
    for var in [
        codesight::constants::env::PROJECTS_DIR,
        codesight::constants::env::UPLOADS_DIR,
        codesight::constants::env::ERROR_LOG,
    ] {
        cmd.env_remove(var);
    }
    for (var, value) in env {
        cmd.env(var, value);
    }
    cmd.env("NO_COLOR", "1");

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().expect("Failed to execute codesight");

    CliOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

/// Paths of every node in a file tree, depth first
pub fn tree_paths(nodes: &[codesight::FileNode]) -> Vec<String> {
    let mut out = Vec::new();
    for node in nodes {
        out.push(node.path.clone());
        if let Some(children) = &node.children {
            out.extend(tree_paths(children));
        }
    }
    out
}
