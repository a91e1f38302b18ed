//! Result document types shared by every analysis stage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative source path mapped to the relative paths it imports, in order
pub type DependencyGraph = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// One entry of the bounded project listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub name: String,
    /// Relative to the effective root, `/`-separated
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Leading dot included, empty when the file has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    pub fn file(name: String, path: String, size: u64, extension: String) -> Self {
        Self {
            name,
            path,
            kind: NodeKind::File,
            size: Some(size),
            extension: Some(extension),
            children: None,
        }
    }

    pub fn directory(name: String, path: String, children: Vec<FileNode>) -> Self {
        Self {
            name,
            path,
            kind: NodeKind::Directory,
            size: None,
            extension: None,
            children: Some(children),
        }
    }

    /// Stand-in for the entries of a directory beyond the fan-out cap
    pub fn overflow(remaining: usize) -> Self {
        Self::file(
            format!("...and {remaining} more files"),
            String::new(),
            0,
            String::new(),
        )
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Functional,
    Class,
}

/// A UI-component-like declaration found in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub name: String,
    pub file_path: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub props: Vec<String>,
}

impl ComponentInfo {
    pub fn new(name: impl Into<String>, file_path: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            kind,
            hooks: Vec::new(),
            props: Vec::new(),
        }
    }
}

/// The persisted outcome of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub project_id: String,
    pub timestamp: DateTime<Utc>,
    pub structure: Vec<FileNode>,
    pub dependencies: DependencyGraph,
    pub components: Vec<ComponentInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_node_json_shape() {
        let node = FileNode::directory(
            "src".into(),
            "src".into(),
            vec![FileNode::file(
                "App.tsx".into(),
                "src/App.tsx".into(),
                42,
                ".tsx".into(),
            )],
        );
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "directory");
        assert!(json.get("size").is_none());
        assert_eq!(json["children"][0]["type"], "file");
        assert_eq!(json["children"][0]["extension"], ".tsx");
        assert_eq!(json["children"][0]["size"], 42);
    }

    #[test]
    fn test_overflow_node() {
        let node = FileNode::overflow(150);
        assert_eq!(node.name, "...and 150 more files");
        assert_eq!(node.path, "");
        assert_eq!(node.size, Some(0));
        assert_eq!(node.extension.as_deref(), Some(""));
        assert!(!node.is_dir());
    }

    #[test]
    fn test_component_json_keys() {
        let component = ComponentInfo::new("Button", "src/Button.tsx", ComponentKind::Class);
        let json = serde_json::to_value(&component).unwrap();
        assert_eq!(json["filePath"], "src/Button.tsx");
        assert_eq!(json["type"], "class");
        assert_eq!(json["hooks"], serde_json::json!([]));
        assert_eq!(json["props"], serde_json::json!([]));
    }
}
