//! Heuristic UI component discovery
//!
//! Each source file is parsed and lowered into [`Declaration`]s. Three
//! independent predicates then decide which declarations look like
//! components. Everything is file-local: nothing is resolved across imports.

use super::syntax::{for_each_node, node_text, parse_source};
use super::types::{ComponentInfo, ComponentKind};
use super::walk::{read_source, source_files};
use crate::config::Limits;
use crate::error::ParseFailure;
use crate::utils::relative_slash_path;
use std::path::Path;
use tree_sitter::{Node, Tree};

/// What a variable is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initializer {
    Arrow,
    FunctionExpression,
    Other,
}

/// A named declaration that might be a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Function { name: String },
    Variable { name: String, init: Initializer },
    Class { name: String, has_superclass: bool },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function { name }
            | Declaration::Variable { name, .. }
            | Declaration::Class { name, .. } => name,
        }
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// `function App() {}`
pub fn is_function_component(decl: &Declaration) -> bool {
    matches!(decl, Declaration::Function { name } if starts_uppercase(name))
}

/// `const App = () => ...` or `const App = function () {...}`
pub fn is_bound_function_component(decl: &Declaration) -> bool {
    matches!(
        decl,
        Declaration::Variable { name, init: Initializer::Arrow | Initializer::FunctionExpression }
            if starts_uppercase(name)
    )
}

/// `class App extends Base {}`
pub fn is_class_component(decl: &Declaration) -> bool {
    matches!(
        decl,
        Declaration::Class { name, has_superclass: true } if starts_uppercase(name)
    )
}

/// Component kind of a declaration, if it qualifies
pub fn classify(decl: &Declaration) -> Option<ComponentKind> {
    if is_function_component(decl) || is_bound_function_component(decl) {
        Some(ComponentKind::Functional)
    } else if is_class_component(decl) {
        Some(ComponentKind::Class)
    } else {
        None
    }
}

/// Lower every candidate declaration in `tree`, in document order
pub fn declarations(tree: &Tree, source: &str) -> Vec<Declaration> {
    let mut found = Vec::new();
    for_each_node(tree, |node| {
        if let Some(decl) = lower(node, source) {
            found.push(decl);
        }
    });
    found
}

fn lower(node: Node<'_>, source: &str) -> Option<Declaration> {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => Some(Declaration::Function {
            name: declared_name(node, source)?,
        }),
        "variable_declarator" => {
            let name_node = node.child_by_field_name("name")?;
            if name_node.kind() != "identifier" {
                return None;
            }
            Some(Declaration::Variable {
                name: node_text(name_node, source).to_string(),
                init: initializer(node.child_by_field_name("value")),
            })
        }
        // `export default function App() {}` can surface as a named expression
        "function_expression" | "function"
            if node.parent().is_some_and(|p| p.kind() == "export_statement") =>
        {
            Some(Declaration::Function {
                name: declared_name(node, source)?,
            })
        }
        "class_declaration" | "abstract_class_declaration" => Some(Declaration::Class {
            name: declared_name(node, source)?,
            has_superclass: has_superclass(node, source),
        }),
        _ => None,
    }
}

fn declared_name(node: Node<'_>, source: &str) -> Option<String> {
    let name = node_text(node.child_by_field_name("name")?, source);
    (!name.is_empty()).then(|| name.to_string())
}

fn initializer(value: Option<Node<'_>>) -> Initializer {
    let mut current = value;
    while let Some(node) = current {
        match node.kind() {
            "parenthesized_expression" => current = node.named_child(0),
            "arrow_function" => return Initializer::Arrow,
            "function_expression" | "function" | "generator_function" => {
                return Initializer::FunctionExpression;
            }
            _ => return Initializer::Other,
        }
    }
    Initializer::Other
}

fn has_superclass(class: Node<'_>, source: &str) -> bool {
    let mut cursor = class.walk();
    let heritage = class
        .children(&mut cursor)
        .find(|c| c.kind() == "class_heritage");
    let Some(heritage) = heritage else {
        return false;
    };

    let mut cursor = heritage.walk();
    let has_extends_clause = heritage
        .children(&mut cursor)
        .any(|c| c.kind() == "extends_clause");
    has_extends_clause || node_text(heritage, source).trim_start().starts_with("extends")
}

/// Components declared in one already-read source file
///
/// A tree with syntax errors is rejected as a whole.
pub fn components_in_source(
    path: &Path,
    rel_path: &str,
    source: &str,
) -> Result<Vec<ComponentInfo>, ParseFailure> {
    let tree = parse_source(path, source)?;
    if tree.root_node().has_error() {
        return Err(ParseFailure::Syntax);
    }

    Ok(declarations(&tree, source)
        .into_iter()
        .filter_map(|decl| {
            classify(&decl).map(|kind| ComponentInfo::new(decl.name(), rel_path, kind))
        })
        .collect())
}

/// Read and scan one file, refusing files above `max_bytes`
pub fn components_in_file(
    path: &Path,
    rel_path: &str,
    max_bytes: u64,
) -> Result<Vec<ComponentInfo>, ParseFailure> {
    let source = read_source(path, max_bytes)?;
    components_in_source(path, rel_path, &source)
}

/// Components found under a root and how many files were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentExtraction {
    pub components: Vec<ComponentInfo>,
    pub skipped_files: usize,
    /// The source file limit was reached before every file was scanned
    pub truncated: bool,
}

/// Scan every source file under `root`
///
/// Files that cannot be parsed contribute nothing; they never fail the scan.
pub fn extract_components(root: &Path, limits: &Limits) -> ComponentExtraction {
    let mut extraction = ComponentExtraction::default();

    let scan = source_files(root, limits.max_source_files);
    extraction.truncated = scan.truncated;
    for file in scan.files {
        let Some(rel_path) = relative_slash_path(root, &file) else {
            continue;
        };
        match components_in_file(&file, &rel_path, limits.max_parse_bytes) {
            Ok(found) => extraction.components.extend(found),
            Err(_) => extraction.skipped_files += 1,
        }
    }

    extraction
}
