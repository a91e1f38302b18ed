//! tree-sitter parsing for JavaScript and TypeScript sources

use crate::error::ParseFailure;
use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

/// Grammar for a source path
///
/// Plain `.ts` files use the TypeScript grammar, where `<T>expr` casts are
/// legal. Everything else (`.js`, `.jsx`, `.tsx`) goes through the TSX
/// grammar, which also accepts JSX and class properties.
pub fn language_for(path: &Path) -> Language {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts") => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        _ => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}

/// Parse `source` with the grammar chosen for `path`
///
/// The returned tree may contain error nodes; callers decide whether a
/// partial tree is usable.
pub fn parse_source(path: &Path, source: &str) -> Result<Tree, ParseFailure> {
    let mut parser = Parser::new();
    parser
        .set_language(&language_for(path))
        .map_err(|e| ParseFailure::Parser(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| ParseFailure::Parser("parser returned no tree".to_string()))
}

/// Visit every node of `tree` in document order
///
/// Iterative, so deeply nested sources cannot exhaust the stack.
pub fn for_each_node<'tree>(tree: &'tree Tree, mut visit: impl FnMut(Node<'tree>)) {
    let mut cursor = tree.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Source text of `node`, empty if it is not valid UTF-8
pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_jsx_and_types() {
        let tree = parse_source(
            Path::new("App.tsx"),
            "const App = (p: { x: number }) => <div>{p.x}</div>;",
        )
        .unwrap();
        assert!(!tree.root_node().has_error());

        let tree = parse_source(Path::new("cast.ts"), "const n = <number>value;").unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_reports_syntax_errors_in_tree() {
        let tree = parse_source(Path::new("broken.js"), "function (").unwrap();
        assert!(tree.root_node().has_error());
    }
}
