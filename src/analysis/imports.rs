//! Import specifier extraction and filesystem-probed resolution

use super::syntax::{for_each_node, node_text};
use crate::constants;
use crate::utils::{is_excluded_name, normalize_lexically};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tree_sitter::{Node, Tree};

fn import_from_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"import\s+.*?from\s+['"](.+?)['"]"#).expect("valid import regex")
    })
}

/// Specifiers of `import ... from '<path>'` statements, line-oriented
///
/// Side-effect imports, `require` calls and statements whose clause spans
/// several lines are not seen. Used by the manual scan where no parser is
/// involved.
pub fn regex_imports(source: &str) -> Vec<String> {
    import_from_regex()
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Specifiers imported by a parsed module, in source order
///
/// Covers `import ... from`, `import '...'`, `export ... from`,
/// `import x = require('...')`, `require('...')` and `import('...')` with a
/// string literal argument.
pub fn ast_imports(tree: &Tree, source: &str) -> Vec<String> {
    let mut specifiers = Vec::new();
    for_each_node(tree, |node| {
        let literal = match node.kind() {
            "import_statement" => node.child_by_field_name("source").or_else(|| {
                first_child_of_kind(node, "import_require_clause")
                    .and_then(|clause| clause.child_by_field_name("source"))
            }),
            "export_statement" => node.child_by_field_name("source"),
            "call_expression" => call_argument(node, source),
            _ => None,
        };
        if let Some(text) = literal.and_then(|n| string_value(n, source)) {
            specifiers.push(text);
        }
    });
    specifiers
}

/// First string argument of `require(...)` or `import(...)`
fn call_argument<'tree>(call: Node<'tree>, source: &str) -> Option<Node<'tree>> {
    let callee = call.child_by_field_name("function")?;
    let is_loader = match callee.kind() {
        "import" => true,
        "identifier" => node_text(callee, source) == "require",
        _ => false,
    };
    if !is_loader {
        return None;
    }
    let arguments = call.child_by_field_name("arguments")?;
    let first = arguments.named_child(0)?;
    (first.kind() == "string").then_some(first)
}

fn first_child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn string_value(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let text = node_text(node, source);
    let inner = text
        .strip_prefix(['\'', '"'])
        .and_then(|t| t.strip_suffix(['\'', '"']))?;
    (!inner.is_empty()).then(|| inner.to_string())
}

/// Whether a specifier points into the project rather than at a package
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// Resolve a relative `specifier` imported by `importer` to a file under `root`
///
/// Probes the literal path, then the literal path with each of
/// `.ts`, `.tsx`, `.js`, `.jsx` appended, then `<path>/index` with the same
/// suffixes. The first existing file wins. Targets outside `root` or inside an
/// excluded directory never resolve.
pub fn resolve_import(root: &Path, importer: &Path, specifier: &str) -> Option<PathBuf> {
    if !is_relative(specifier) {
        return None;
    }
    let importer_dir = importer.parent()?.strip_prefix(root).ok()?;
    let relative = normalize_lexically(&importer_dir.join(specifier))?;
    let excluded = relative.components().any(|c| match c {
        Component::Normal(name) => is_excluded_name(name),
        _ => true,
    });
    if excluded {
        return None;
    }

    let base = root.join(relative);
    candidates(&base).into_iter().find(|candidate| candidate.is_file())
}

fn candidates(base: &Path) -> Vec<PathBuf> {
    let suffixes = constants::source::RESOLVE_EXTENSIONS;
    let mut out = Vec::with_capacity(1 + suffixes.len() * 2);
    out.push(base.to_path_buf());
    out.extend(suffixes.iter().map(|ext| with_suffix(base, ext)));
    let index = base.join("index");
    out.extend(suffixes.iter().map(|ext| with_suffix(&index, ext)));
    out
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}
