//! Breadcrumb of the symbols enclosing the cursor.
//!
//! The structured locator walks the editor's symbol tree. When no tree is
//! available for the active document, a regex scan over the document text
//! is used instead. Both produce the same `"Kind: Name > Kind: Name"` form.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::{DocumentSymbol, Position};

/// Separator between breadcrumb segments.
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// Trees deeper than this are treated as malformed.
const MAX_SYMBOL_DEPTH: usize = 64;

pub trait SymbolLocator {
    fn find_enclosing_symbol(&self, position: Position) -> Option<String>;
}

/// Locator over an editor-supplied symbol tree.
pub struct TreeSymbolLocator<'a> {
    symbols: &'a [DocumentSymbol],
}

impl<'a> TreeSymbolLocator<'a> {
    pub fn new(symbols: &'a [DocumentSymbol]) -> Self {
        Self { symbols }
    }
}

impl SymbolLocator for TreeSymbolLocator<'_> {
    fn find_enclosing_symbol(&self, position: Position) -> Option<String> {
        find_enclosing_symbol(self.symbols, position)
    }
}

/// Walk the tree from the root, descending into the first symbol that
/// contains `position` at each level.
pub fn find_enclosing_symbol(symbols: &[DocumentSymbol], position: Position) -> Option<String> {
    let mut trail: Vec<&DocumentSymbol> = Vec::new();
    let mut level = symbols;

    while let Some(symbol) = level.iter().find(|s| s.range.contains(position)) {
        trail.push(symbol);
        if trail.len() > MAX_SYMBOL_DEPTH {
            return None;
        }
        level = &symbol.children;
    }

    if trail.is_empty() {
        return None;
    }

    Some(
        trail
            .iter()
            .map(|s| format!("{}: {}", s.kind, s.name))
            .collect::<Vec<_>>()
            .join(BREADCRUMB_SEPARATOR),
    )
}

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<indent>\s*)(?:export\s+)?(?:default\s+)?(?:pub(?:\([^)]*\))?\s+)?(?:abstract\s+)?(?:class|struct|interface|trait|impl|enum)\s+(?P<name>[A-Za-z_$][\w$]*)",
    )
    .expect("CLASS_RE regex should compile")
});

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<indent>\s*)(?:export\s+)?(?:default\s+)?(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:function\*?|fn|def|func)\s+(?P<name>[A-Za-z_$][\w$]*)",
    )
    .expect("FUNCTION_RE regex should compile")
});

static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<indent>\s+)(?:(?:public|private|protected|static|async|override|readonly)\s+)*(?P<name>[A-Za-z_$][\w$]*)\s*\([^)]*\)\s*(?::\s*[^{=]+)?\{",
    )
    .expect("METHOD_RE regex should compile")
});

const NOT_METHODS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "function"];

/// Best-effort locator that scans the document text above the cursor.
pub struct RegexSymbolLocator<'a> {
    text: &'a str,
}

impl<'a> RegexSymbolLocator<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

struct Declaration {
    indent: usize,
    kind: &'static str,
    name: String,
}

fn classify_line(line: &str) -> Option<Declaration> {
    let (captures, kind) = if let Some(c) = CLASS_RE.captures(line) {
        (c, "Class")
    } else if let Some(c) = FUNCTION_RE.captures(line) {
        (c, "Function")
    } else if let Some(c) = METHOD_RE.captures(line) {
        if NOT_METHODS.contains(&&c["name"]) {
            return None;
        }
        (c, "Method")
    } else {
        return None;
    };

    Some(Declaration {
        indent: captures["indent"].len(),
        kind,
        name: captures["name"].to_string(),
    })
}

impl SymbolLocator for RegexSymbolLocator<'_> {
    fn find_enclosing_symbol(&self, position: Position) -> Option<String> {
        let cursor_line = position.line as usize;
        let mut stack: Vec<Declaration> = Vec::new();

        for line in self.text.lines().take(cursor_line + 1) {
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                continue;
            }
            let indent = line.len() - trimmed.len();
            while stack.last().is_some_and(|d| indent <= d.indent) {
                stack.pop();
            }
            if let Some(mut decl) = classify_line(line) {
                if decl.kind == "Function" && stack.iter().any(|d| d.kind == "Class") {
                    decl.kind = "Method";
                }
                decl.indent = indent;
                stack.push(decl);
            }
        }

        if stack.is_empty() {
            return None;
        }
        Some(
            stack
                .iter()
                .map(|d| format!("{}: {}", d.kind, d.name))
                .collect::<Vec<_>>()
                .join(BREADCRUMB_SEPARATOR),
        )
    }
}

/// Pick the structured locator when a tree exists, the regex one otherwise.
pub fn locate_symbol(
    symbols: Option<&[DocumentSymbol]>,
    text: Option<&str>,
    position: Position,
) -> Option<String> {
    match (symbols, text) {
        (Some(tree), _) => TreeSymbolLocator::new(tree).find_enclosing_symbol(position),
        (None, Some(text)) => RegexSymbolLocator::new(text).find_enclosing_symbol(position),
        (None, None) => None,
    }
}
