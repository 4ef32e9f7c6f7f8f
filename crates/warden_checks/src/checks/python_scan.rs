// SPDX-License-Identifier: Apache-2.0

//! A dependency-free, line-oriented scanner over Python source text.
//!
//! The audited corpus is someone else's Python tree; this system's own
//! implementation language is Rust, so rather than embed a full Python
//! grammar, checks that need to look inside a `.py` file use this manual
//! tokenizer. A file that doesn't look like plausible Python at all (no
//! scannable lines) degrades to a single synthetic finding, the same
//! contract a full AST parser failure would have.

use std::path::Path;
use std::sync::OnceLock;

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Directory/file globs the auditor never descends into or scans: caches,
/// virtualenvs, and generated code, per the Auditor's static ignore-set.
const IGNORE_GLOBS: &[&str] = &[
    "**/__pycache__/**",
    "**/.venv/**",
    "**/venv/**",
    "**/.git/**",
    "**/.mypy_cache/**",
    "**/.pytest_cache/**",
    "**/node_modules/**",
    "**/*.egg-info/**",
    "**/build/**",
    "**/dist/**",
];

fn ignore_set() -> &'static GlobSet {
    static IGNORE: OnceLock<GlobSet> = OnceLock::new();
    IGNORE.get_or_init(|| {
        let mut builder = GlobSetBuilder::new();
        for pattern in IGNORE_GLOBS {
            if let Ok(glob) = Glob::new(pattern) {
                let _ = builder.add(glob);
            }
        }
        builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().expect("empty globset always builds"))
    })
}

/// One `def`/`async def` found while scanning a file.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function name.
    pub name: String,
    /// 1-based line the `def` starts on.
    pub line: u32,
    /// Decorator names (without the leading `@`) immediately preceding it.
    pub decorators: Vec<String>,
    /// True if the line directly after the signature (module/function body)
    /// opens with a triple-quoted string.
    pub has_docstring: bool,
    /// True if declared `async def`.
    pub is_async: bool,
    /// Text after `->` on the `def` line, if the signature declares a
    /// return-type annotation (e.g. `ActionResult`). `None` when the
    /// signature carries no `->` or spans multiple lines.
    pub return_annotation: Option<String>,
    /// `(line, expression text)` for every `return <expr>` statement found
    /// in the function's body (lines indented deeper than the `def`).
    pub returns: Vec<(u32, String)>,
}

/// Recursively collects every `.py` file under `root`, sorted for
/// deterministic iteration. Skips the static ignore-set (caches,
/// virtualenvs, generated code) per the Auditor's file-discovery step.
pub fn discover_python_files(root: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    if !root.exists() {
        return files;
    }
    let ignore = ignore_set();
    for entry in walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !ignore.is_match(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("py") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}


/// Scans source text for function/method definitions.
#[must_use]
pub fn scan_functions(source: &str) -> Vec<FunctionDef> {
    let lines: Vec<&str> = source.lines().collect();
    let mut functions = Vec::new();
    let mut pending_decorators: Vec<String> = Vec::new();

    for (i, raw_line) in lines.iter().enumerate() {
        let indent = raw_line.len() - raw_line.trim_start().len();
        let line = raw_line.trim_start();
        if let Some(name) = line.strip_prefix('@') {
            pending_decorators.push(name.trim().to_owned());
            continue;
        }
        let (is_async, rest) = if let Some(rest) = line.strip_prefix("async def ") {
            (true, rest)
        } else if let Some(rest) = line.strip_prefix("def ") {
            (false, rest)
        } else {
            if !line.is_empty() {
                pending_decorators.clear();
            }
            continue;
        };
        let name = rest.split(['(', ':']).next().unwrap_or("").trim().to_owned();
        let return_annotation = rest
            .rsplit_once("->")
            .map(|(_, after)| after.trim_end_matches(':').trim().to_owned());
        let has_docstring = lines
            .get(i + 1)
            .map(|next| {
                let t = next.trim_start();
                t.starts_with("\"\"\"") || t.starts_with("'''")
            })
            .unwrap_or(false);
        let returns = scan_returns(&lines, i + 1, indent);
        functions.push(FunctionDef {
            name,
            line: (i + 1) as u32,
            decorators: std::mem::take(&mut pending_decorators),
            has_docstring,
            is_async,
            return_annotation,
            returns,
        });
    }
    functions
}

/// Collects `return <expr>` statements belonging to the function whose
/// `def` line sits at `def_indent`, scanning from `body_start` until the
/// indentation returns to `def_indent` or shallower (the next sibling
/// statement, i.e. the end of this function's body).
fn scan_returns(lines: &[&str], body_start: usize, def_indent: usize) -> Vec<(u32, String)> {
    let mut returns = Vec::new();
    for (offset, body_line) in lines.iter().enumerate().skip(body_start) {
        let trimmed = body_line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let body_indent = body_line.len() - trimmed.len();
        if body_indent <= def_indent {
            break;
        }
        if let Some(expr) = trimmed.strip_prefix("return ") {
            returns.push(((offset + 1) as u32, expr.trim().to_owned()));
        } else if trimmed == "return" {
            returns.push(((offset + 1) as u32, String::new()));
        }
    }
    returns
}

/// True if any line imports a module whose dotted path starts with one of
/// `prefixes`.
#[must_use]
pub fn imports_any_prefix(source: &str, prefixes: &[&str]) -> Vec<(u32, String)> {
    let mut hits = Vec::new();
    for (i, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim_start();
        let module = if let Some(rest) = line.strip_prefix("import ") {
            rest.split(['as', ',']).next().unwrap_or("").trim()
        } else if let Some(rest) = line.strip_prefix("from ") {
            rest.split(" import").next().unwrap_or("").trim()
        } else {
            continue;
        };
        if prefixes.iter().any(|p| module.starts_with(p)) {
            hits.push(((i + 1) as u32, module.to_owned()));
        }
    }
    hits
}

/// Lines calling any of `names` as a bare function call (`print(...)`,
/// `input(...)`).
#[must_use]
pub fn calls_any(source: &str, names: &[&str]) -> Vec<(u32, String)> {
    let mut hits = Vec::new();
    for (i, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim_start();
        if line.starts_with('#') {
            continue;
        }
        for name in names {
            let needle = format!("{name}(");
            if line.contains(&needle) {
                hits.push(((i + 1) as u32, (*name).to_owned()));
            }
        }
    }
    hits
}

/// Lines reading an environment variable via `os.environ`/`os.getenv`.
#[must_use]
pub fn env_reads(source: &str) -> Vec<u32> {
    let mut hits = Vec::new();
    for (i, raw_line) in source.lines().enumerate() {
        if raw_line.contains("os.environ") || raw_line.contains("os.getenv") {
            hits.push((i + 1) as u32);
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_functions_detects_docstrings_and_decorators() {
        let src = "@atomic_action(action_id=\"x\")\nasync def do_thing():\n    \"\"\"does a thing\"\"\"\n    pass\n\ndef plain():\n    pass\n";
        let functions = scan_functions(src);
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "do_thing");
        assert!(functions[0].is_async);
        assert!(functions[0].has_docstring);
        assert!(functions[0].decorators[0].starts_with("atomic_action"));
        assert!(!functions[1].has_docstring);
    }

    #[test]
    fn scan_functions_captures_return_annotation_and_return_statements() {
        let src = "async def do_thing() -> ActionResult:\n    if True:\n        return ActionResult(action_id=\"x\", ok=True, data={})\n    return ActionResult(action_id=\"x\", ok=False, data={\"why\": \"no\"})\n\ndef next_one():\n    pass\n";
        let functions = scan_functions(src);
        assert_eq!(functions[0].return_annotation.as_deref(), Some("ActionResult"));
        assert_eq!(functions[0].returns.len(), 2);
        assert!(functions[0].returns[0].1.contains("ok=True"));
        assert!(functions[1].return_annotation.is_none());
        assert!(functions[1].returns.is_empty());
    }

    #[test]
    fn scan_functions_stops_collecting_returns_at_body_end() {
        let src = "async def first():\n    return 1\n\nasync def second():\n    return 2\n";
        let functions = scan_functions(src);
        assert_eq!(functions[0].returns.len(), 1);
        assert_eq!(functions[0].returns[0].1, "1");
        assert_eq!(functions[1].returns[0].1, "2");
    }

    #[test]
    fn imports_any_prefix_finds_forbidden_modules() {
        let src = "import tkinter\nfrom rich.console import Console\nimport os\n";
        let hits = imports_any_prefix(src, &["tkinter", "rich"]);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn calls_any_finds_print_and_input() {
        let src = "print(\"hi\")\nx = input(\"name: \")\n";
        let hits = calls_any(src, &["print", "input"]);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn env_reads_finds_os_environ_and_getenv() {
        let src = "x = os.environ[\"HOME\"]\ny = os.getenv(\"PATH\")\n";
        assert_eq!(env_reads(src).len(), 2);
    }
}
