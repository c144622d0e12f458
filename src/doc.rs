//! Documentation comment scanning.
//!
//! Finds `/** ... */` blocks in JavaScript source and turns each one into a [`DocEntry`]: the
//! documented entity's name plus the comment lines that may hold code samples (the free-form
//! description and the bodies of `@example` tags). Every kept line remembers its absolute line
//! number in the source file so samples can be reported where they are written.
//!
//! ## Notes
//!
//! - Scanning is line based. Braces are counted to know when a class body ends; braces inside
//!   strings or template literals can confuse that count, which only affects `Class#member` naming.
//! - Fenced blocks are tracked while splitting tags, so an `@` line inside a fence never ends the
//!   description.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Item name used when the code after a comment does not declare anything recognizable.
pub const ANONYMOUS: &str = "<anonymous>";

/// Source file extensions scanned by [`discover_files`].
pub const SOURCE_EXTENSIONS: [&str; 4] = ["js", "cjs", "mjs", "jsx"];

// ============================================================================
// Entries
// ============================================================================

/// One line kept from a documentation comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLine {
    /// 1-based line number in the source file
    pub number: u32,
    /// Comment text with the leading ` * ` decoration removed
    pub text: String,
}

/// A documented entity and the parts of its comment that can hold samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocEntry {
    pub file: String,
    pub item: String,
    /// 1-based line of the comment's opening `/**`
    pub line: u32,
    pub description: Vec<DocLine>,
}

// ============================================================================
// Discovery
// ============================================================================

/// Collect JavaScript source files under `path`.
///
/// A file path is returned as-is. Directories are walked recursively, skipping hidden directories,
/// `node_modules` and `target`. The result is sorted.
pub fn discover_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if path.is_file() {
        files.push(path.to_path_buf());
    } else if path.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                let entry_path = entry.path();
                let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if entry_path.is_dir() {
                    if !name.starts_with('.') && name != "target" && name != "node_modules" {
                        files.extend(discover_files(&entry_path));
                    }
                } else if is_source_file(&entry_path) {
                    files.push(entry_path);
                }
            }
        }
    }

    files.sort();
    files
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

// ============================================================================
// Scanning
// ============================================================================

static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)").expect("INVARIANT: static pattern compiles")
});
static CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^class\s+([A-Za-z_$][\w$]*)").expect("INVARIANT: static pattern compiles"));
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=").expect("INVARIANT: static pattern compiles")
});
static EXPORTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=").expect("INVARIANT: static pattern compiles")
});
static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(static\s+)?(?:async\s+)?(?:(?:get|set)\s+)?\*?\s*([A-Za-z_$#][\w$]*)\s*\(")
        .expect("INVARIANT: static pattern compiles")
});

/// Words that look like method heads (`if (`) but are statements.
const KEYWORDS: [&str; 8] = ["if", "for", "while", "switch", "catch", "return", "function", "with"];

/// A class whose body is being scanned
struct OpenClass {
    name: String,
    /// Brace depth before the class body opened
    depth: i32,
    opened: bool,
}

/// Find every documentation comment in `source` and name what it documents.
pub fn scan_source(file: &str, source: &str) -> Vec<DocEntry> {
    let lines: Vec<&str> = source.lines().collect();
    let mut entries = Vec::new();
    let mut classes: Vec<OpenClass> = Vec::new();
    let mut depth = 0i32;
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim_start();

        if trimmed.starts_with("/*") {
            let start = i;
            while i < lines.len() && !closes_comment(lines[i], i == start) {
                i += 1;
            }
            let end = i.min(lines.len().saturating_sub(1));

            if is_doc_comment(trimmed) {
                let body = comment_body(&lines[start..=end], start);
                let item = next_code_line(&lines, end + 1)
                    .map(|code| entity_name(code, classes.last()))
                    .unwrap_or_else(|| ANONYMOUS.to_string());
                entries.push(DocEntry {
                    file: file.to_string(),
                    item,
                    line: line_number(start),
                    description: description_lines(body),
                });
            }
            i = end + 1;
            continue;
        }

        if !trimmed.starts_with("//") {
            let code = strip_prefixes(trimmed);
            let line_braces = braces(lines[i]);
            // `class A {}` on one line never has members to name
            let one_line_body = lines[i].contains('{') && line_braces <= 0;
            if let Some(caps) = CLASS.captures(code).filter(|_| !one_line_body) {
                classes.push(OpenClass {
                    name: caps[1].to_string(),
                    depth,
                    opened: false,
                });
            }
            depth += line_braces;
            while let Some(top) = classes.last_mut() {
                if depth > top.depth {
                    top.opened = true;
                    break;
                }
                if top.opened {
                    classes.pop();
                } else {
                    break;
                }
            }
        }
        i += 1;
    }

    entries
}

fn line_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// `/**` but not `/***` separators or the empty `/**/`.
fn is_doc_comment(trimmed: &str) -> bool {
    trimmed.starts_with("/**") && !trimmed.starts_with("/***") && !trimmed.starts_with("/**/")
}

fn closes_comment(line: &str, first: bool) -> bool {
    if first {
        let trimmed = line.trim_start();
        trimmed.get(2..).is_some_and(|rest| rest.contains("*/"))
    } else {
        line.contains("*/")
    }
}

/// Comment lines with delimiters and leading `*` decoration removed, paired with their index.
fn comment_body(lines: &[&str], start: usize) -> Vec<DocLine> {
    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .filter_map(|(offset, raw)| {
            let mut text = *raw;
            if offset == 0 {
                text = text.trim_start();
                text = text.strip_prefix("/**").unwrap_or(text);
            }
            if offset == last {
                if let Some(pos) = text.find("*/") {
                    text = &text[..pos];
                }
            }
            let text = strip_decoration(text, offset == 0);
            if (offset == 0 || offset == last) && text.trim().is_empty() {
                return None;
            }
            Some(DocLine {
                number: line_number(start + offset),
                text: text.trim_end().to_string(),
            })
        })
        .collect()
}

fn strip_decoration(text: &str, first: bool) -> &str {
    if first {
        return text.strip_prefix(' ').unwrap_or(text);
    }
    let trimmed = text.trim_start();
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => text,
    }
}

/// Keep the description before the first tag and the bodies of `@example` tags.
fn description_lines(body: Vec<DocLine>) -> Vec<DocLine> {
    let mut kept = Vec::new();
    let mut keeping = true;
    let mut fence: Option<String> = None;

    for mut line in body {
        let trimmed = line.text.trim_start();

        if fence.is_none() && trimmed.starts_with('@') {
            let tag_end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            keeping = &trimmed[..tag_end] == "@example";
            if keeping {
                let rest = trimmed[tag_end..].trim_start().to_string();
                if rest.is_empty() {
                    continue;
                }
                line.text = rest;
            } else {
                continue;
            }
        }

        fence = update_fence(fence, line.text.trim_start());
        if keeping {
            kept.push(line);
        }
    }

    kept
}

/// Track whether a fenced block is open after `line`.
fn update_fence(open: Option<String>, line: &str) -> Option<String> {
    let marker: String = line.chars().take_while(|&c| c == '`' || c == '~').collect();
    let uniform = marker.chars().all(|c| Some(c) == marker.chars().next());
    match open {
        None if marker.len() >= 3 && uniform => Some(marker),
        Some(opening) if uniform && marker.starts_with(&opening) && line[marker.len()..].trim().is_empty() => None,
        other => other,
    }
}

fn next_code_line<'a>(lines: &[&'a str], from: usize) -> Option<&'a str> {
    lines.get(from..)?.iter().copied().map(str::trim).find(|l| !l.is_empty())
}

fn strip_prefixes(code: &str) -> &str {
    let code = code.strip_prefix("export ").map(str::trim_start).unwrap_or(code);
    code.strip_prefix("default ").map(str::trim_start).unwrap_or(code)
}

/// Name the entity declared by `code`, qualifying class members with the enclosing class.
fn entity_name(code: &str, class: Option<&OpenClass>) -> String {
    let code = strip_prefixes(code);

    for pattern in [&FUNCTION, &CLASS, &VARIABLE, &EXPORTS] {
        if let Some(caps) = pattern.captures(code) {
            return caps[1].to_string();
        }
    }

    if let Some(class) = class.filter(|c| c.opened) {
        if let Some(caps) = METHOD.captures(code) {
            let name = &caps[2];
            if !KEYWORDS.contains(&name) {
                let separator = if caps.get(1).is_some() { '.' } else { '#' };
                return format!("{}{separator}{name}", class.name);
            }
        }
    }

    ANONYMOUS.to_string()
}

fn braces(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

// ============================================================================
// Tests
// ============================================================================
