//! Code fence extraction.
//!
//! Turns the description of a [`DocEntry`] into [`Sample`]s: one per fenced block whose info string
//! names JavaScript. The info string may carry `#key=value` options after the language word
//! (`js#skip`, `js#assert=chai#path=./lib`).

use std::sync::{Arc, LazyLock};

use jsdoctest_core::{CaseError, Config, Options, TestCase};
use regex::Regex;

use crate::doc::{DocEntry, DocLine};

/// Language word and option annotation of a fence info string.
static INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)(#.*)?").expect("INVARIANT: static pattern compiles"));

/// Info-string languages that are run as samples (compared case-insensitively).
const LANGUAGES: [&str; 2] = ["js", "javascript"];

/// A runnable code block found in documentation
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub file: String,
    pub item: String,
    /// 1-based source line of the first code line
    pub line: u32,
    pub code: String,
    pub options: Options,
}

impl Sample {
    /// Freeze this sample into a test case sharing the run's configuration.
    pub fn into_test(self, config: Arc<Config>) -> Result<TestCase, CaseError> {
        TestCase::builder(self.file, self.item, self.line, self.code)
            .config(config)
            .options(self.options)
            .build()
    }
}

/// An open fence while scanning
struct Fence {
    marker: char,
    len: usize,
    indent: usize,
    /// `Some` when the block is a JavaScript sample
    options: Option<Options>,
    opened_at: u32,
    code: Vec<DocLine>,
}

/// Extract every JavaScript sample from `entry`, in order of appearance.
pub fn extract_samples(entry: &DocEntry) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut open: Option<Fence> = None;

    for line in &entry.description {
        match open.take() {
            None => open = opening_fence(line),
            Some(fence) if closes(&fence, &line.text) => samples.extend(finish(entry, fence)),
            Some(mut fence) => {
                fence.code.push(DocLine {
                    number: line.number,
                    text: strip_indent(&line.text, fence.indent).to_string(),
                });
                open = Some(fence);
            }
        }
    }

    // An unterminated fence runs to the end of the description
    if let Some(fence) = open {
        samples.extend(finish(entry, fence));
    }

    samples
}

fn opening_fence(line: &DocLine) -> Option<Fence> {
    let indent = line.text.len() - line.text.trim_start_matches(' ').len();
    let rest = &line.text[indent..];
    let marker = rest.chars().next().filter(|&c| c == '`' || c == '~')?;
    let len = rest.chars().take_while(|&c| c == marker).count();
    if len < 3 {
        return None;
    }

    let info = rest[len..].trim();
    let options = INFO.captures(info).and_then(|caps| {
        let language = caps[1].to_lowercase();
        LANGUAGES
            .contains(&language.as_str())
            .then(|| Options::parse(caps.get(2).map_or("", |m| m.as_str())))
    });

    Some(Fence {
        marker,
        len,
        indent,
        options,
        opened_at: line.number,
        code: Vec::new(),
    })
}

fn closes(fence: &Fence, text: &str) -> bool {
    let trimmed = text.trim();
    let len = trimmed.chars().take_while(|&c| c == fence.marker).count();
    len >= fence.len && trimmed.chars().all(|c| c == fence.marker)
}

/// Remove up to `indent` leading spaces, the indentation of the opening fence.
fn strip_indent(text: &str, indent: usize) -> &str {
    let spaces = text.len() - text.trim_start_matches(' ').len();
    &text[spaces.min(indent)..]
}

fn finish(entry: &DocEntry, fence: Fence) -> Option<Sample> {
    let options = fence.options?;
    let line = fence.code.first().map_or(fence.opened_at + 1, |l| l.number);
    let code = fence
        .code
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    tracing::debug!(file = %entry.file, item = %entry.item, line, "found sample");
    Some(Sample {
        file: entry.file.clone(),
        item: entry.item.clone(),
        line,
        code,
        options,
    })
}
