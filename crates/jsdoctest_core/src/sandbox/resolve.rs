//! Module path resolution.
//!
//! Paths are joined lexically, the way a JavaScript host's `path.join` does: absolute components in
//! the joined parts do not reset the result, and `.`/`..` are collapsed without touching the
//! filesystem. Only the final file probing (`resolve_file`) looks at the disk.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

/// Extensions tried, in order, after the exact path.
const EXTENSIONS: [&str; 3] = ["js", "cjs", "json"];

/// Files tried, in order, inside a directory without a usable `main`.
const INDEX_FILES: [&str; 2] = ["index.js", "index.json"];

/// Whether `id` is resolved against the documented file rather than globally.
pub fn is_relative(id: &str) -> bool {
    id.starts_with('.')
}

/// Collapse `.` and `..` components without consulting the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    _ => false,
                };
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Append `part` to `base` lexically; roots and prefixes inside `part` are ignored.
pub fn join_lexical(base: &Path, part: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in part.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => joined.push(other.as_os_str()),
        }
    }
    normalize(&joined)
}

/// Make `base` absolute against `cwd`; a missing base means `cwd` itself.
pub fn absolute_base(base: Option<&Path>, cwd: &Path) -> PathBuf {
    match base {
        Some(base) if base.is_absolute() => normalize(base),
        Some(base) => normalize(&cwd.join(base)),
        None => normalize(cwd),
    }
}

/// Directory that relative `require` calls in a sample start from:
/// `resolve(base)` joined with the directory part of the documented `file`.
pub fn sample_dir(base: Option<&Path>, cwd: &Path, file: &str) -> PathBuf {
    let root = absolute_base(base, cwd);
    match Path::new(file).parent() {
        Some(dir) => join_lexical(&root, dir),
        None => root,
    }
}

/// `node_modules` directories visible from `start`, nearest first.
pub fn node_module_dirs(start: &Path) -> Vec<PathBuf> {
    start
        .ancestors()
        .filter(|dir| dir.file_name().is_none_or(|name| name != "node_modules"))
        .map(|dir| dir.join("node_modules"))
        .collect()
}

/// Probe the filesystem for the file a module path refers to.
pub fn resolve_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    if let Some(found) = probe_extensions(path) {
        return Some(found);
    }

    if path.is_dir() {
        return resolve_directory(path);
    }

    None
}

/// Resolve a bare module id against the given `node_modules` directories.
pub fn resolve_bare(id: &str, search: &[PathBuf]) -> Option<PathBuf> {
    search.iter().find_map(|dir| resolve_file(&join_lexical(dir, Path::new(id))))
}

/// `path` with each known extension appended (`helper` → `helper.js`, ...).
fn probe_extensions(path: &Path) -> Option<PathBuf> {
    EXTENSIONS.iter().find_map(|ext| {
        let mut candidate = path.as_os_str().to_owned();
        candidate.push(".");
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        candidate.is_file().then_some(candidate)
    })
}

#[derive(Deserialize)]
struct Manifest {
    main: Option<String>,
}

fn resolve_directory(dir: &Path) -> Option<PathBuf> {
    let main = fs::read_to_string(dir.join("package.json"))
        .ok()
        .and_then(|text| serde_json::from_str::<Manifest>(&text).ok())
        .and_then(|manifest| manifest.main)
        .filter(|main| !main.is_empty());

    if let Some(main) = main {
        let target = join_lexical(dir, Path::new(&main));
        if target.is_file() {
            return Some(target);
        }
        if let Some(found) = probe_extensions(&target) {
            return Some(found);
        }
        if let Some(found) = INDEX_FILES.iter().map(|f| target.join(f)).find(|p| p.is_file()) {
            return Some(found);
        }
    }

    INDEX_FILES.iter().map(|f| dir.join(f)).find(|p| p.is_file())
}
