//! Integration tests for full jsdoctest runs
//!
//! The fixture project under `tests/fixtures/project` documents passing, skipped and failing
//! samples. Scenarios that need their own files build them in temporary directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsdoctest::config::{self, Overrides};
use jsdoctest::session::{self, Session, SessionError};
use jsdoctest::{ConsoleReporter, Score};
use jsdoctest_core::Config;

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/project")
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn run(root: &Path, config: Config) -> (Result<Score, SessionError>, String, bool) {
    colored::control::set_override(false);
    let entries = session::read_entries(&[root.to_path_buf()], root);
    let mut session = Session::start(Arc::new(config.with_path(root)), ConsoleReporter::with_writer(Vec::new()));
    let result = session.handle(&entries);
    let output = String::from_utf8(session.reporter().get_ref().clone()).unwrap();
    let success = session.complete().success;
    (result, output, success)
}

// ============================================================================
// Fixture project
// ============================================================================

#[test]
fn test_fixture_project_report() {
    let (result, output, success) = run(&fixture_root(), Config::default());

    assert_eq!(
        result.unwrap(),
        Score {
            success: 3,
            failure: 1,
            skipped: 1
        }
    );
    assert!(!success);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "test: Running tests found in documentation",
            "  lib/math.js",
            "    add lib/math.js:7",
            "      #1 - OK",
            "    divide lib/math.js:26",
            "      #1 - OK",
            "      #2 - SKIPPED",
            "  lib/stack.js",
            "    Stack#push lib/stack.js:10",
            "      #1 - AssertionError: size after one push",
            "  lib/util.js",
            "    round lib/util.js:5",
            "      #1 - OK",
            " Failure: 5 tests, 3 success, 1 failures, 1 skipped. ",
        ]
    );
}

#[test]
fn test_fixture_listing_snapshot() {
    let root = fixture_root();
    let entries = session::read_entries(&[root.join("lib")], &root);
    let mut session = Session::start(Arc::new(Config::default()), ConsoleReporter::with_writer(Vec::new()));
    let queue = session.collect(&entries).unwrap();

    let mut out = Vec::new();
    session::write_listing(&queue, &mut out).unwrap();
    insta::assert_snapshot!("fixture_listing", String::from_utf8(out).unwrap());
}

// ============================================================================
// Exit policy
// ============================================================================

#[test]
fn test_exit_on_failure_stops_after_reporting() {
    let (result, output, _) = run(&fixture_root(), Config::default().with_exit_on_failure(true));

    assert!(matches!(result, Err(SessionError::Aborted { failures: 1 })));
    assert!(output.ends_with(" Failure: 5 tests, 3 success, 1 failures, 1 skipped. \n"));
}

#[test]
fn test_exit_with_failure_disabled() {
    let (_, _, success) = run(&fixture_root(), Config::default().with_exit_with_failure(false));
    assert!(success);
}

// ============================================================================
// Configuration and module resolution
// ============================================================================

#[test]
fn test_config_file_selects_assertion_library() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(root, "jsdoctest.toml", "assert = \"chai-expect\"\n");
    write(
        root,
        "node_modules/chai/index.js",
        "exports.expect = (v) => ({ to: { equal(e) { if (v !== e) throw new Error(`expected ${v} to equal ${e}`); } } });",
    );
    write(
        root,
        "src/greet.js",
        "/**\n * ```js\n * const greet = require('./greet');\n * expect(greet('Ada')).to.equal('Hello, Ada!');\n * ```\n */\nmodule.exports = function greet(name) { return `Hello, ${name}!`; };\n",
    );

    let config = config::load(None, root, no_env, Overrides::default()).unwrap();
    assert_eq!(config.assert, "chai-expect");

    let (result, output, success) = run(root, (*config).clone());
    assert_eq!(result.unwrap().success, 1, "{output}");
    assert!(success);
}

#[test]
fn test_per_sample_selector_overrides_config() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(
        root,
        "index.js",
        "/**\n * ```js#assert=nonsense\n * assert.ok(true);\n * ```\n *\n * ```js\n * assert.ok(true);\n * ```\n */\nfunction f() {}\n",
    );

    let (result, output, _) = run(root, Config::default());
    let score = result.unwrap();
    assert_eq!((score.success, score.failure), (1, 1));
    assert!(output.contains("#1 - ERROR: Unknown assertion framework: nonsense"), "{output}");
}

#[test]
fn test_samples_require_relative_to_their_file() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(root, "lib/deep/values.json", "{ \"answer\": 42 }");
    write(
        root,
        "lib/deep/answer.js",
        "/**\n * ```js\n * assert.strictEqual(require('./values.json').answer, 42);\n * assert.strictEqual(require('../deep/answer').answer(), 42);\n * ```\n */\nexports.answer = () => require('./values').answer;\n",
    );

    let (result, output, _) = run(root, Config::default());
    assert_eq!(result.unwrap().success, 1, "{output}");
}

#[test]
fn test_unreadable_files_are_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(root, "ok.js", "/**\n * ```js\n * assert.ok(true);\n * ```\n */\nfunction ok() {}\n");
    fs::write(root.join("binary.js"), [0xff, 0xfe, 0x00]).unwrap();

    let (result, _, success) = run(root, Config::default());
    assert_eq!(result.unwrap().success, 1);
    assert!(success);
}
