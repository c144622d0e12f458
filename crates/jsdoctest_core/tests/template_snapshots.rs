//! Snapshot tests for generated wrapper sources

use jsdoctest_core::{AssertLibrary, Config, Options, template};

fn wrapper(selector: &str, code: &str) -> String {
    let config = Config::default().with_assert(selector);
    template(code, &config, &Options::new()).unwrap()
}

#[test]
fn snapshot_node_wrapper() {
    insta::assert_snapshot!("node_wrapper", wrapper("node", "assert.strictEqual(add(1, 2), 3);"));
}

#[test]
fn snapshot_chai_wrapper() {
    insta::assert_snapshot!("chai_wrapper", wrapper("chai", "add(1, 2).should.equal(3);"));
}

#[test]
fn snapshot_expect_js_wrapper() {
    insta::assert_snapshot!("expect_js_wrapper", wrapper("expect.js", "expect(add(1, 2)).to.be(3);"));
}

#[test]
fn every_library_wraps_the_same_body() {
    for lib in AssertLibrary::ALL {
        let source = wrapper(lib.selector(), "body();");
        assert!(source.starts_with("(require) => {\n"), "{lib}: {source}");
        assert!(source.contains(lib.preamble()), "{lib}: {source}");
        assert!(source.contains("    try {\n        body();\n    } catch (error) {\n        return error;\n    }\n"));
    }
}
