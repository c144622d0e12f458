//! Isolated evaluation of wrapper sources.
//!
//! Each call to [`execute`] builds a fresh `boa_engine::Context`. Nothing from the host or from a
//! previous sample is visible in it except a `console` object and the `require` function passed as
//! the wrapper's only argument.

mod console;
pub mod loader;
pub mod resolve;

use std::env;
use std::path::PathBuf;

use boa_engine::error::JsNativeErrorKind;
use boa_engine::{Context, JsError, JsObject, JsString, JsValue, Source, js_string};

use crate::case::Outcome;
use crate::error::{CaseError, SampleError};
use loader::ModuleLoader;

/// Evaluate a wrapper produced by [`template`](crate::template()) and classify its return value.
///
/// `file` is the documented file; relative `require` calls resolve against its directory under
/// `base` (or the working directory when `base` is `None`).
pub fn execute(source: &str, file: &str, base: Option<PathBuf>) -> Result<Outcome, CaseError> {
    let cwd = env::current_dir().unwrap_or_default();
    let dir = resolve::sample_dir(base.as_deref(), &cwd, file);
    let search = search_dirs(&resolve::absolute_base(base.as_deref(), &cwd), &cwd);

    let mut context = Context::default();
    console::install(&mut context).map_err(|err| CaseError::Compile(describe(&err, &mut context)))?;

    let loader = ModuleLoader::new(search, &mut context);
    let require = loader.require_from(dir, &mut context);

    let wrapper = context
        .eval(Source::from_bytes(source))
        .map_err(|err| CaseError::Compile(describe(&err, &mut context)))?;
    let Some(function) = wrapper.as_callable() else {
        return Err(CaseError::Compile("wrapper did not evaluate to a function".to_string()));
    };

    let returned = match function.call(&JsValue::undefined(), &[require.into()], &mut context) {
        Ok(returned) => returned,
        // Engine limits bypass the wrapper's `catch`; they are still the sample's fault
        Err(err) if is_runtime_limit(&err) => return Ok(Outcome::Failure(stack_overflow())),
        Err(err) => return Err(CaseError::Setup(describe(&err, &mut context))),
    };

    Ok(classify(&returned, &mut context))
}

/// Global `node_modules` search path: above the base directory, above the working directory, then
/// every entry of `NODE_PATH`.
fn search_dirs(base: &std::path::Path, cwd: &std::path::Path) -> Vec<PathBuf> {
    let mut dirs = resolve::node_module_dirs(base);
    dirs.extend(resolve::node_module_dirs(cwd));
    if let Some(node_path) = env::var_os("NODE_PATH") {
        dirs.extend(env::split_paths(&node_path).filter(|p| !p.as_os_str().is_empty()));
    }

    let mut seen = std::collections::HashSet::new();
    dirs.retain(|dir| seen.insert(dir.clone()));
    dirs
}

/// A returned Error-kind value is a failure; anything else is a success.
fn classify(value: &JsValue, context: &mut Context) -> Outcome {
    if !is_error(value, context) {
        return Outcome::Success;
    }
    match value.as_object() {
        Some(object) => Outcome::Failure(sample_error(object, context)),
        None => Outcome::Success,
    }
}

/// `value instanceof Error`, evaluated by the sandbox itself.
fn is_error(value: &JsValue, context: &mut Context) -> bool {
    if !value.is_object() {
        return false;
    }
    let Ok(check) = context.eval(Source::from_bytes("(value) => value instanceof Error")) else {
        return false;
    };
    let Some(check) = check.as_callable() else {
        return false;
    };
    check
        .call(&JsValue::undefined(), &[value.clone()], context)
        .is_ok_and(|result| result.to_boolean())
}

fn sample_error(object: &JsObject, context: &mut Context) -> SampleError {
    let name = property(object, js_string!("name"), context).unwrap_or_else(|| "Error".to_string());
    let message = property(object, js_string!("message"), context).unwrap_or_default();
    SampleError::new(name, message)
}

fn property(object: &JsObject, key: JsString, context: &mut Context) -> Option<String> {
    let value = object.get(key, context).ok()?;
    if value.is_undefined() {
        return None;
    }
    value.to_string(context).ok().map(|s| s.to_std_string_escaped())
}

fn is_runtime_limit(err: &JsError) -> bool {
    err.as_native()
        .is_some_and(|native| matches!(native.kind, JsNativeErrorKind::RuntimeLimit))
}

/// What Node reports when a sample recurses without bound.
fn stack_overflow() -> SampleError {
    SampleError::new("RangeError", "Maximum call stack size exceeded")
}

/// Human-readable form of an exception raised outside the wrapper's `try` block.
fn describe(err: &JsError, context: &mut Context) -> String {
    // Runtime limits cannot become JS values
    if is_runtime_limit(err) {
        return stack_overflow().to_string();
    }
    let value = err.to_opaque(context);
    match value.as_object() {
        Some(object) if is_error(&value, context) => sample_error(object, context).to_string(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::options::Options;
    use crate::template::template;

    fn run(code: &str) -> Result<Outcome, CaseError> {
        let source = template(code, &Config::default(), &Options::new())?;
        execute(&source, "sample.js", None)
    }

    #[test]
    fn test_passing_sample_is_success() {
        assert_eq!(run("assert.ok(true);").unwrap(), Outcome::Success);
    }

    #[test]
    fn test_thrown_error_is_captured() {
        let outcome = run("throw new Error('boom');").unwrap();
        assert_eq!(outcome, Outcome::Failure(SampleError::new("Error", "boom")));
    }

    #[test]
    fn test_non_error_throw_is_not_a_failure() {
        assert_eq!(run("throw 'just a string';").unwrap(), Outcome::Success);
    }

    #[test]
    fn test_syntax_error_is_a_compile_error() {
        assert!(matches!(run("let = ;"), Err(CaseError::Compile(_))));
    }

    #[test]
    fn test_samples_do_not_share_state() {
        assert_eq!(run("globalThis.leaked = 1;").unwrap(), Outcome::Success);
        assert_eq!(
            run("assert.strictEqual(typeof leaked, 'undefined');").unwrap(),
            Outcome::Success
        );
    }

    #[test]
    fn test_console_is_available() {
        assert_eq!(run("console.log('hello', 1, { a: 2 });").unwrap(), Outcome::Success);
    }

    #[test]
    fn test_missing_module_throws_inside_sample() {
        let outcome = run("require('definitely-not-installed-anywhere');").unwrap();
        assert_eq!(
            outcome,
            Outcome::Failure(SampleError::new(
                "Error",
                "Cannot find module 'definitely-not-installed-anywhere'"
            ))
        );
    }
}
