//! CommonJS module loading inside a sandbox.
//!
//! Every sandbox owns one [`ModuleLoader`]. It hands out `require` functions bound to a directory,
//! caches evaluated modules by absolute path, and serves the built-in `assert` module from source
//! embedded in this crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use boa_engine::object::builtins::JsFunction;
use boa_engine::object::{FunctionObjectBuilder, ObjectInitializer};
use boa_engine::{Context, JsNativeError, JsObject, JsResult, JsString, JsValue, NativeFunction, Source, js_string};
use boa_gc::{Finalize, Trace};

use super::resolve;

const ASSERT_SOURCE: &str = include_str!("../js/assert.js");

/// Cache key and source of a built-in module.
fn builtin(id: &str) -> Option<(&'static str, &'static str)> {
    match id {
        "assert" | "node:assert" => Some(("node:assert", ASSERT_SOURCE)),
        _ => None,
    }
}

/// Module registry for one sandbox
#[derive(Clone, Trace, Finalize)]
pub struct ModuleLoader {
    /// Module records (`{ id, exports }`) keyed by absolute path or built-in id
    cache: JsObject,
    /// `node_modules` directories searched after those above the requiring directory
    #[unsafe_ignore_trace]
    search: Rc<[PathBuf]>,
}

/// Captures of a `require` function
#[derive(Trace, Finalize)]
struct Require {
    loader: ModuleLoader,
    #[unsafe_ignore_trace]
    dir: PathBuf,
}

impl ModuleLoader {
    pub fn new(search: Vec<PathBuf>, context: &mut Context) -> Self {
        Self {
            cache: ObjectInitializer::new(context).build(),
            search: search.into(),
        }
    }

    /// A `require` function that resolves relative ids against `dir`.
    pub fn require_from(&self, dir: PathBuf, context: &mut Context) -> JsFunction {
        let captures = Require {
            loader: self.clone(),
            dir,
        };
        let native = NativeFunction::from_copy_closure_with_captures(
            |_this: &JsValue, args: &[JsValue], require: &Require, context: &mut Context| {
                let id = match args.first() {
                    Some(id) if !id.is_undefined() => id.to_string(context)?.to_std_string_escaped(),
                    _ => {
                        return Err(JsNativeError::typ()
                            .with_message("The \"id\" argument must be of type string")
                            .into());
                    }
                };
                require.loader.require(&id, &require.dir, context)
            },
            captures,
        );
        FunctionObjectBuilder::new(context.realm(), native).build()
    }

    /// Resolve and load `id` as requested from `dir`.
    pub fn require(&self, id: &str, dir: &Path, context: &mut Context) -> JsResult<JsValue> {
        if let Some((key, source)) = builtin(id) {
            return self.load_source(key, source, None, context);
        }

        let found = if resolve::is_relative(id) {
            resolve::resolve_file(&resolve::join_lexical(dir, Path::new(id)))
        } else {
            let mut search = resolve::node_module_dirs(dir);
            search.extend(self.search.iter().cloned());
            resolve::resolve_bare(id, &search)
        };

        let Some(path) = found else {
            tracing::debug!(id, dir = %dir.display(), "module not found");
            return Err(JsNativeError::error()
                .with_message(format!("Cannot find module '{id}'"))
                .into());
        };

        tracing::debug!(id, path = %path.display(), "loading module");
        self.load_file(&path, context)
    }

    fn load_file(&self, path: &Path, context: &mut Context) -> JsResult<JsValue> {
        let key = path.to_string_lossy();
        if let Some(exports) = self.cached(&key, context)? {
            return Ok(exports);
        }

        let text = fs::read_to_string(path).map_err(|e| {
            JsNativeError::error().with_message(format!("Cannot load module '{}': {e}", path.display()))
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            let json: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| JsNativeError::syntax().with_message(format!("{}: {e}", path.display())))?;
            let exports = JsValue::from_json(&json, context)?;
            self.register(&key, exports.clone(), context)?;
            return Ok(exports);
        }

        self.load_source(&key, &text, Some(path), context)
    }

    /// Evaluate `source` as a CommonJS module and return its `module.exports`.
    fn load_source(&self, key: &str, source: &str, path: Option<&Path>, context: &mut Context) -> JsResult<JsValue> {
        if let Some(exports) = self.cached(key, context)? {
            return Ok(exports);
        }

        let wrapped = format!("(function (exports, require, module, __filename, __dirname) {{\n{source}\n}})");
        let factory = context.eval(Source::from_bytes(&wrapped))?;
        let Some(factory) = factory.as_callable().cloned() else {
            return Err(JsNativeError::typ()
                .with_message(format!("module '{key}' did not evaluate to a function"))
                .into());
        };

        let exports = ObjectInitializer::new(context).build();
        // Registered before evaluation so circular requires see the partial exports.
        let module = self.register(key, exports.clone().into(), context)?;

        let dir = path.and_then(Path::parent).map(Path::to_path_buf).unwrap_or_default();
        let require = self.require_from(dir.clone(), context);
        let args: [JsValue; 5] = [
            exports.clone().into(),
            require.into(),
            module.clone().into(),
            JsString::from(key).into(),
            JsString::from(&*dir.to_string_lossy()).into(),
        ];

        if let Err(err) = factory.call(&exports.into(), &args, context) {
            self.cache.delete_property_or_throw(JsString::from(key), context)?;
            return Err(err);
        }

        module.get(js_string!("exports"), context)
    }

    fn cached(&self, key: &str, context: &mut Context) -> JsResult<Option<JsValue>> {
        let key = JsString::from(key);
        if !self.cache.has_own_property(key.clone(), context)? {
            return Ok(None);
        }
        let record = self.cache.get(key, context)?;
        match record.as_object() {
            Some(record) => Ok(Some(record.get(js_string!("exports"), context)?)),
            None => Ok(None),
        }
    }

    fn register(&self, key: &str, exports: JsValue, context: &mut Context) -> JsResult<JsObject> {
        let module = ObjectInitializer::new(context).build();
        module.set(js_string!("id"), JsString::from(key), true, context)?;
        module.set(js_string!("exports"), exports, true, context)?;
        self.cache.set(JsString::from(key), module.clone(), true, context)?;
        Ok(module)
    }
}
