//! Minimal `console` global for samples.

use boa_engine::object::ObjectInitializer;
use boa_engine::property::Attribute;
use boa_engine::{Context, JsResult, JsValue, NativeFunction, js_string};

pub(super) fn install(context: &mut Context) -> JsResult<()> {
    let console = ObjectInitializer::new(context)
        .function(NativeFunction::from_fn_ptr(log), js_string!("log"), 0)
        .function(NativeFunction::from_fn_ptr(log), js_string!("info"), 0)
        .function(NativeFunction::from_fn_ptr(log), js_string!("debug"), 0)
        .function(NativeFunction::from_fn_ptr(error), js_string!("warn"), 0)
        .function(NativeFunction::from_fn_ptr(error), js_string!("error"), 0)
        .build();

    context.register_global_property(
        js_string!("console"),
        console,
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    )
}

fn log(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    println!("{}", render_args(args, context)?);
    Ok(JsValue::undefined())
}

fn error(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    eprintln!("{}", render_args(args, context)?);
    Ok(JsValue::undefined())
}

/// Strings print raw, everything else in its display form, joined by spaces.
fn render_args(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        let part = match arg.as_string() {
            Some(s) => s.to_std_string_escaped(),
            None if arg.is_object() => arg.display().to_string(),
            None => arg.to_string(context)?.to_std_string_escaped(),
        };
        parts.push(part);
    }
    Ok(parts.join(" "))
}
