//! Integration tests for the interpreter, organized by feature
//!
//! Each test drives the script-visible surface of `Interpreter` directly,
//! one call per script construct. The host side is a small in-memory type
//! registry with the host classes the scenarios need.

mod bridge;
mod for_in;
mod strict;

use std::sync::Arc;

use scriptcore::{
    HostClass, Interpreter, JsError, JsValue, RuntimeConfig, StaticTypeRegistry,
};

fn noop_constructor(
    _interp: &mut Interpreter,
    _this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Undefined)
}

fn hash_map_constructor(
    interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    interp.set(&this, "size", JsValue::Number(0.0))?;
    Ok(JsValue::Undefined)
}

fn return_null(
    _interp: &mut Interpreter,
    _this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Null)
}

/// java.lang.Class.forName goes through the same policy-checked resolution
fn class_for_name(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let name = args.first().cloned().unwrap_or_default().to_js_string();
    Ok(JsValue::Object(interp.resolve_type(name.as_str())?))
}

/// Host classes available to the test scripts
pub fn demo_registry() -> StaticTypeRegistry {
    StaticTypeRegistry::new()
        .with(HostClass::new("java.util.HashMap").with_constructor(hash_map_constructor))
        .with(HostClass::new("java.util.ArrayList").with_constructor(noop_constructor))
        .with(HostClass::new("java.lang.reflect.Method"))
        .with(HostClass::new("java.lang.reflect.Field"))
        .with(HostClass::new("java.lang.reflect.Constructor"))
        .with(HostClass::new("java.lang.Class").with_static("forName", class_for_name, 1))
        .with(HostClass::new("javax.script.ScriptContext"))
        .with(HostClass::new("javax.script.ScriptEngine"))
        .with(HostClass::new("javax.script.SimpleBindings").with_constructor(noop_constructor))
        .with(HostClass::new("sun.misc.Unsafe"))
        .with(
            HostClass::new("jdk.nashorn.test.models.NullProvider")
                .with_static("getBoolean", return_null, 0)
                .with_static("getLong", return_null, 0)
                .with_static("getDouble", return_null, 0)
                .with_static("getInteger", return_null, 0),
        )
}

/// Interpreter with default configuration and the demo registry
pub fn create_test_runtime() -> Interpreter {
    create_runtime_with(RuntimeConfig::default())
}

pub fn create_runtime_with(config: RuntimeConfig) -> Interpreter {
    Interpreter::builder()
        .config(config)
        .registry(Arc::new(demo_registry()))
        .build()
}

/// Interpreter that raises rejected writes and deletes
pub fn create_strict_runtime() -> Interpreter {
    Interpreter::builder()
        .strict(true)
        .registry(Arc::new(demo_registry()))
        .build()
}

/// Call a static method on a global constructor, e.g. `Object.seal(o)`
pub fn call_builtin(
    interp: &mut Interpreter,
    global: &str,
    method: &str,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let target = interp.get_global(global)?;
    interp.call_method(&target, method, args)
}

/// `member` read off a chain of property names starting at a global,
/// e.g. `path(interp, &["Packages", "java", "util"])`
pub fn path(interp: &mut Interpreter, names: &[&str]) -> Result<JsValue, JsError> {
    let Some((first, rest)) = names.split_first() else {
        return Ok(JsValue::Undefined);
    };
    let mut value = interp.get_global(first)?;
    for name in rest {
        value = interp.get(&value, *name)?;
    }
    Ok(value)
}

/// `value instanceof <global>`
#[allow(clippy::unwrap_used)]
pub fn is_instance(interp: &mut Interpreter, value: &JsValue, global: &str) -> bool {
    let ctor = interp.get_global(global).unwrap();
    interp.instance_of(value, &ctor).unwrap()
}

/// Property `key` of `value` as a plain string
#[allow(clippy::unwrap_used)]
pub fn get_string(interp: &mut Interpreter, value: &JsValue, key: &str) -> String {
    interp.get(value, key).unwrap().to_js_string().to_string()
}
