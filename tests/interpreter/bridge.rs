//! Tests for host type access: `Java`, `Packages`, importPackage and the
//! security policy

use std::sync::Arc;

use super::{
    call_builtin, create_runtime_with, create_test_runtime, demo_registry, get_string,
    is_instance, path,
};
use scriptcore::bridge::Access;
use scriptcore::{
    Interpreter, JsError, JsValue, PolicyRule, RuntimeConfig, SecurityPolicy,
};

fn import_package(interp: &mut Interpreter, packages: &[JsValue]) -> Result<JsValue, JsError> {
    let import = interp.get_global("importPackage")?;
    interp.call(&import, JsValue::Undefined, packages)
}

fn java_type(interp: &mut Interpreter, name: &str) -> Result<JsValue, JsError> {
    call_builtin(interp, "Java", "type", &[JsValue::from(name)])
}

fn is_type(interp: &mut Interpreter, value: &JsValue) -> bool {
    call_builtin(interp, "Java", "isType", std::slice::from_ref(value))
        .unwrap()
        .to_boolean()
}

/// Run `f` and return the value a script `catch (e)` would see
fn caught<T: std::fmt::Debug>(
    interp: &mut Interpreter,
    f: impl FnOnce(&mut Interpreter) -> Result<T, JsError>,
) -> JsValue {
    let result = f(interp);
    interp.catch(result).unwrap_err()
}

// ═══════════════════════════════════════════════════════════════
// importPackage
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_import_package_makes_types_visible() {
    let mut interp = create_test_runtime();
    let java_util = path(&mut interp, &["java", "util"]).unwrap();
    import_package(&mut interp, &[java_util]).unwrap();

    let hash_map = interp.get_global("HashMap").unwrap();
    let instance = interp.construct(&hash_map, &[]).unwrap();
    let qualified = path(&mut interp, &["java", "util", "HashMap"]).unwrap();
    assert!(interp.instance_of(&instance, &qualified).unwrap());
    assert_eq!(interp.get(&instance, "size").unwrap(), JsValue::from(0));

    let array_list = interp.get_global("ArrayList").unwrap();
    assert!(is_type(&mut interp, &array_list));
    assert!(!interp.instance_of(&instance, &array_list).unwrap());
}

#[test]
fn test_import_several_packages() {
    let mut interp = create_test_runtime();
    let reflect = path(&mut interp, &["java", "lang", "reflect"]).unwrap();
    let script = path(&mut interp, &["javax", "script"]).unwrap();
    import_package(&mut interp, &[reflect, script]).unwrap();

    for name in [
        "Method",
        "Field",
        "Constructor",
        "ScriptContext",
        "ScriptEngine",
    ] {
        let value = interp.get_global(name).unwrap();
        assert!(is_type(&mut interp, &value), "{} is not a type", name);
    }

    let bindings_type = interp.get_global("SimpleBindings").unwrap();
    let bindings = interp.construct(&bindings_type, &[]).unwrap();
    assert!(interp.instance_of(&bindings, &bindings_type).unwrap());
    assert_eq!(
        interp.imported_packages(),
        &["java.lang.reflect", "javax.script"]
    );
}

#[test]
fn test_import_package_accepts_strings_and_ignores_duplicates() {
    let mut interp = create_test_runtime();
    import_package(&mut interp, &[JsValue::from("java.util")]).unwrap();
    import_package(&mut interp, &[JsValue::from("java.util")]).unwrap();
    assert_eq!(interp.imported_packages().len(), 1);

    let err = import_package(&mut interp, &[JsValue::from(1)]).unwrap_err();
    assert!(matches!(err, JsError::TypeError { .. }));
    let err = import_package(&mut interp, &[JsValue::from("java..util")]).unwrap_err();
    assert!(matches!(err, JsError::TypeError { .. }));
}

#[test]
fn test_unresolved_global_is_reference_error() {
    let mut interp = create_test_runtime();
    import_package(&mut interp, &[JsValue::from("java.util")]).unwrap();
    let err = interp.get_global("NoSuchThing").unwrap_err();
    assert!(matches!(err, JsError::ReferenceError { .. }));
}

#[test]
fn test_import_class_binds_simple_name() {
    let mut interp = create_test_runtime();
    let hash_map = path(&mut interp, &["java", "util", "HashMap"]).unwrap();
    let import = interp.get_global("importClass").unwrap();
    interp
        .call(&import, JsValue::Undefined, std::slice::from_ref(&hash_map))
        .unwrap();
    assert_eq!(interp.get_global("HashMap").unwrap(), hash_map);

    let err = interp
        .call(&import, JsValue::Undefined, &[JsValue::from("java.util.HashMap")])
        .unwrap_err();
    assert!(matches!(err, JsError::TypeError { .. }));
}

// ═══════════════════════════════════════════════════════════════
// Sensitive types
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_class_for_name_of_unsafe_is_security_error() {
    let mut interp = create_test_runtime();
    let class = path(&mut interp, &["java", "lang", "Class"]).unwrap();
    let e = caught(&mut interp, |interp| {
        interp.call_method(&class, "forName", &[JsValue::from("sun.misc.Unsafe")])
    });
    assert!(is_instance(&mut interp, &e, "SecurityError"));
    assert_eq!(get_string(&mut interp, &e, "typeName"), "sun.misc.Unsafe");
}

#[test]
fn test_java_type_of_unsafe_is_security_error() {
    let mut interp = create_test_runtime();
    let e = caught(&mut interp, |interp| java_type(interp, "sun.misc.Unsafe"));
    assert!(is_instance(&mut interp, &e, "SecurityError"));
    assert!(is_instance(&mut interp, &e, "Error"));
    assert_eq!(get_string(&mut interp, &e, "name"), "SecurityError");
}

#[test]
fn test_packages_unsafe_is_security_error() {
    let mut interp = create_test_runtime();
    let e = caught(&mut interp, |interp| {
        path(interp, &["Packages", "sun", "misc", "Unsafe"])
    });
    assert!(is_instance(&mut interp, &e, "SecurityError"));

    // The enclosing package itself is reachable
    let misc = path(&mut interp, &["Packages", "sun", "misc"]).unwrap();
    assert!(misc.is_object());
    assert!(!is_type(&mut interp, &misc));
}

#[test]
fn test_internal_packages_are_security_errors() {
    let mut interp = create_test_runtime();
    let e = caught(&mut interp, |interp| {
        path(
            interp,
            &["Packages", "jdk", "nashorn", "internal", "runtime", "Context"],
        )
    });
    assert!(is_instance(&mut interp, &e, "SecurityError"));
    assert_eq!(get_string(&mut interp, &e, "typeName"), "jdk.nashorn.internal");
}

#[test]
fn test_imported_unsafe_is_security_error() {
    let mut interp = create_test_runtime();
    let misc = path(&mut interp, &["Packages", "sun", "misc"]).unwrap();
    import_package(&mut interp, &[misc]).unwrap();
    let e = caught(&mut interp, |interp| interp.get_global("Unsafe"));
    assert!(is_instance(&mut interp, &e, "SecurityError"));
}

#[test]
fn test_configured_root_alias() {
    let config = RuntimeConfig {
        package_roots: vec!["java".to_string(), "sun".to_string()],
        ..RuntimeConfig::default()
    };
    let mut interp = create_runtime_with(config);
    let e = caught(&mut interp, |interp| path(interp, &["sun", "misc", "Unsafe"]));
    assert!(is_instance(&mut interp, &e, "SecurityError"));

    // Roots not listed are not installed
    let err = interp.get_global("javax").unwrap_err();
    assert!(matches!(err, JsError::ReferenceError { .. }));
}

#[test]
fn test_sensitive_protection_off_needs_exact_allow() {
    let mut interp = create_test_runtime();
    interp.policy().set_sensitive_protection(false);
    assert!(java_type(&mut interp, "sun.misc.Unsafe")
        .unwrap_err()
        .is_access_denied());

    interp.policy().add_rule(PolicyRule::allow("sun.misc.*"));
    assert!(java_type(&mut interp, "sun.misc.Unsafe")
        .unwrap_err()
        .is_access_denied());

    interp.policy().add_rule(PolicyRule::allow("sun.misc.Unsafe"));
    let unsafe_type = java_type(&mut interp, "sun.misc.Unsafe").unwrap();
    assert!(is_type(&mut interp, &unsafe_type));
}

// ═══════════════════════════════════════════════════════════════
// Java.type, Java.isType, Java.typeName
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_type_name_of_resolved_type() {
    let mut interp = create_test_runtime();
    let hash_map = java_type(&mut interp, "java.util.HashMap").unwrap();
    let name = call_builtin(&mut interp, "Java", "typeName", &[hash_map]).unwrap();
    assert_eq!(name, JsValue::from("java.util.HashMap"));

    let plain = JsValue::Object(interp.create_object());
    let name = call_builtin(&mut interp, "Java", "typeName", &[plain]).unwrap();
    assert_eq!(name, JsValue::Undefined);
}

#[test]
fn test_type_object_is_unique_and_frozen() {
    let mut interp = create_test_runtime();
    let first = java_type(&mut interp, "java.util.HashMap").unwrap();
    let second = java_type(&mut interp, "java.util.HashMap").unwrap();
    let through_packages = path(&mut interp, &["Packages", "java", "util", "HashMap"]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, through_packages);

    let frozen = call_builtin(&mut interp, "Object", "isFrozen", &[first.clone()]).unwrap();
    assert_eq!(frozen, JsValue::Boolean(true));
    assert!(!interp.set(&first, "extra", JsValue::from(1)).unwrap());
}

#[test]
fn test_java_type_requires_string() {
    let mut interp = create_test_runtime();
    let e = caught(&mut interp, |interp| {
        call_builtin(interp, "Java", "type", &[JsValue::from(42)])
    });
    assert!(is_instance(&mut interp, &e, "TypeError"));
}

#[test]
fn test_missing_type_is_class_not_found() {
    let mut interp = create_test_runtime();
    let err = java_type(&mut interp, "com.example.Missing").unwrap_err();
    assert!(err.is_not_found());

    let e = interp.error_to_value(&err);
    assert!(is_instance(&mut interp, &e, "ClassNotFoundError"));
    assert_eq!(get_string(&mut interp, &e, "typeName"), "com.example.Missing");
}

#[test]
fn test_unknown_member_is_package() {
    let mut interp = create_test_runtime();
    let value = path(&mut interp, &["java", "util", "NoSuchType"]).unwrap();
    assert!(value.is_object());
    assert!(!is_type(&mut interp, &value));

    let deeper = interp.get(&value, "Deeper").unwrap();
    assert!(deeper.is_object());

    // Non-identifier keys are not package members
    assert_eq!(interp.get(&value, 0u32).unwrap(), JsValue::Undefined);
    assert_eq!(interp.get(&value, "a-b").unwrap(), JsValue::Undefined);
}

#[test]
fn test_assignment_to_package_member_does_not_stick() {
    let mut interp = create_test_runtime();
    let java_util = path(&mut interp, &["java", "util"]).unwrap();

    assert!(!interp.set(&java_util, "HashMap", JsValue::from(1)).unwrap());
    assert!(!interp.set(&java_util, "Fresh", JsValue::from(2)).unwrap());
    let hash_map = interp.get(&java_util, "HashMap").unwrap();
    assert!(is_type(&mut interp, &hash_map));
    let fresh = interp.get(&java_util, "Fresh").unwrap();
    assert!(!is_type(&mut interp, &fresh));
    assert_ne!(fresh, JsValue::from(2));

    interp.set_strict(true);
    let e = caught(&mut interp, |interp| {
        interp.set(&java_util, "HashMap", JsValue::from(1))
    });
    assert!(is_instance(&mut interp, &e, "TypeError"));
    let hash_map = interp.get(&java_util, "HashMap").unwrap();
    assert!(is_type(&mut interp, &hash_map));
}

#[test]
fn test_constructing_type_without_constructor() {
    let mut interp = create_test_runtime();
    let method = java_type(&mut interp, "java.lang.reflect.Method").unwrap();
    let e = caught(&mut interp, |interp| interp.construct(&method, &[]));
    assert!(is_instance(&mut interp, &e, "TypeError"));
}

#[test]
fn test_null_returning_statics() {
    let mut interp = create_test_runtime();
    let provider = path(
        &mut interp,
        &["Packages", "jdk", "nashorn", "test", "models", "NullProvider"],
    )
    .unwrap();

    for method in ["getBoolean", "getLong", "getDouble", "getInteger"] {
        let value = interp.call_method(&provider, method, &[]).unwrap();
        assert_eq!(value, JsValue::Null, "{}", method);
        assert_eq!(value.to_number(), 0.0);
        assert!(!value.to_boolean());
    }
}

// ═══════════════════════════════════════════════════════════════
// Policy
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_policy_updates_apply_to_cached_types() {
    let mut interp = create_test_runtime();
    java_type(&mut interp, "java.util.HashMap").unwrap();
    assert_eq!(interp.bridge().cached_types(), 1);

    interp.policy().add_rule(PolicyRule::deny("java.util.*"));
    let err = java_type(&mut interp, "java.util.HashMap").unwrap_err();
    assert!(err.is_access_denied());
    let e = caught(&mut interp, |interp| path(interp, &["java", "util", "HashMap"]));
    assert!(is_instance(&mut interp, &e, "SecurityError"));

    // An exact rule outranks the prefix rule
    interp
        .policy()
        .add_rule(PolicyRule::allow("java.util.HashMap"));
    assert!(java_type(&mut interp, "java.util.HashMap").is_ok());
    assert!(java_type(&mut interp, "java.util.ArrayList")
        .unwrap_err()
        .is_access_denied());
}

#[test]
fn test_default_deny_policy() {
    let policy = SecurityPolicy::deny_all();
    policy.add_rule(PolicyRule::allow("java.util.*"));
    let mut interp = Interpreter::builder()
        .policy(policy)
        .registry(Arc::new(demo_registry()))
        .build();

    let hash_map = path(&mut interp, &["java", "util", "HashMap"]).unwrap();
    assert!(is_type(&mut interp, &hash_map));

    // Unregistered names without a rule stay usable as packages
    let lang = path(&mut interp, &["java", "lang"]).unwrap();
    assert!(!is_type(&mut interp, &lang));
    let unknown = path(&mut interp, &["java", "lang", "NoSuchType"]).unwrap();
    assert!(!is_type(&mut interp, &unknown));

    // A registered type denied by default reports the denial on every route
    let e = caught(&mut interp, |interp| path(interp, &["java", "lang", "Class"]));
    assert!(is_instance(&mut interp, &e, "SecurityError"));
    assert_eq!(get_string(&mut interp, &e, "typeName"), "java.lang.Class");
    let e = caught(&mut interp, |interp| {
        path(interp, &["Packages", "java", "lang", "Class"])
    });
    assert!(is_instance(&mut interp, &e, "SecurityError"));
    let e = caught(&mut interp, |interp| java_type(interp, "java.lang.Class"));
    assert!(is_instance(&mut interp, &e, "SecurityError"));

    interp.policy().set_default_access(Access::Allow);
    let class = java_type(&mut interp, "java.lang.Class").unwrap();
    assert!(is_type(&mut interp, &class));
}
