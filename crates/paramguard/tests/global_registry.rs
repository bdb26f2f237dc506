//! Installing a process-wide rule registry at startup.

use paramguard::{RegistryError, RuleContext, RuleRegistry, Session};
use serde_json::json;

#[test]
fn installed_registry_serves_new_sessions() {
    let mut registry = RuleRegistry::with_builtins();
    registry.register("one_of", false, |rule: &mut RuleContext<'_>| {
        let allowed = rule.argument().as_array().cloned().unwrap_or_default();
        if !rule.data().is_some_and(|data| allowed.contains(data)) {
            rule.error(format!("Must be one of {}", rule.argument()));
        }
    });
    registry.install().unwrap();

    let session = Session::new(json!({"color": {"one_of": ["red", "green"]}})).unwrap();
    assert_eq!(
        session.check(&json!({"color": "red"})).unwrap(),
        json!({"color": "red"})
    );

    let report = session.check(&json!({"color": "blue"})).unwrap_err();
    assert_eq!(
        report.entry("color", "one_of").unwrap().message,
        r#"Must be one of ["red","green"]"#
    );

    assert!(matches!(
        RuleRegistry::with_builtins().install(),
        Err(RegistryError::AlreadyInstalled)
    ));
}
