// Tests for override and implementation contracts
use tenet_core::error::ContractError;
use tenet_core::types::MethodMode;
use tenet_enforce::ContractRuntime;

use crate::common::{abstract_class, define};

#[test]
/// `override` with nothing above it fails.
fn test_override_without_ancestor() {
    let rt = ContractRuntime::new();
    let c = rt.define_class("Lonely", None).unwrap();
    let err = define(&rt, c, "foo", Some(MethodMode::Override)).unwrap_err();
    assert!(matches!(err, ContractError::OverrideViolation { .. }));
    assert_eq!(
        err.to_string(),
        "`Lonely#foo` used `override` but no ancestor method found"
    );
}

#[test]
/// An ancestor definition without a contract mode doesn't count.
fn test_override_of_untyped_ancestor() {
    let rt = ContractRuntime::new();
    let parent = rt.define_class("Parent", None).unwrap();
    define(&rt, parent, "foo", Some(MethodMode::None)).unwrap();
    let child = rt.define_class("Child", Some(parent)).unwrap();
    let err = define(&rt, child, "foo", Some(MethodMode::Override)).unwrap_err();
    assert_eq!(err.code(), "T006");
}

#[test]
/// Overriding an overridable implementation, or another override, is fine.
fn test_override_chain() {
    let rt = ContractRuntime::new();
    let base = rt.define_class("Base", None).unwrap();
    define(&rt, base, "render", Some(MethodMode::OverridableImplementation)).unwrap();
    let mid = rt.define_class("Mid", Some(base)).unwrap();
    define(&rt, mid, "render", Some(MethodMode::Override)).unwrap();
    let leaf = rt.define_class("Leaf", Some(mid)).unwrap();
    define(&rt, leaf, "render", Some(MethodMode::Override)).unwrap();

    let contract = rt.method_contract(leaf, "render", false).unwrap();
    assert_eq!(contract.mode, MethodMode::Override);
    assert_eq!(contract.declared_at, leaf);
}

#[test]
/// Abstract methods are implemented, not overridden.
fn test_abstract_cannot_be_overridden() {
    // GIVEN abstract Base#run
    let rt = ContractRuntime::new();
    let base = abstract_class(&rt, "Base", None, &["run"]);

    // WHEN Child uses `override` on it directly
    let child = rt.define_class("Child", Some(base)).unwrap();
    let err = define(&rt, child, "run", Some(MethodMode::Override)).unwrap_err();

    // THEN it is an override violation
    assert!(matches!(err, ContractError::OverrideViolation { .. }));
    assert!(err.to_string().contains("Base#run"));

    // AND implementing it works
    define(&rt, child, "run", Some(MethodMode::Implementation)).unwrap();
}

#[test]
/// Once an implementation exists in the chain, the re-abstracted method may be overridden.
fn test_override_after_implementation_in_chain() {
    let rt = ContractRuntime::new();
    let base = rt.define_class("Base", None).unwrap();
    define(&rt, base, "run", Some(MethodMode::Implementation)).unwrap();
    let mid = abstract_class(&rt, "Mid", Some(base), &["run"]);
    let leaf = rt.define_class("Leaf", Some(mid)).unwrap();
    define(&rt, leaf, "run", Some(MethodMode::Override)).unwrap();
    rt.instantiate(leaf).unwrap();
}

#[test]
/// Override looks through included modules too.
fn test_override_of_module_method() {
    let rt = ContractRuntime::new();
    let m = rt.define_module("Greeter").unwrap();
    define(&rt, m, "greet", Some(MethodMode::OverridableImplementation)).unwrap();
    let mut body = rt.class("Person", None).unwrap();
    body.include(m).unwrap();
    let person = body.close().unwrap();
    define(&rt, person, "greet", Some(MethodMode::Override)).unwrap();
}

#[test]
/// An untyped redefinition in between does not hide an overridable ancestor.
fn test_override_past_untyped_intermediate() {
    // GIVEN Base#render overridable and Mid#render redefined with mode None
    let rt = ContractRuntime::new();
    let base = rt.define_class("Base", None).unwrap();
    define(&rt, base, "render", Some(MethodMode::OverridableImplementation)).unwrap();
    let mid = rt.define_class("Mid", Some(base)).unwrap();
    define(&rt, mid, "render", Some(MethodMode::None)).unwrap();

    // WHEN Leaf overrides render
    let leaf = rt.define_class("Leaf", Some(mid)).unwrap();
    define(&rt, leaf, "render", Some(MethodMode::Override)).unwrap();

    // THEN the override is recorded on Leaf
    let contract = rt.method_contract(leaf, "render", false).unwrap();
    assert_eq!(contract.mode, MethodMode::Override);
}
