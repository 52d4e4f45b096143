// Tests for final classes and final methods
use tenet_core::error::ContractError;
use tenet_core::signature::ParamShape;
use tenet_core::types::{EntityKind, MethodMode};
use tenet_enforce::ContractRuntime;

use crate::common::{class_with_final_method, define};

#[test]
/// Declaring the same class final twice is a duplicate declaration.
fn test_final_twice_is_duplicate() {
    // GIVEN a class already declared final
    let rt = ContractRuntime::new();
    let mut body = rt.class("Sealed", None).unwrap();
    body.final_().unwrap();

    // WHEN it is declared final again
    let err = body.final_().map(|_| ()).unwrap_err();

    // THEN a DuplicateDeclaration names the class
    assert!(matches!(err, ContractError::DuplicateDeclaration { .. }));
    assert_eq!(err.entity(), "Sealed");
    assert_eq!(
        err.to_string(),
        "Sealed was already declared as final and cannot be re-declared as final"
    );
}

#[test]
/// Final and abstract collide in both orders.
fn test_final_and_abstract_conflict_symmetrically() {
    let rt = ContractRuntime::new();

    let a = rt.define_class("AbstractFirst", None).unwrap();
    rt.declare_abstract(a).unwrap();
    let err = rt.declare_final(a).unwrap_err();
    assert!(matches!(err, ContractError::ConflictingDeclaration { .. }));

    let f = rt.define_class("FinalFirst", None).unwrap();
    rt.declare_final(f).unwrap();
    let err = rt.declare_abstract(f).unwrap_err();
    assert!(matches!(err, ContractError::ConflictingDeclaration { .. }));

    // The first declaration stands.
    assert_eq!(rt.entity_kind(a), EntityKind::Abstract);
    assert_eq!(rt.entity_kind(f), EntityKind::Final);
}

#[test]
/// Modules can't be final.
fn test_module_cannot_be_final() {
    let rt = ContractRuntime::new();
    let mut body = rt.module("Helpers").unwrap();
    let err = body.final_().map(|_| ()).unwrap_err();
    assert!(matches!(err, ContractError::InvalidDeclarationTarget { .. }));
    assert!(err.to_string().contains("Helpers is not a class or method"));
}

#[test]
/// Subclassing a final class fails, and so does subclassing through a deeper chain.
fn test_final_class_cannot_be_subclassed() {
    // GIVEN Base <- Sealed(final)
    let rt = ContractRuntime::new();
    let base = rt.define_class("Base", None).unwrap();
    let mut body = rt.class("Sealed", Some(base)).unwrap();
    body.final_().unwrap();
    let sealed = body.close().unwrap();

    // WHEN subclassing Sealed
    let err = rt.define_class("Leaf", Some(sealed)).unwrap_err();

    // THEN FinalViolation names Sealed; Base is still open
    assert!(matches!(err, ContractError::FinalViolation { .. }));
    assert_eq!(err.entity(), "Sealed");
    rt.define_class("Sibling", Some(base)).unwrap();
}

#[test]
/// Redefining a final method in the same class says "redefined".
fn test_final_method_cannot_be_redefined() {
    let rt = ContractRuntime::new();
    let c = class_with_final_method(&rt, "Widget", "foo");

    for mode in [None, Some(MethodMode::Final), Some(MethodMode::Implementation)] {
        let err = define(&rt, c, "foo", mode).unwrap_err();
        assert!(matches!(err, ContractError::FinalViolation { .. }));
        assert_eq!(
            err.to_string(),
            "The method `Widget#foo` was declared as final and cannot be redefined"
        );
    }
}

#[test]
/// Overriding a final method anywhere below says "overridden".
fn test_final_method_cannot_be_overridden() {
    let rt = ContractRuntime::new();
    let parent = class_with_final_method(&rt, "Parent", "foo");
    let child = rt.define_class("Child", Some(parent)).unwrap();
    let grandchild = rt.define_class("GrandChild", Some(child)).unwrap();

    for (entity, name) in [(child, "Child"), (grandchild, "GrandChild")] {
        for mode in [None, Some(MethodMode::Final), Some(MethodMode::Override)] {
            let err = define(&rt, entity, "foo", mode).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "The method `Parent#foo` was declared as final and cannot be overridden in {name}"
                )
            );
        }
    }
    // The rejected definitions never landed.
    assert!(rt.model().method(child, "foo", false).is_none());
}

#[test]
/// Static and instance methods with the same name are tracked separately.
fn test_final_static_does_not_lock_instance_side() {
    let rt = ContractRuntime::new();
    let mut body = rt.class("Factory", None).unwrap();
    body.sig(MethodMode::Final).unwrap();
    body.def_static("build", ParamShape::new()).unwrap();
    body.def("build", ParamShape::new()).unwrap();
    let factory = body.close().unwrap();

    let err = rt
        .open(factory)
        .unwrap()
        .def_static("build", ParamShape::new())
        .map(|_| ())
        .unwrap_err();
    assert!(err.to_string().contains("`Factory.build`"));

    let child = rt.define_class("Sub", Some(factory)).unwrap();
    define(&rt, child, "build", None).unwrap();
}

#[test]
/// A module can't declare a final method.
fn test_module_final_method_is_invalid() {
    let rt = ContractRuntime::new();
    let m = rt.define_module("Mixin").unwrap();
    let err = define(&rt, m, "foo", Some(MethodMode::Final)).unwrap_err();
    assert!(matches!(err, ContractError::InvalidDeclarationTarget { .. }));
    assert_eq!(
        err.to_string(),
        "Mixin is not a class and its method `Mixin#foo` cannot be declared as final"
    );
}

#[test]
/// A mixin can't slip a method in front of an inherited final one.
fn test_include_cannot_shadow_final_method() {
    let rt = ContractRuntime::new();
    let parent = class_with_final_method(&rt, "Parent", "foo");
    let shadow = rt.define_module("Shadow").unwrap();
    define(&rt, shadow, "foo", None).unwrap();
    let child = rt.define_class("Child", Some(parent)).unwrap();

    let err = rt.include(child, shadow).unwrap_err();
    assert!(matches!(err, ContractError::FinalViolation { .. }));
    assert_eq!(
        err.to_string(),
        "The method `Parent#foo` was declared as final and cannot be overridden in Child"
    );
    assert_eq!(rt.ancestors(child).as_slice(), &[child, parent]);

    // Unrelated methods still mix in.
    let helpers = rt.define_module("Helpers").unwrap();
    define(&rt, helpers, "bar", None).unwrap();
    assert!(rt.include(child, helpers).unwrap());
}
