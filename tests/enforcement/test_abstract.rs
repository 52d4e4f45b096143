// Tests for abstract entities and abstract instantiation
use tenet_core::error::ContractError;
use tenet_core::signature::ParamShape;
use tenet_core::types::{EntityKind, MethodMode};
use tenet_enforce::ContractRuntime;

use crate::common::{abstract_class, abstract_module, define};

#[test]
/// Abstract twice is a duplicate; abstract then interface stays in the same family.
fn test_abstract_redeclaration() {
    let rt = ContractRuntime::new();
    let m = rt.define_module("Api").unwrap();
    rt.declare_abstract(m).unwrap();

    let err = rt.declare_abstract(m).unwrap_err();
    assert!(matches!(err, ContractError::DuplicateDeclaration { .. }));
    let err = rt.declare_interface(m).unwrap_err();
    assert!(matches!(err, ContractError::DuplicateDeclaration { .. }));
    assert_eq!(rt.entity_kind(m), EntityKind::Abstract);
}

#[test]
/// Abstract classes can't be instantiated even when fully covered.
fn test_abstract_class_not_instantiable() {
    let rt = ContractRuntime::new();
    let c = abstract_class(&rt, "Shape", None, &[]);
    let err = rt.instantiate(c).unwrap_err();
    assert!(matches!(err, ContractError::AbstractInstantiation { .. }));
    assert_eq!(
        err.to_string(),
        "Shape is declared as abstract; it cannot be instantiated"
    );
}

#[test]
/// A concrete subclass of an abstract class is instantiable once it implements everything.
fn test_concrete_subclass_instantiable() {
    // GIVEN abstract Shape with abstract `area` and `perimeter`
    let rt = ContractRuntime::new();
    let shape = abstract_class(&rt, "Shape", None, &["area", "perimeter"]);

    // WHEN Square implements both
    let mut body = rt.class("Square", Some(shape)).unwrap();
    body.sig(MethodMode::Implementation).unwrap();
    body.def("area", ParamShape::new()).unwrap();
    body.sig(MethodMode::OverridableImplementation).unwrap();
    body.def("perimeter", ParamShape::new()).unwrap();
    let square = body.close().unwrap();

    // THEN Square instantiates and its own kind stays None
    let instance = rt.instantiate(square).unwrap();
    assert_eq!(instance.class, square);
    assert_eq!(rt.entity_kind(square), EntityKind::None);
}

#[test]
/// An abstract method may be redeclared abstract in a subclass and still needs an implementation.
fn test_abstract_chain_reabstracted() {
    let rt = ContractRuntime::new();
    let base = abstract_class(&rt, "Base", None, &["run"]);
    let mid = abstract_class(&rt, "Mid", Some(base), &["run"]);
    let leaf = rt.define_class("Leaf", Some(mid)).unwrap();

    let err = rt.instantiate(leaf).unwrap_err();
    assert_eq!(err.to_string(), "Missing definition for abstract method `Mid#run`");

    define(&rt, leaf, "run", None).unwrap();
    rt.instantiate(leaf).unwrap();
}

#[test]
/// Modules may not declare abstract static methods.
fn test_module_abstract_static_is_invalid() {
    let rt = ContractRuntime::new();
    let m = abstract_module(&rt, "Mixin", &[]);
    let mut body = rt.open(m).unwrap();
    body.sig(MethodMode::Abstract).unwrap();
    let err = body
        .def_static("build", ParamShape::new())
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, ContractError::InvalidDeclarationTarget { .. }));
    assert!(err.to_string().contains("`Mixin.build`"));
}

#[test]
/// Finalizing an abstract entity is trivially fine; unknown entities are reported.
fn test_finalize_abstract_and_unknown() {
    let rt = ContractRuntime::new();
    let c = abstract_class(&rt, "Shape", None, &["area"]);
    rt.finalize(c).unwrap();
    let err = rt.finalize(tenet_core::types::EntityId(404)).unwrap_err();
    assert_eq!(err.code(), "T010");
}
