// Tests for reset() isolation between scenarios
use tenet_core::types::{EntityKind, MethodMode};
use tenet_enforce::pending::PendingSlot;
use tenet_enforce::ContractRuntime;

use crate::common::{class_with_final_method, define};

fn final_scenario(rt: &ContractRuntime, name: &str) -> Vec<String> {
    let mut observed = Vec::new();
    let c = rt.define_class(name, None).unwrap();
    rt.declare_final(c).unwrap();
    observed.push(rt.entity_kind(c).to_string());
    observed.push(rt.declare_final(c).unwrap_err().code().to_string());
    observed.push(
        rt.define_class(&format!("{name}Child"), Some(c))
            .unwrap_err()
            .code()
            .to_string(),
    );
    observed
}

#[test]
/// A scenario run after reset() behaves exactly like the first one.
fn test_reset_is_idempotent() {
    let rt = ContractRuntime::new();
    let first = final_scenario(&rt, "First");

    rt.reset();
    assert_eq!(rt.store().entity_count(), 0);
    assert_eq!(rt.store().method_count(), 0);
    let second = final_scenario(&rt, "Second");
    assert_eq!(first, second);

    rt.reset();
    rt.reset();
    assert_eq!(final_scenario(&rt, "Third"), first);
}

#[test]
/// reset() clears method contracts and the pending slot.
fn test_reset_clears_contracts_and_pending() {
    let rt = ContractRuntime::new();
    let c = class_with_final_method(&rt, "Widget", "foo");
    assert!(define(&rt, c, "foo", None).is_err());

    let mut body = rt.open(c).unwrap();
    body.sig(MethodMode::Abstract).unwrap();
    rt.reset();
    assert!(PendingSlot::peek().is_none());
    drop(body);

    assert!(rt.method_contract(c, "foo", false).is_none());
    assert_eq!(rt.entity_kind(c), EntityKind::None);
    define(&rt, c, "foo", None).unwrap();
}

#[test]
/// Resetting the global runtime leaves it usable.
fn test_global_reset() {
    let rt = ContractRuntime::global();
    rt.reset();
    let c = rt.define_class("GlobalSealed", None).unwrap();
    rt.declare_final(c).unwrap();
    assert!(rt.define_class("GlobalChild", Some(c)).is_err());
    rt.reset();
    rt.define_class("GlobalChild", Some(c)).unwrap();
}
