//! Runtime enforcement of abstract/final/interface/override contracts.
//!
//! Every declaration, subclassing, method definition, and instantiation is
//! checked at the moment it happens:
//! - T001: invalid declaration target (final module, interface class, ...)
//! - T002: duplicate declaration (same kind family twice, `sig` twice)
//! - T003: conflicting declaration (final vs abstract/interface)
//! - T004: final violation (subclassing a final class, redefining a final method)
//! - T005: interface violation (non-abstract method in an interface)
//! - T006: override violation (override with nothing to override)
//! - T007: abstract instantiation
//! - T008: missing abstract implementation (coverage)
//! - T009: dangling declaration (`sig` with no following definition)

pub mod pending;
pub mod hooks;
pub mod class_rules;
pub mod method_rules;
pub mod coverage;
pub mod observer;
pub mod runtime;
pub mod body;

pub use body::EntityBody;
pub use runtime::{ContractRuntime, Instance};
