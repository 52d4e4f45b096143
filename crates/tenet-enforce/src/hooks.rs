//! Lifecycle hook traits and per-entity hook chains.
//!
//! Registering a hook never displaces one that is already installed: chains
//! only grow, and every hook in a chain runs for every event.

use std::sync::Arc;

use tenet_core::error::ContractError;
use tenet_core::types::{EntityId, MethodContract};

/// A class is about to gain a subclass.
#[derive(Debug, Clone, Copy)]
pub struct SubclassEvent<'a> {
    pub parent: EntityId,
    pub parent_name: &'a str,
    pub child_name: &'a str,
}

/// A method was added to or removed from an entity.
#[derive(Debug, Clone, Copy)]
pub struct MethodEvent<'a> {
    pub entity: EntityId,
    pub entity_name: &'a str,
    pub name: &'a str,
    pub is_static: bool,
    pub contract: Option<MethodContract>,
}

/// Observer of subclass creation. An `Err` aborts the subclassing.
pub trait InheritanceHook: Send + Sync {
    fn on_inherited(&self, event: &SubclassEvent<'_>) -> Result<(), ContractError>;
}

impl<F> InheritanceHook for F
where
    F: Fn(&SubclassEvent<'_>) -> Result<(), ContractError> + Send + Sync,
{
    fn on_inherited(&self, event: &SubclassEvent<'_>) -> Result<(), ContractError> {
        self(event)
    }
}

/// Observer of method definition and removal. Runs after the core has
/// accepted the change; it cannot veto it.
pub trait MethodHook: Send + Sync {
    fn on_method_added(&self, _event: &MethodEvent<'_>) {}
    fn on_method_removed(&self, _event: &MethodEvent<'_>) {}
}

/// Who installed a hook. `reset()` only strips hooks the core installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOrigin {
    Core,
    User,
}

#[derive(Clone)]
pub struct HookEntry {
    pub origin: HookOrigin,
    pub hook: Arc<dyn InheritanceHook>,
}

/// Rejects every subclass of the entity it is installed on.
#[derive(Debug, Clone)]
pub struct FinalClassGuard {
    pub entity: EntityId,
}

impl InheritanceHook for FinalClassGuard {
    fn on_inherited(&self, event: &SubclassEvent<'_>) -> Result<(), ContractError> {
        if event.parent == self.entity {
            return Err(ContractError::final_inherited(event.parent_name));
        }
        Ok(())
    }
}

/// Run every hook in order and surface the first failure.
pub fn run_chain<'a>(
    entries: impl IntoIterator<Item = &'a HookEntry>,
    event: &SubclassEvent<'_>,
) -> Result<(), ContractError> {
    let mut first_err = None;
    for entry in entries {
        if let Err(e) = entry.hook.on_inherited(event) {
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
