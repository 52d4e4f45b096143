use std::sync::Arc;

use tenet_core::error::ContractError;
use tenet_core::hierarchy::ObjectModel;
use tenet_core::store::ContractStore;
use tenet_core::types::{qualified_method, EntityId, MethodContract, MethodKey, MethodMode};

/// Contracts relevant to one (entity, method, static flag) definition, gathered
/// from the entity itself and its active ancestor chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorLookup {
    /// Contract previously committed on the defining entity itself.
    pub own: Option<MethodContract>,
    /// Nearest strict ancestor carrying a contract, with its `Owner#name` rendering.
    pub inherited: Option<(String, MethodContract)>,
    /// Any strict ancestor that declared the method final.
    pub inherited_final: Option<String>,
    /// Some strict ancestor supplies an `implementation` contract.
    pub implementation_in_chain: bool,
    /// Some strict ancestor carries a contract with a mode other than `None`.
    pub overridable_in_chain: bool,
}

/// The method being defined, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct MethodSubject<'a> {
    pub entity_name: &'a str,
    pub qualified: &'a str,
}

/// Method-level rules: final methods stay put, `override` needs something to
/// override, and abstract methods are implemented rather than overridden.
pub struct MethodContractValidator {
    store: Arc<dyn ContractStore>,
    model: Arc<ObjectModel>,
}

impl MethodContractValidator {
    pub fn new(store: Arc<dyn ContractStore>, model: Arc<ObjectModel>) -> Self {
        Self { store, model }
    }

    /// Collect the contracts that bear on defining `name` on `entity`.
    pub fn lookup(&self, entity: EntityId, name: &str, is_static: bool) -> AncestorLookup {
        let view = self.model.ancestors_for(entity, is_static);
        let mut lookup = AncestorLookup {
            own: self
                .store
                .get_method_contract(&MethodKey::new(entity, name, is_static)),
            ..AncestorLookup::default()
        };

        for &ancestor in view.strict() {
            let Some(contract) = self
                .store
                .get_method_contract(&MethodKey::new(ancestor, name, is_static))
            else {
                continue;
            };
            let owner = self.model.name(ancestor).unwrap_or_default();
            let qualified = qualified_method(&owner, name, is_static);
            if contract.mode == MethodMode::Final && lookup.inherited_final.is_none() {
                lookup.inherited_final = Some(qualified.clone());
            }
            if contract.mode.is_implementation() {
                lookup.implementation_in_chain = true;
            }
            if contract.mode != MethodMode::None {
                lookup.overridable_in_chain = true;
            }
            if lookup.inherited.is_none() {
                lookup.inherited = Some((qualified, contract));
            }
        }
        lookup
    }

    /// Decide whether a definition carrying `requested` may proceed.
    /// `requested` is `None` when no contract was declared for the definition.
    pub fn authorize(
        &self,
        lookup: &AncestorLookup,
        requested: Option<MethodMode>,
        subject: &MethodSubject<'_>,
    ) -> Result<(), ContractError> {
        if lookup.own.is_some_and(|c| c.mode == MethodMode::Final) {
            return Err(ContractError::final_redefined(
                subject.entity_name,
                subject.qualified,
            ));
        }
        if let Some(final_method) = &lookup.inherited_final {
            return Err(ContractError::final_overridden(
                subject.entity_name,
                final_method,
            ));
        }

        if requested != Some(MethodMode::Override) {
            return Ok(());
        }
        match &lookup.inherited {
            Some((abstract_method, contract)) if contract.mode == MethodMode::Abstract => {
                if lookup.implementation_in_chain {
                    Ok(())
                } else {
                    Err(ContractError::override_of_abstract(
                        subject.entity_name,
                        subject.qualified,
                        abstract_method,
                    ))
                }
            }
            _ if lookup.overridable_in_chain => Ok(()),
            _ => Err(ContractError::override_without_ancestor(
                subject.entity_name,
                subject.qualified,
            )),
        }
    }
}
