use std::sync::Arc;

use tenet_core::error::ContractError;
use tenet_core::hierarchy::ObjectModel;
use tenet_core::store::ContractStore;
use tenet_core::types::{qualified_method, EntityFlavor, EntityId, EntityKind, MethodMode};

/// Entity-level rules: who may be final, abstract, or an interface, who may be
/// instantiated, and which methods an entity's own body may define.
pub struct ClassContractValidator {
    store: Arc<dyn ContractStore>,
    model: Arc<ObjectModel>,
}

/// Facts about the method definition being checked against its entity.
#[derive(Debug, Clone, Copy)]
pub struct MethodTarget<'a> {
    pub entity: EntityId,
    pub entity_name: &'a str,
    pub flavor: EntityFlavor,
    pub name: &'a str,
    pub is_static: bool,
    pub requested: Option<MethodMode>,
    /// The entity was declared final earlier in the same open body.
    pub final_declared_in_body: bool,
}

impl ClassContractValidator {
    pub fn new(store: Arc<dyn ContractStore>, model: Arc<ObjectModel>) -> Self {
        Self { store, model }
    }

    fn describe(&self, entity: EntityId) -> Result<(String, EntityFlavor), ContractError> {
        match (self.model.name(entity), self.model.flavor(entity)) {
            (Some(name), Some(flavor)) => Ok((name, flavor)),
            _ => Err(ContractError::UnknownEntity(entity.to_string())),
        }
    }

    /// Validate and record an entity-level declaration.
    ///
    /// Kind-family exclusivity and duplicate detection are enforced by the
    /// store's write; this layer adds the rules that depend on the flavor.
    pub fn declare(&self, entity: EntityId, kind: EntityKind) -> Result<(), ContractError> {
        let (name, flavor) = self.describe(entity)?;
        match (kind, flavor) {
            (EntityKind::Final, EntityFlavor::Module) => {
                return Err(ContractError::not_a_class_for_final(&name));
            }
            (EntityKind::Interface, EntityFlavor::Class) => {
                // A class that is already final reports the conflict instead.
                let existing = self.store.get_entity_kind(entity);
                if existing == EntityKind::Final {
                    return Err(ContractError::conflicting_kind(&name, existing, kind));
                }
                return Err(ContractError::interface_on_class(&name));
            }
            _ => {}
        }
        self.store.set_entity_kind(entity, &name, kind)
    }

    /// Abstract and interface entities can never be constructed directly.
    pub fn check_instantiable(&self, entity: EntityId) -> Result<(), ContractError> {
        let (name, _) = self.describe(entity)?;
        let kind = self.store.get_entity_kind(entity);
        if kind.is_abstract_family() {
            return Err(ContractError::abstract_instantiation(&name, kind));
        }
        Ok(())
    }

    /// Modules are mixins; only classes produce instances.
    pub fn check_constructible(&self, entity: EntityId) -> Result<(), ContractError> {
        let (name, flavor) = self.describe(entity)?;
        if flavor == EntityFlavor::Module {
            return Err(ContractError::module_not_instantiable(&name));
        }
        Ok(())
    }

    /// Rules a method definition must satisfy because of the entity it lives in.
    pub fn check_method_target(&self, target: &MethodTarget<'_>) -> Result<(), ContractError> {
        let qualified = qualified_method(target.entity_name, target.name, target.is_static);
        let kind = self.store.get_entity_kind(target.entity);

        if kind == EntityKind::Interface && target.requested != Some(MethodMode::Abstract) {
            return Err(ContractError::interface_method_not_abstract(
                target.entity_name,
                &qualified,
            ));
        }

        match (target.flavor, target.requested) {
            (EntityFlavor::Module, Some(MethodMode::Final)) => {
                return Err(ContractError::final_method_on_module(
                    target.entity_name,
                    &qualified,
                ));
            }
            (EntityFlavor::Module, Some(MethodMode::Abstract)) if target.is_static => {
                return Err(ContractError::abstract_static_on_module(
                    target.entity_name,
                    &qualified,
                ));
            }
            _ => {}
        }

        if target.final_declared_in_body && target.requested == Some(MethodMode::Final) {
            return Err(ContractError::final_class_and_method(
                target.entity_name,
                &qualified,
            ));
        }
        Ok(())
    }
}
