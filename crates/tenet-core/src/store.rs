use crate::error::ContractError;
use crate::types::{EntityId, EntityKind, MethodContract, MethodKey};

/// Out-of-band mapping from entity identity to its declared contracts.
///
/// Reads never fail: an entity with no entry has kind [`EntityKind::None`] and a
/// method with no entry has no contract. Writes enforce the write-once rules for
/// `Final` and the exclusivity of the final and abstract/interface families.
pub trait ContractStore: Send + Sync {
    /// Declared kind of an entity, `EntityKind::None` when nothing was declared.
    fn get_entity_kind(&self, entity: EntityId) -> EntityKind;

    /// Record the kind of an entity. `name` is only used for error messages.
    fn set_entity_kind(
        &self,
        entity: EntityId,
        name: &str,
        kind: EntityKind,
    ) -> Result<(), ContractError>;

    /// Contract committed for (entity, method, static flag), if any.
    fn get_method_contract(&self, key: &MethodKey) -> Option<MethodContract>;

    /// Commit a method contract. Fails if a `Final` contract already exists for `key`.
    /// `qualified` is the `Owner#name` rendering used in error messages.
    fn set_method_contract(
        &self,
        key: MethodKey,
        entity_name: &str,
        qualified: &str,
        contract: MethodContract,
    ) -> Result<(), ContractError>;

    /// Number of entities carrying a non-`None` kind.
    fn entity_count(&self) -> usize;

    /// Number of committed method contracts.
    fn method_count(&self) -> usize;

    /// Drop every entity and method contract.
    fn clear(&self);
}
