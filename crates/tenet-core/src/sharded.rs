//! Sharded contract store.
//!
//! Both maps are `DashMap`s, so coverage scans running on different threads
//! only contend when they hit the same shard, and a check-then-write on a
//! single key goes through the entry API and is atomic.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::ContractError;
use crate::store::ContractStore;
use crate::types::{EntityContract, EntityId, EntityKind, MethodContract, MethodKey, MethodMode};

#[derive(Debug, Default)]
pub struct ShardedContractStore {
    entities: DashMap<EntityId, EntityContract>,
    methods: DashMap<MethodKey, MethodContract>,
}

impl ShardedContractStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Decide whether `requested` may be written over `existing`.
fn check_kind_transition(
    name: &str,
    existing: EntityKind,
    requested: EntityKind,
) -> Result<(), ContractError> {
    match (existing, requested) {
        (EntityKind::None, _) => Ok(()),
        (EntityKind::Final, EntityKind::Final) => {
            Err(ContractError::redeclared(name, existing, requested))
        }
        (EntityKind::Final, _) | (_, EntityKind::Final) => {
            Err(ContractError::conflicting_kind(name, existing, requested))
        }
        // Abstract and Interface share a family: either one may be declared once.
        _ => Err(ContractError::redeclared(name, existing, requested)),
    }
}

impl ContractStore for ShardedContractStore {
    fn get_entity_kind(&self, entity: EntityId) -> EntityKind {
        self.entities
            .get(&entity)
            .map_or(EntityKind::None, |c| c.kind)
    }

    fn set_entity_kind(
        &self,
        entity: EntityId,
        name: &str,
        kind: EntityKind,
    ) -> Result<(), ContractError> {
        if kind == EntityKind::None {
            return Ok(());
        }
        match self.entities.entry(entity) {
            // Occupied entries never hold `None`, so this always rejects.
            Entry::Occupied(occupied) => check_kind_transition(name, occupied.get().kind, kind),
            Entry::Vacant(vacant) => {
                vacant.insert(EntityContract { entity, kind });
                Ok(())
            }
        }
    }

    fn get_method_contract(&self, key: &MethodKey) -> Option<MethodContract> {
        self.methods.get(key).map(|c| *c)
    }

    fn set_method_contract(
        &self,
        key: MethodKey,
        entity_name: &str,
        qualified: &str,
        contract: MethodContract,
    ) -> Result<(), ContractError> {
        match self.methods.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().mode == MethodMode::Final {
                    return Err(ContractError::final_redefined(entity_name, qualified));
                }
                occupied.insert(contract);
                Ok(())
            }
            Entry::Vacant(vacant) => {
                vacant.insert(contract);
                Ok(())
            }
        }
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn method_count(&self) -> usize {
        self.methods.len()
    }

    fn clear(&self) {
        self.entities.clear();
        self.methods.clear();
    }
}

#[cfg(test)]
#[path = "sharded_tests.rs"]
mod tests;
