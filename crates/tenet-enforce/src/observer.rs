//! Lifecycle entry point.
//!
//! Subclass creation, method definition, and method removal all enter the
//! engine here. The observer consults the pending slot, asks the validators,
//! commits to the store, and only then lets the host model change.

use std::sync::Arc;

use dashmap::DashMap;
use tenet_core::error::ContractError;
use tenet_core::hierarchy::{MethodDef, ObjectModel};
use tenet_core::store::ContractStore;
use tenet_core::types::{
    qualified_method, EntityFlavor, EntityId, EntityKind, MethodContract, MethodKey, MethodMode,
};

use crate::class_rules::{ClassContractValidator, MethodTarget};
use crate::hooks::{
    run_chain, FinalClassGuard, HookEntry, HookOrigin, InheritanceHook, MethodEvent, MethodHook,
    SubclassEvent,
};
use crate::method_rules::{MethodContractValidator, MethodSubject};
use crate::pending::PendingSlot;

/// State of the body a definition happens in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionContext {
    pub runtime: u64,
    pub final_declared_in_body: bool,
}

pub struct HierarchyObserver {
    store: Arc<dyn ContractStore>,
    model: Arc<ObjectModel>,
    classes: ClassContractValidator,
    methods: MethodContractValidator,
    inherited_hooks: DashMap<EntityId, Vec<HookEntry>>,
    method_hooks: DashMap<EntityId, Vec<Arc<dyn MethodHook>>>,
}

impl HierarchyObserver {
    pub fn new(store: Arc<dyn ContractStore>, model: Arc<ObjectModel>) -> Self {
        Self {
            classes: ClassContractValidator::new(store.clone(), model.clone()),
            methods: MethodContractValidator::new(store.clone(), model.clone()),
            store,
            model,
            inherited_hooks: DashMap::new(),
            method_hooks: DashMap::new(),
        }
    }

    pub fn classes(&self) -> &ClassContractValidator {
        &self.classes
    }

    pub fn methods(&self) -> &MethodContractValidator {
        &self.methods
    }

    /// Install the final-class guard on `entity`. Returns `false` if it was
    /// already installed.
    pub fn install_final_guard(&self, entity: EntityId) -> bool {
        let mut chain = self.inherited_hooks.entry(entity).or_default();
        if chain.iter().any(|e| e.origin == HookOrigin::Core) {
            return false;
        }
        chain.push(HookEntry {
            origin: HookOrigin::Core,
            hook: Arc::new(FinalClassGuard { entity }),
        });
        true
    }

    pub fn register_inherited_hook(&self, entity: EntityId, hook: Arc<dyn InheritanceHook>) {
        self.inherited_hooks
            .entry(entity)
            .or_default()
            .push(HookEntry {
                origin: HookOrigin::User,
                hook,
            });
    }

    pub fn register_method_hook(&self, entity: EntityId, hook: Arc<dyn MethodHook>) {
        self.method_hooks.entry(entity).or_default().push(hook);
    }

    /// Strip every hook the core installed, keeping user hooks in place.
    pub fn clear_core_hooks(&self) {
        for mut chain in self.inherited_hooks.iter_mut() {
            chain.retain(|e| e.origin == HookOrigin::User);
        }
        self.inherited_hooks.retain(|_, chain| !chain.is_empty());
    }

    /// A class is about to be subclassed. Hooks registered on the parent and
    /// on each of its superclasses run, root first.
    pub fn on_subclass_created(
        &self,
        parent: EntityId,
        child_name: &str,
    ) -> Result<(), ContractError> {
        let parent_name = self
            .model
            .name(parent)
            .ok_or_else(|| ContractError::UnknownEntity(parent.to_string()))?;

        // Snapshot the chains so hooks may register further hooks.
        let entries: Vec<HookEntry> = self
            .model
            .superclass_chain(parent)
            .into_iter()
            .rev()
            .filter_map(|e| self.inherited_hooks.get(&e).map(|chain| chain.value().clone()))
            .flatten()
            .collect();

        let event = SubclassEvent {
            parent,
            parent_name: &parent_name,
            child_name,
        };
        run_chain(&entries, &event)?;
        // The guard hook can be missing if the kind was written to the store directly.
        if self.store.get_entity_kind(parent) == EntityKind::Final {
            return Err(ContractError::final_inherited(&parent_name));
        }
        Ok(())
    }

    /// A method is being defined on `entity`. On success the definition is
    /// committed to the model and the contract (if any) to the store.
    pub fn on_method_defined(
        &self,
        ctx: DefinitionContext,
        entity: EntityId,
        def: MethodDef,
    ) -> Result<Option<MethodContract>, ContractError> {
        let (entity_name, flavor) = match (self.model.name(entity), self.model.flavor(entity)) {
            (Some(name), Some(flavor)) => (name, flavor),
            _ => return Err(ContractError::UnknownEntity(entity.to_string())),
        };
        // Consumed even if the definition is rejected below.
        let requested = PendingSlot::take_for(ctx.runtime, entity);
        let qualified = qualified_method(&entity_name, &def.name, def.is_static);

        self.classes.check_method_target(&MethodTarget {
            entity,
            entity_name: &entity_name,
            flavor,
            name: &def.name,
            is_static: def.is_static,
            requested,
            final_declared_in_body: ctx.final_declared_in_body,
        })?;

        let lookup = self.methods.lookup(entity, &def.name, def.is_static);
        self.methods.authorize(
            &lookup,
            requested,
            &MethodSubject {
                entity_name: &entity_name,
                qualified: &qualified,
            },
        )?;

        // A bare redefinition drops whatever mode the earlier definition carried.
        let mode = match (requested, lookup.own) {
            (Some(mode), _) => Some(mode),
            (None, Some(_)) => Some(MethodMode::None),
            (None, None) => None,
        };
        let contract = mode.map(|mode| MethodContract {
            mode,
            declared_at: entity,
        });
        if let Some(contract) = contract {
            self.store.set_method_contract(
                MethodKey::new(entity, def.name.clone(), def.is_static),
                &entity_name,
                &qualified,
                contract,
            )?;
        }

        let name = def.name.clone();
        let is_static = def.is_static;
        self.model.add_method(entity, def);
        tracing::debug!(
            method = %qualified,
            mode = contract.map_or("untyped", |c| c.mode.as_str()),
            "method defined"
        );

        self.notify(entity, |hook| {
            hook.on_method_added(&MethodEvent {
                entity,
                entity_name: &entity_name,
                name: &name,
                is_static,
                contract,
            })
        });
        Ok(contract)
    }

    /// Method removal is not validated; hooks are told and the model updated.
    pub fn on_method_removed(&self, entity: EntityId, name: &str, is_static: bool) -> bool {
        let removed = self.model.remove_method(entity, name, is_static);
        if removed {
            let entity_name = self.model.name(entity).unwrap_or_default();
            let contract = self
                .store
                .get_method_contract(&MethodKey::new(entity, name, is_static));
            self.notify(entity, |hook| {
                hook.on_method_removed(&MethodEvent {
                    entity,
                    entity_name: &entity_name,
                    name,
                    is_static,
                    contract,
                })
            });
        }
        removed
    }

    fn notify(&self, entity: EntityId, call: impl Fn(&dyn MethodHook)) {
        let hooks = self
            .method_hooks
            .get(&entity)
            .map(|h| h.value().clone())
            .unwrap_or_default();
        for hook in &hooks {
            call(hook.as_ref());
        }
    }

    /// Check run before a module is mixed in. Only modules are includable, and
    /// none of the instance methods they bring (their own or those of their
    /// includes) may shadow a final method already in the target's chain.
    pub fn check_includable(&self, target: EntityId, module: EntityId) -> Result<(), ContractError> {
        let target_name = self
            .model
            .name(target)
            .ok_or_else(|| ContractError::UnknownEntity(target.to_string()))?;
        match (self.model.name(module), self.model.flavor(module)) {
            (Some(name), Some(EntityFlavor::Class)) => {
                return Err(ContractError::include_non_module(&target_name, &name))
            }
            (Some(_), Some(EntityFlavor::Module)) => {}
            _ => return Err(ContractError::UnknownEntity(module.to_string())),
        }

        for source in self.model.ancestors(module).iter() {
            for def in self.model.methods(source) {
                if def.is_static {
                    continue;
                }
                let lookup = self.methods.lookup(target, &def.name, false);
                if let Some(final_method) = lookup.inherited_final {
                    return Err(ContractError::final_overridden(&target_name, &final_method));
                }
            }
        }
        Ok(())
    }
}
