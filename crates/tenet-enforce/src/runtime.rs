//! The contract runtime: one object owning the store, the host object model,
//! the observer, and the coverage checker.
//!
//! Entities and methods are only created through the runtime (or through an
//! [`EntityBody`] it hands out), so every lifecycle event passes through the
//! validators before the model changes.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tenet_core::config::TenetConfig;
use tenet_core::error::ContractError;
use tenet_core::hierarchy::{AncestorView, IncludeOutcome, MethodDef, ObjectModel};
use tenet_core::sharded::ShardedContractStore;
use tenet_core::signature::{ShapeComparator, SplatShapeComparator};
use tenet_core::store::ContractStore;
use tenet_core::types::{EntityFlavor, EntityId, EntityKind, MethodContract, MethodKey};

use crate::body::EntityBody;
use crate::coverage::AbstractCoverageChecker;
use crate::hooks::{InheritanceHook, MethodHook};
use crate::observer::{DefinitionContext, HierarchyObserver};
use crate::pending::PendingSlot;

static NEXT_RUNTIME_ID: AtomicU64 = AtomicU64::new(1);
static GLOBAL: Lazy<ContractRuntime> = Lazy::new(ContractRuntime::new);

/// A constructed object. Carries only the class it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instance {
    pub class: EntityId,
}

pub struct ContractRuntime {
    id: u64,
    config: TenetConfig,
    store: Arc<dyn ContractStore>,
    model: Arc<ObjectModel>,
    observer: HierarchyObserver,
    coverage: AbstractCoverageChecker,
    /// Entities whose coverage passed, with the model generation it passed at.
    verified: DashMap<EntityId, u64>,
}

impl Default for ContractRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractRuntime {
    pub fn new() -> Self {
        Self::with_config(TenetConfig::default())
    }

    /// Runtime configured from `tenet.json` in `dir`, falling back to defaults.
    pub fn from_dir(dir: &Path) -> Self {
        Self::with_config(TenetConfig::load(dir))
    }

    pub fn with_config(config: TenetConfig) -> Self {
        Self::with_comparator(config, Arc::new(SplatShapeComparator))
    }

    /// Runtime using an external shape comparator for coverage checks.
    pub fn with_comparator(config: TenetConfig, comparator: Arc<dyn ShapeComparator>) -> Self {
        let store: Arc<dyn ContractStore> = Arc::new(ShardedContractStore::new());
        let model = Arc::new(ObjectModel::new());
        let coverage = AbstractCoverageChecker::new(
            store.clone(),
            model.clone(),
            comparator,
            config.signature.check_shapes,
        );
        Self {
            id: NEXT_RUNTIME_ID.fetch_add(1, Ordering::Relaxed),
            observer: HierarchyObserver::new(store.clone(), model.clone()),
            coverage,
            config,
            store,
            model,
            verified: DashMap::new(),
        }
    }

    /// Process-wide runtime, created on first use.
    pub fn global() -> &'static ContractRuntime {
        &GLOBAL
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &TenetConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ContractStore> {
        &self.store
    }

    pub fn model(&self) -> &Arc<ObjectModel> {
        &self.model
    }

    /// Drop every recorded contract, the current thread's pending declaration,
    /// the hooks the runtime installed, and the coverage cache. Entities, their
    /// methods, and user-registered hooks stay.
    pub fn reset(&self) {
        let entities = self.store.entity_count();
        let methods = self.store.method_count();
        self.store.clear();
        PendingSlot::clear();
        self.observer.clear_core_hooks();
        self.verified.clear();
        tracing::info!(entities, methods, "contract state reset");
    }

    pub(crate) fn rejected(&self, err: ContractError) -> ContractError {
        tracing::warn!(code = err.code(), entity = err.entity(), error = %err, "contract violation");
        err
    }

    fn name_of(&self, entity: EntityId) -> Result<String, ContractError> {
        self.model
            .name(entity)
            .ok_or_else(|| ContractError::UnknownEntity(entity.to_string()))
    }

    // ── Entity creation ───────────────────────────────────────────────

    /// Create a class. With a superclass this is a subclassing event and every
    /// inheritance hook up the superclass chain must accept it first.
    pub fn define_class(
        &self,
        name: &str,
        superclass: Option<EntityId>,
    ) -> Result<EntityId, ContractError> {
        if let Some(parent) = superclass {
            let parent_name = self.name_of(parent).map_err(|e| self.rejected(e))?;
            if self.model.flavor(parent) != Some(EntityFlavor::Class) {
                return Err(self.rejected(ContractError::superclass_not_class(name, &parent_name)));
            }
            self.observer
                .on_subclass_created(parent, name)
                .map_err(|e| self.rejected(e))?;
        }
        let id = self.model.add_entity(name, EntityFlavor::Class, superclass);
        tracing::debug!(entity = name, id = %id, "class defined");
        Ok(id)
    }

    pub fn define_module(&self, name: &str) -> Result<EntityId, ContractError> {
        let id = self.model.add_entity(name, EntityFlavor::Module, None);
        tracing::debug!(entity = name, id = %id, "module defined");
        Ok(id)
    }

    /// Define a class and open its body.
    pub fn class(
        &self,
        name: &str,
        superclass: Option<EntityId>,
    ) -> Result<EntityBody<'_>, ContractError> {
        let id = self.define_class(name, superclass)?;
        self.open(id)
    }

    /// Define a module and open its body.
    pub fn module(&self, name: &str) -> Result<EntityBody<'_>, ContractError> {
        let id = self.define_module(name)?;
        self.open(id)
    }

    /// Open (or reopen) the body of an existing entity.
    pub fn open(&self, entity: EntityId) -> Result<EntityBody<'_>, ContractError> {
        let name = self.name_of(entity)?;
        Ok(EntityBody::new(self, entity, name))
    }

    // ── Declarations ──────────────────────────────────────────────────

    pub fn declare_abstract(&self, entity: EntityId) -> Result<(), ContractError> {
        self.declare_kind(entity, EntityKind::Abstract)
    }

    pub fn declare_interface(&self, entity: EntityId) -> Result<(), ContractError> {
        self.declare_kind(entity, EntityKind::Interface)
    }

    pub fn declare_final(&self, entity: EntityId) -> Result<(), ContractError> {
        self.declare_kind(entity, EntityKind::Final)
    }

    /// Record an entity-level kind. Final entities also get the subclass guard.
    pub fn declare_kind(&self, entity: EntityId, kind: EntityKind) -> Result<(), ContractError> {
        self.observer
            .classes()
            .declare(entity, kind)
            .map_err(|e| self.rejected(e))?;
        if kind == EntityKind::Final {
            self.observer.install_final_guard(entity);
        }
        tracing::debug!(entity = %entity, kind = kind.as_str(), "entity kind declared");
        Ok(())
    }

    pub(crate) fn define_method(
        &self,
        ctx: DefinitionContext,
        entity: EntityId,
        def: MethodDef,
    ) -> Result<Option<MethodContract>, ContractError> {
        self.observer
            .on_method_defined(ctx, entity, def)
            .map_err(|e| self.rejected(e))
    }

    /// Remove a method from an entity. Removal is not validated.
    pub fn remove_method(&self, entity: EntityId, name: &str, is_static: bool) -> bool {
        self.observer.on_method_removed(entity, name, is_static)
    }

    /// Mix `module` into `target`. Returns `false` if it was already in the chain.
    pub fn include(&self, target: EntityId, module: EntityId) -> Result<bool, ContractError> {
        self.observer
            .check_includable(target, module)
            .map_err(|e| self.rejected(e))?;
        match self.model.include(target, module) {
            IncludeOutcome::Added => {
                tracing::debug!(target = %target, module = %module, "module included");
                Ok(true)
            }
            IncludeOutcome::AlreadyPresent => Ok(false),
            IncludeOutcome::Cyclic => {
                let target_name = self.name_of(target)?;
                let module_name = self.name_of(module)?;
                Err(self.rejected(ContractError::cyclic_include(&target_name, &module_name)))
            }
        }
    }

    // ── Coverage & instantiation ──────────────────────────────────────

    /// Construct an instance of `entity`.
    ///
    /// Abstract and interface entities are rejected outright. Anything else is
    /// checked for abstract coverage (once per model generation), and only
    /// classes produce instances.
    pub fn instantiate(&self, entity: EntityId) -> Result<Instance, ContractError> {
        let classes = self.observer.classes();
        classes
            .check_instantiable(entity)
            .map_err(|e| self.rejected(e))?;
        if self.config.coverage.check_on_instantiate {
            self.verify(entity)?;
        }
        classes
            .check_constructible(entity)
            .map_err(|e| self.rejected(e))?;
        Ok(Instance { class: entity })
    }

    /// Explicitly check coverage. Abstract and interface entities pass trivially.
    pub fn finalize(&self, entity: EntityId) -> Result<(), ContractError> {
        self.name_of(entity).map_err(|e| self.rejected(e))?;
        if self.store.get_entity_kind(entity).is_abstract_family() {
            return Ok(());
        }
        self.verify(entity)
    }

    fn verify(&self, entity: EntityId) -> Result<(), ContractError> {
        let generation = self.model.generation();
        let cache = self.config.coverage.cache_verified;
        if cache && self.verified.get(&entity).is_some_and(|g| *g == generation) {
            return Ok(());
        }

        let gaps = self.coverage.check(entity);
        if gaps.is_empty() {
            if cache {
                self.verified.insert(entity, generation);
            }
            tracing::debug!(entity = %entity, generation, "coverage verified");
            return Ok(());
        }
        let name = self.name_of(entity)?;
        Err(self.rejected(ContractError::MissingAbstractImplementation { entity: name, gaps }))
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn entity_kind(&self, entity: EntityId) -> EntityKind {
        self.store.get_entity_kind(entity)
    }

    pub fn method_contract(
        &self,
        entity: EntityId,
        name: &str,
        is_static: bool,
    ) -> Option<MethodContract> {
        self.store
            .get_method_contract(&MethodKey::new(entity, name, is_static))
    }

    pub fn ancestors(&self, entity: EntityId) -> AncestorView {
        self.model.ancestors(entity)
    }

    // ── Hooks ─────────────────────────────────────────────────────────

    pub fn register_inherited_hook(
        &self,
        entity: EntityId,
        hook: impl InheritanceHook + 'static,
    ) {
        self.observer.register_inherited_hook(entity, Arc::new(hook));
    }

    pub fn register_method_hook(&self, entity: EntityId, hook: Arc<dyn MethodHook>) {
        self.observer.register_method_hook(entity, hook);
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
