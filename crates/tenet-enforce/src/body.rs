//! Declaration builder for one lexical entity body.
//!
//! A body is opened on an entity, receives kind declarations, `sig` calls and
//! method definitions in source order, and is closed at the end. `sig` parks a
//! mode in the thread's pending slot; the next `def` consumes it.

use tenet_core::error::ContractError;
use tenet_core::hierarchy::MethodDef;
use tenet_core::signature::ParamShape;
use tenet_core::types::{EntityId, EntityKind, MethodMode, Visibility};

use crate::observer::DefinitionContext;
use crate::pending::{PendingDeclaration, PendingSlot};
use crate::runtime::ContractRuntime;

pub struct EntityBody<'rt> {
    runtime: &'rt ContractRuntime,
    entity: EntityId,
    name: String,
    /// `final_()` succeeded in this body.
    declared_final_here: bool,
}

impl<'rt> EntityBody<'rt> {
    pub(crate) fn new(runtime: &'rt ContractRuntime, entity: EntityId, name: String) -> Self {
        Self {
            runtime,
            entity,
            name,
            declared_final_here: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.entity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abstract_(&mut self) -> Result<&mut Self, ContractError> {
        self.runtime.declare_kind(self.entity, EntityKind::Abstract)?;
        Ok(self)
    }

    pub fn interface(&mut self) -> Result<&mut Self, ContractError> {
        self.runtime.declare_kind(self.entity, EntityKind::Interface)?;
        Ok(self)
    }

    pub fn final_(&mut self) -> Result<&mut Self, ContractError> {
        self.runtime.declare_kind(self.entity, EntityKind::Final)?;
        self.declared_final_here = true;
        Ok(self)
    }

    /// Attach `mode` to the next method defined in this body.
    pub fn sig(&mut self, mode: MethodMode) -> Result<&mut Self, ContractError> {
        PendingSlot::park(PendingDeclaration {
            runtime: self.runtime.id(),
            entity: self.entity,
            mode,
        })
        .map_err(|_| self.runtime.rejected(ContractError::pending_twice(&self.name)))?;
        Ok(self)
    }

    pub fn def(&mut self, name: &str, shape: ParamShape) -> Result<&mut Self, ContractError> {
        self.define(Visibility::Public, name, false, shape)
    }

    pub fn def_static(&mut self, name: &str, shape: ParamShape) -> Result<&mut Self, ContractError> {
        self.define(Visibility::Public, name, true, shape)
    }

    pub fn def_with(
        &mut self,
        visibility: Visibility,
        name: &str,
        shape: ParamShape,
    ) -> Result<&mut Self, ContractError> {
        self.define(visibility, name, false, shape)
    }

    /// Define a method. Any pending `sig` is consumed even if the definition
    /// is rejected.
    pub fn define(
        &mut self,
        visibility: Visibility,
        name: &str,
        is_static: bool,
        shape: ParamShape,
    ) -> Result<&mut Self, ContractError> {
        let ctx = DefinitionContext {
            runtime: self.runtime.id(),
            final_declared_in_body: self.declared_final_here,
        };
        let def = MethodDef {
            name: name.to_string(),
            is_static,
            visibility,
            shape,
        };
        self.runtime.define_method(ctx, self.entity, def)?;
        Ok(self)
    }

    pub fn include(&mut self, module: EntityId) -> Result<&mut Self, ContractError> {
        self.runtime.include(self.entity, module)?;
        Ok(self)
    }

    /// End the body. A `sig` that no definition consumed is an error.
    pub fn close(self) -> Result<EntityId, ContractError> {
        match PendingSlot::clear_for(self.runtime.id(), self.entity) {
            Some(pending) => Err(self
                .runtime
                .rejected(ContractError::dangling(&self.name, pending.mode.as_str()))),
            None => Ok(self.entity),
        }
    }
}

impl Drop for EntityBody<'_> {
    fn drop(&mut self) {
        PendingSlot::clear_for(self.runtime.id(), self.entity);
    }
}
