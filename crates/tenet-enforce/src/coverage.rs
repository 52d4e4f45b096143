//! Abstract coverage scan.
//!
//! For a concrete entity, every abstract method reachable through its
//! ancestor chain must be shadowed by a concrete definition that sits closer
//! to the entity. The nearest definition of each method name decides: if it
//! is abstract, the method is missing; otherwise its parameter shape is
//! compared against the nearest abstract declaration behind it.

use std::collections::HashSet;
use std::sync::Arc;

use tenet_core::error::CoverageGap;
use tenet_core::hierarchy::{AncestorView, MethodDef, ObjectModel};
use tenet_core::signature::ShapeComparator;
use tenet_core::store::ContractStore;
use tenet_core::types::{qualified_method, EntityId, MethodKey, MethodMode};

pub struct AbstractCoverageChecker {
    store: Arc<dyn ContractStore>,
    model: Arc<ObjectModel>,
    comparator: Arc<dyn ShapeComparator>,
    check_shapes: bool,
}

impl AbstractCoverageChecker {
    pub fn new(
        store: Arc<dyn ContractStore>,
        model: Arc<ObjectModel>,
        comparator: Arc<dyn ShapeComparator>,
        check_shapes: bool,
    ) -> Self {
        Self {
            store,
            model,
            comparator,
            check_shapes,
        }
    }

    /// All coverage gaps for `entity`: instance side first, then static side.
    /// Within a side, gaps follow the nearest declaring entity and then
    /// declaration order inside it.
    pub fn check(&self, entity: EntityId) -> Vec<CoverageGap> {
        let mut gaps = Vec::new();
        self.scan(&self.model.ancestors(entity), false, &mut gaps);
        self.scan(&self.model.static_ancestors(entity), true, &mut gaps);
        gaps
    }

    fn mode_of(&self, owner: EntityId, name: &str, is_static: bool) -> Option<MethodMode> {
        self.store
            .get_method_contract(&MethodKey::new(owner, name, is_static))
            .map(|c| c.mode)
    }

    fn scan(&self, view: &AncestorView, is_static: bool, gaps: &mut Vec<CoverageGap>) {
        let mut resolved: HashSet<String> = HashSet::new();
        for (pos, owner) in view.iter().enumerate() {
            let owner_name = self.model.name(owner).unwrap_or_default();
            for def in self.model.methods(owner) {
                if def.is_static != is_static || !resolved.insert(def.name.clone()) {
                    continue;
                }
                if self.mode_of(owner, &def.name, is_static) == Some(MethodMode::Abstract) {
                    gaps.push(CoverageGap::Missing {
                        method: qualified_method(&owner_name, &def.name, is_static),
                    });
                } else if self.check_shapes {
                    if let Some(gap) = self.compare_with_abstract(view, pos, &owner_name, &def) {
                        gaps.push(gap);
                    }
                }
            }
        }
    }

    /// Compare a concrete definition at `pos` against the nearest abstract
    /// declaration of the same method further up the chain.
    fn compare_with_abstract(
        &self,
        view: &AncestorView,
        pos: usize,
        implementer: &str,
        def: &MethodDef,
    ) -> Option<CoverageGap> {
        let (declarer, declared) = view.as_slice()[pos + 1..].iter().find_map(|&ancestor| {
            let declared = self.model.method(ancestor, &def.name, def.is_static)?;
            (self.mode_of(ancestor, &def.name, def.is_static) == Some(MethodMode::Abstract))
                .then_some((ancestor, declared))
        })?;
        let detail = self.comparator.compare(&declared.shape, &def.shape)?;
        let declarer_name = self.model.name(declarer).unwrap_or_default();
        Some(CoverageGap::ShapeMismatch {
            method: qualified_method(&declarer_name, &def.name, def.is_static),
            implemented_in: implementer.to_string(),
            detail,
        })
    }
}
