//! Host object model.
//!
//! Entities (classes and modules) are nodes of a `petgraph` digraph. Edges
//! point from an entity to its superclass or to a module it includes; edge
//! indices grow with insertion, which gives inclusion order for free.
//! Contracts are NOT stored here, see [`crate::store`].

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::signature::ParamShape;
use crate::types::{EntityFlavor, EntityId, Visibility};

/// Relation between two entities in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Superclass,
    Include,
}

/// A method as the host object system sees it: no contract attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub is_static: bool,
    pub visibility: Visibility,
    pub shape: ParamShape,
}

#[derive(Debug, Clone)]
pub struct EntityNode {
    pub name: String,
    pub flavor: EntityFlavor,
    /// Definition order; a redefinition keeps the original slot.
    pub methods: Vec<MethodDef>,
}

/// Result of [`ObjectModel::include`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeOutcome {
    Added,
    AlreadyPresent,
    Cyclic,
}

/// Read-only linearization of an entity's ancestors, nearest first.
/// The entity itself is always at position 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorView {
    entities: Vec<EntityId>,
}

impl AncestorView {
    pub fn owner(&self) -> EntityId {
        self.entities[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// Ancestors only, excluding the owner.
    pub fn strict(&self) -> &[EntityId] {
        &self.entities[1..]
    }

    pub fn as_slice(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn position(&self, entity: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| *e == entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ObjectModel {
    graph: RwLock<DiGraph<EntityNode, Relation>>,
    generation: AtomicU64,
}

fn node(id: EntityId) -> NodeIndex {
    NodeIndex::new(id.index())
}

fn entity(ix: NodeIndex) -> EntityId {
    EntityId(ix.index() as u32)
}

fn related(
    graph: &DiGraph<EntityNode, Relation>,
    id: EntityId,
    relation: Relation,
) -> Vec<EntityId> {
    let mut edges: Vec<_> = graph
        .edges_directed(node(id), Direction::Outgoing)
        .filter(|e| *e.weight() == relation)
        .map(|e| (e.id(), entity(e.target())))
        .collect();
    edges.sort_by_key(|(ix, _)| *ix);
    edges.into_iter().map(|(_, target)| target).collect()
}

fn linearize(graph: &DiGraph<EntityNode, Relation>, id: EntityId, out: &mut Vec<EntityId>) {
    out.push(id);
    for module in related(graph, id, Relation::Include).into_iter().rev() {
        linearize(graph, module, out);
    }
    if let Some(parent) = related(graph, id, Relation::Superclass).first() {
        linearize(graph, *parent, out);
    }
}

/// Keep only the last occurrence of each entity.
fn dedup_keep_last(chain: Vec<EntityId>) -> Vec<EntityId> {
    let mut seen = std::collections::HashSet::new();
    let mut kept: Vec<EntityId> = chain.into_iter().rev().filter(|e| seen.insert(*e)).collect();
    kept.reverse();
    kept
}

impl ObjectModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped by every structural change.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Create an entity. The caller is responsible for running inheritance
    /// hooks before committing a subclass.
    pub fn add_entity(
        &self,
        name: &str,
        flavor: EntityFlavor,
        superclass: Option<EntityId>,
    ) -> EntityId {
        let mut graph = self.graph.write();
        let ix = graph.add_node(EntityNode {
            name: name.to_string(),
            flavor,
            methods: Vec::new(),
        });
        if let Some(parent) = superclass {
            graph.add_edge(ix, node(parent), Relation::Superclass);
        }
        drop(graph);
        self.bump();
        entity(ix)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        id.index() < self.graph.read().node_count()
    }

    pub fn entity_count(&self) -> usize {
        self.graph.read().node_count()
    }

    pub fn name(&self, id: EntityId) -> Option<String> {
        self.graph.read().node_weight(node(id)).map(|n| n.name.clone())
    }

    pub fn flavor(&self, id: EntityId) -> Option<EntityFlavor> {
        self.graph.read().node_weight(node(id)).map(|n| n.flavor)
    }

    pub fn superclass(&self, id: EntityId) -> Option<EntityId> {
        related(&self.graph.read(), id, Relation::Superclass)
            .first()
            .copied()
    }

    /// Included modules in inclusion order.
    pub fn includes(&self, id: EntityId) -> Vec<EntityId> {
        related(&self.graph.read(), id, Relation::Include)
    }

    /// `[id, parent, grandparent, ...]` following superclass edges only.
    pub fn superclass_chain(&self, id: EntityId) -> Vec<EntityId> {
        let graph = self.graph.read();
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = related(&graph, current, Relation::Superclass).first() {
            chain.push(*parent);
            current = *parent;
        }
        chain
    }

    /// Mix `module` into `target`. Modules already in the chain are skipped.
    pub fn include(&self, target: EntityId, module: EntityId) -> IncludeOutcome {
        let mut graph = self.graph.write();
        let mut module_chain = Vec::new();
        linearize(&graph, module, &mut module_chain);
        if module_chain.contains(&target) {
            return IncludeOutcome::Cyclic;
        }
        let mut target_chain = Vec::new();
        linearize(&graph, target, &mut target_chain);
        if target_chain.contains(&module) {
            return IncludeOutcome::AlreadyPresent;
        }
        graph.add_edge(node(target), node(module), Relation::Include);
        drop(graph);
        self.bump();
        IncludeOutcome::Added
    }

    /// Instance-side method resolution order.
    pub fn ancestors(&self, id: EntityId) -> AncestorView {
        let graph = self.graph.read();
        let mut chain = Vec::new();
        linearize(&graph, id, &mut chain);
        AncestorView {
            entities: dedup_keep_last(chain),
        }
    }

    /// Static-side resolution order: the superclass chain only.
    pub fn static_ancestors(&self, id: EntityId) -> AncestorView {
        AncestorView {
            entities: self.superclass_chain(id),
        }
    }

    /// Ancestor view matching the side a method lives on.
    pub fn ancestors_for(&self, id: EntityId, is_static: bool) -> AncestorView {
        if is_static {
            self.static_ancestors(id)
        } else {
            self.ancestors(id)
        }
    }

    /// Record a method definition. Redefinition replaces the previous body in place.
    pub fn add_method(&self, id: EntityId, def: MethodDef) {
        let mut graph = self.graph.write();
        let Some(slot) = graph.node_weight_mut(node(id)) else {
            return;
        };
        match slot
            .methods
            .iter_mut()
            .find(|m| m.name == def.name && m.is_static == def.is_static)
        {
            Some(existing) => *existing = def,
            None => slot.methods.push(def),
        }
        drop(graph);
        self.bump();
    }

    pub fn remove_method(&self, id: EntityId, name: &str, is_static: bool) -> bool {
        let mut graph = self.graph.write();
        let Some(slot) = graph.node_weight_mut(node(id)) else {
            return false;
        };
        let before = slot.methods.len();
        slot.methods
            .retain(|m| !(m.name == name && m.is_static == is_static));
        let removed = slot.methods.len() != before;
        drop(graph);
        if removed {
            self.bump();
        }
        removed
    }

    pub fn method(&self, id: EntityId, name: &str, is_static: bool) -> Option<MethodDef> {
        self.graph.read().node_weight(node(id)).and_then(|n| {
            n.methods
                .iter()
                .find(|m| m.name == name && m.is_static == is_static)
                .cloned()
        })
    }

    /// Methods defined directly on `id`, in definition order.
    pub fn methods(&self, id: EntityId) -> Vec<MethodDef> {
        self.graph
            .read()
            .node_weight(node(id))
            .map(|n| n.methods.clone())
            .unwrap_or_default()
    }
}
