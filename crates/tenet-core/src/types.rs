use serde::{Deserialize, Serialize};

/// Identity of a class or module in the host object model.
///
/// Ids are handed out by [`ObjectModel`](crate::hierarchy::ObjectModel) and are
/// never reused for the lifetime of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What sort of construct an entity is in the host object model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityFlavor {
    Class,
    Module,
}

impl EntityFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityFlavor::Class => "class",
            EntityFlavor::Module => "module",
        }
    }
}

impl std::fmt::Display for EntityFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared contract of a class or module.
///
/// `Final` and the `Abstract`/`Interface` family are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    None,
    Abstract,
    Interface,
    Final,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::None => "none",
            EntityKind::Abstract => "abstract",
            EntityKind::Interface => "interface",
            EntityKind::Final => "final",
        }
    }

    /// Abstract and interface entities can never be instantiated directly.
    pub fn is_abstract_family(&self) -> bool {
        matches!(self, EntityKind::Abstract | EntityKind::Interface)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared role of a single method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodMode {
    #[default]
    None,
    Abstract,
    Final,
    Override,
    Implementation,
    OverridableImplementation,
}

impl MethodMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodMode::None => "none",
            MethodMode::Abstract => "abstract",
            MethodMode::Final => "final",
            MethodMode::Override => "override",
            MethodMode::Implementation => "implementation",
            MethodMode::OverridableImplementation => "overridable_implementation",
        }
    }

    /// Modes that supply a concrete body for an abstract ancestor.
    pub fn is_implementation(&self) -> bool {
        matches!(
            self,
            MethodMode::Implementation | MethodMode::OverridableImplementation
        )
    }
}

impl std::fmt::Display for MethodMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method visibility. Carried for completeness; contracts apply to every visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// Key of a method contract: (entity, method name, static flag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodKey {
    pub entity: EntityId,
    pub name: String,
    pub is_static: bool,
}

impl MethodKey {
    pub fn new(entity: EntityId, name: impl Into<String>, is_static: bool) -> Self {
        Self {
            entity,
            name: name.into(),
            is_static,
        }
    }
}

/// Contract attached to a class or module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityContract {
    pub entity: EntityId,
    pub kind: EntityKind,
}

/// Contract attached to a single method definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodContract {
    pub mode: MethodMode,
    pub declared_at: EntityId,
}

/// Render `Owner#name` for instance methods and `Owner.name` for static ones.
pub fn qualified_method(owner: &str, name: &str, is_static: bool) -> String {
    let sep = if is_static { '.' } else { '#' };
    format!("{owner}{sep}{name}")
}
