//! Contract violation taxonomy.
//!
//! Every rejected declaration, definition, subclassing, or instantiation
//! surfaces as a [`ContractError`]. Message text is part of the public
//! contract, so all messages are built by the constructors in this module.

use serde::{Deserialize, Serialize};

use crate::types::EntityKind;

/// Errors produced by the contract enforcement engine.
///
/// All variants are fatal to the operation that produced them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("{message}")]
    InvalidDeclarationTarget { entity: String, message: String },

    #[error("{message}")]
    DuplicateDeclaration { entity: String, message: String },

    #[error("{message}")]
    ConflictingDeclaration { entity: String, message: String },

    #[error("{message}")]
    FinalViolation { entity: String, message: String },

    #[error("{message}")]
    InterfaceViolation { entity: String, message: String },

    #[error("{message}")]
    OverrideViolation { entity: String, message: String },

    #[error("{message}")]
    AbstractInstantiation { entity: String, message: String },

    #[error("{}", render_gaps(.gaps))]
    MissingAbstractImplementation {
        entity: String,
        gaps: Vec<CoverageGap>,
    },

    #[error("{message}")]
    DanglingDeclaration { entity: String, message: String },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
}

/// One hole found by the abstract coverage scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoverageGap {
    /// No concrete definition anywhere closer than the abstract declaration.
    Missing { method: String },
    /// A concrete definition exists but rejects arguments the abstract accepts.
    ShapeMismatch {
        method: String,
        implemented_in: String,
        detail: String,
    },
}

impl CoverageGap {
    /// Qualified name of the abstract method this gap refers to.
    pub fn method(&self) -> &str {
        match self {
            CoverageGap::Missing { method } => method,
            CoverageGap::ShapeMismatch { method, .. } => method,
        }
    }
}

impl std::fmt::Display for CoverageGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageGap::Missing { method } => {
                write!(f, "Missing definition for abstract method `{method}`")
            }
            CoverageGap::ShapeMismatch {
                method,
                implemented_in,
                detail,
            } => write!(
                f,
                "Implementation of abstract method `{method}` in {implemented_in} does not accept \
                 the argument shape declared by abstract: {detail}"
            ),
        }
    }
}

fn render_gaps(gaps: &[CoverageGap]) -> String {
    gaps.iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ContractError {
    /// Stable code for the violation class.
    pub fn code(&self) -> &'static str {
        match self {
            ContractError::InvalidDeclarationTarget { .. } => "T001",
            ContractError::DuplicateDeclaration { .. } => "T002",
            ContractError::ConflictingDeclaration { .. } => "T003",
            ContractError::FinalViolation { .. } => "T004",
            ContractError::InterfaceViolation { .. } => "T005",
            ContractError::OverrideViolation { .. } => "T006",
            ContractError::AbstractInstantiation { .. } => "T007",
            ContractError::MissingAbstractImplementation { .. } => "T008",
            ContractError::DanglingDeclaration { .. } => "T009",
            ContractError::UnknownEntity(_) => "T010",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            ContractError::InvalidDeclarationTarget { .. } => "invalid_declaration_target",
            ContractError::DuplicateDeclaration { .. } => "duplicate_declaration",
            ContractError::ConflictingDeclaration { .. } => "conflicting_declaration",
            ContractError::FinalViolation { .. } => "final_violation",
            ContractError::InterfaceViolation { .. } => "interface_violation",
            ContractError::OverrideViolation { .. } => "override_violation",
            ContractError::AbstractInstantiation { .. } => "abstract_instantiation",
            ContractError::MissingAbstractImplementation { .. } => {
                "missing_abstract_implementation"
            }
            ContractError::DanglingDeclaration { .. } => "dangling_declaration",
            ContractError::UnknownEntity(_) => "unknown_entity",
        }
    }

    /// Name of the entity the violation is reported against.
    pub fn entity(&self) -> &str {
        match self {
            ContractError::InvalidDeclarationTarget { entity, .. }
            | ContractError::DuplicateDeclaration { entity, .. }
            | ContractError::ConflictingDeclaration { entity, .. }
            | ContractError::FinalViolation { entity, .. }
            | ContractError::InterfaceViolation { entity, .. }
            | ContractError::OverrideViolation { entity, .. }
            | ContractError::AbstractInstantiation { entity, .. }
            | ContractError::MissingAbstractImplementation { entity, .. }
            | ContractError::DanglingDeclaration { entity, .. } => entity,
            ContractError::UnknownEntity(id) => id,
        }
    }

    // -- Entity-level declarations --

    pub fn not_a_class_for_final(entity: &str) -> Self {
        ContractError::InvalidDeclarationTarget {
            entity: entity.to_string(),
            message: format!("{entity} is not a class or method and cannot be declared as final"),
        }
    }

    pub fn interface_on_class(entity: &str) -> Self {
        ContractError::InvalidDeclarationTarget {
            entity: entity.to_string(),
            message: format!(
                "{entity} is a class; classes can't be interfaces. \
                 Use `abstract!` instead of `interface!`"
            ),
        }
    }

    pub fn redeclared(entity: &str, existing: EntityKind, requested: EntityKind) -> Self {
        ContractError::DuplicateDeclaration {
            entity: entity.to_string(),
            message: format!(
                "{entity} was already declared as {existing} and cannot be re-declared as {requested}"
            ),
        }
    }

    pub fn conflicting_kind(entity: &str, existing: EntityKind, requested: EntityKind) -> Self {
        ContractError::ConflictingDeclaration {
            entity: entity.to_string(),
            message: format!(
                "{entity} was already declared as {existing} and cannot be declared as {requested}"
            ),
        }
    }

    // -- Method-level declarations --

    pub fn final_method_on_module(entity: &str, method: &str) -> Self {
        ContractError::InvalidDeclarationTarget {
            entity: entity.to_string(),
            message: format!(
                "{entity} is not a class and its method `{method}` cannot be declared as final"
            ),
        }
    }

    pub fn abstract_static_on_module(entity: &str, method: &str) -> Self {
        ContractError::InvalidDeclarationTarget {
            entity: entity.to_string(),
            message: format!(
                "{entity} is a module; its static method `{method}` cannot be declared as abstract"
            ),
        }
    }

    pub fn pending_twice(entity: &str) -> Self {
        ContractError::DuplicateDeclaration {
            entity: entity.to_string(),
            message: format!(
                "{entity}: you called `sig` twice without declaring a method in between"
            ),
        }
    }

    pub fn final_class_and_method(entity: &str, method: &str) -> Self {
        ContractError::ConflictingDeclaration {
            entity: entity.to_string(),
            message: format!(
                "{entity} was declared as final and its method `{method}` cannot also be declared as final"
            ),
        }
    }

    pub fn dangling(entity: &str, mode: &str) -> Self {
        ContractError::DanglingDeclaration {
            entity: entity.to_string(),
            message: format!(
                "{entity} declared a `{mode}` method contract that no method definition consumed"
            ),
        }
    }

    // -- Final enforcement --

    pub fn final_inherited(parent: &str) -> Self {
        ContractError::FinalViolation {
            entity: parent.to_string(),
            message: format!("{parent} was declared as final and cannot be inherited from"),
        }
    }

    pub fn final_redefined(entity: &str, method: &str) -> Self {
        ContractError::FinalViolation {
            entity: entity.to_string(),
            message: format!("The method `{method}` was declared as final and cannot be redefined"),
        }
    }

    pub fn final_overridden(entity: &str, method: &str) -> Self {
        ContractError::FinalViolation {
            entity: entity.to_string(),
            message: format!(
                "The method `{method}` was declared as final and cannot be overridden in {entity}"
            ),
        }
    }

    // -- Interface / override --

    pub fn interface_method_not_abstract(entity: &str, method: &str) -> Self {
        ContractError::InterfaceViolation {
            entity: entity.to_string(),
            message: format!(
                "{entity} is an interface and `{method}` is not abstract: \
                 all methods in an interface must be declared abstract"
            ),
        }
    }

    pub fn override_without_ancestor(entity: &str, method: &str) -> Self {
        ContractError::OverrideViolation {
            entity: entity.to_string(),
            message: format!("`{method}` used `override` but no ancestor method found"),
        }
    }

    pub fn override_of_abstract(entity: &str, method: &str, abstract_method: &str) -> Self {
        ContractError::OverrideViolation {
            entity: entity.to_string(),
            message: format!(
                "`{method}` used `override` but `{abstract_method}` is abstract; \
                 abstract methods must be implemented with `implementation`, not overridden"
            ),
        }
    }

    // -- Instantiation --

    pub fn abstract_instantiation(entity: &str, kind: EntityKind) -> Self {
        ContractError::AbstractInstantiation {
            entity: entity.to_string(),
            message: format!("{entity} is declared as {kind}; it cannot be instantiated"),
        }
    }

    pub fn module_not_instantiable(entity: &str) -> Self {
        ContractError::InvalidDeclarationTarget {
            entity: entity.to_string(),
            message: format!("{entity} is a module and cannot be instantiated"),
        }
    }

    pub fn include_non_module(target: &str, included: &str) -> Self {
        ContractError::InvalidDeclarationTarget {
            entity: included.to_string(),
            message: format!("{included} is a class and cannot be included into {target}"),
        }
    }

    pub fn superclass_not_class(child: &str, parent: &str) -> Self {
        ContractError::InvalidDeclarationTarget {
            entity: parent.to_string(),
            message: format!("{parent} is a module and cannot be the superclass of {child}"),
        }
    }

    pub fn cyclic_include(target: &str, included: &str) -> Self {
        ContractError::InvalidDeclarationTarget {
            entity: included.to_string(),
            message: format!("cyclic include detected: {included} already includes {target}"),
        }
    }
}
