//! Parameter shapes and the shape-comparison seam.
//!
//! The signature component that owns argument and return types plugs in
//! through [`ShapeComparator`]. [`SplatShapeComparator`] covers the
//! arity-only rules and is what the runtime uses when nothing else is supplied.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Required,
    Optional,
    Rest,
    KeyRequired,
    KeyOptional,
    KeyRest,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

/// Ordered parameter list of a method definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamShape {
    pub params: Vec<Param>,
}

impl ParamShape {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, name: &str, kind: ParamKind) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            kind,
        });
        self
    }

    pub fn req(self, name: &str) -> Self {
        self.with(name, ParamKind::Required)
    }

    pub fn opt(self, name: &str) -> Self {
        self.with(name, ParamKind::Optional)
    }

    pub fn rest(self, name: &str) -> Self {
        self.with(name, ParamKind::Rest)
    }

    pub fn key_req(self, name: &str) -> Self {
        self.with(name, ParamKind::KeyRequired)
    }

    pub fn key(self, name: &str) -> Self {
        self.with(name, ParamKind::KeyOptional)
    }

    pub fn key_rest(self, name: &str) -> Self {
        self.with(name, ParamKind::KeyRest)
    }

    pub fn block(self, name: &str) -> Self {
        self.with(name, ParamKind::Block)
    }

    fn count(&self, kind: ParamKind) -> usize {
        self.params.iter().filter(|p| p.kind == kind).count()
    }

    fn first(&self, kind: ParamKind) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.name.as_str())
    }

    pub fn required_positional(&self) -> usize {
        self.count(ParamKind::Required)
    }

    pub fn total_positional(&self) -> usize {
        self.count(ParamKind::Required) + self.count(ParamKind::Optional)
    }

    pub fn rest_name(&self) -> Option<&str> {
        self.first(ParamKind::Rest)
    }

    pub fn key_rest_name(&self) -> Option<&str> {
        self.first(ParamKind::KeyRest)
    }

    fn keywords(&self, required_only: bool) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(move |p| {
                p.kind == ParamKind::KeyRequired
                    || (!required_only && p.kind == ParamKind::KeyOptional)
            })
            .map(|p| p.name.as_str())
    }

    fn accepts_keyword(&self, name: &str) -> bool {
        self.key_rest_name().is_some() || self.keywords(false).any(|k| k == name)
    }
}

/// Decides whether an implementation accepts every call the declaration accepts.
pub trait ShapeComparator: Send + Sync {
    /// `None` when compatible, otherwise a human-readable description of the mismatch.
    fn compare(&self, declared: &ParamShape, implementation: &ParamShape) -> Option<String>;
}

/// Arity, splat, and keyword compatibility rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplatShapeComparator;

impl ShapeComparator for SplatShapeComparator {
    fn compare(&self, declared: &ParamShape, implementation: &ParamShape) -> Option<String> {
        let mut problems = Vec::new();

        if let Some(rest) = declared.rest_name() {
            if implementation.rest_name().is_none() {
                problems.push(format!("missing positional splat `*{rest}`"));
            }
        }
        if let Some(key_rest) = declared.key_rest_name() {
            if implementation.key_rest_name().is_none() {
                problems.push(format!("missing keyword splat `**{key_rest}`"));
            }
        }

        let declared_req = declared.required_positional();
        let impl_req = implementation.required_positional();
        if impl_req > declared_req {
            problems.push(format!(
                "requires {impl_req} positional argument(s) but the declaration requires {declared_req}"
            ));
        }
        // A rest parameter absorbs any surplus positionals.
        if implementation.rest_name().is_none()
            && declared.rest_name().is_none()
            && implementation.total_positional() < declared.total_positional()
        {
            problems.push(format!(
                "accepts at most {} positional argument(s) but the declaration accepts {}",
                implementation.total_positional(),
                declared.total_positional()
            ));
        }

        for kw in declared.keywords(false) {
            if !implementation.accepts_keyword(kw) {
                problems.push(format!("missing keyword `{kw}:`"));
            }
        }
        for kw in implementation.keywords(true) {
            if !declared.keywords(true).any(|k| k == kw) {
                problems.push(format!("adds required keyword `{kw}:`"));
            }
        }

        if problems.is_empty() {
            None
        } else {
            Some(problems.join("; "))
        }
    }
}
