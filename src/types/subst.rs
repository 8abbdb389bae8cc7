//! # Substitutions
//!
//! A substitution maps type-variable identities to types. It is the working
//! state of one unification episode: created fresh at each call site,
//! assignment, or indexed read/write, extended while that site is checked,
//! and discarded afterwards. Nothing persists across sites.
//!
//! ## Application and normalization
//!
//! Applying a substitution replaces every bound variable by its binding and
//! *normalizes qualifiers*: when `(Q, ♥i)` is replaced and `i` is bound to
//! `(Qᵢ, Bᵢ)`, the result is `(Q ∪ Qᵢ, Bᵢ)`: the use site keeps the
//! qualifiers it wrote, and the binding contributes the rest.
//!
//! ```text
//! σ = { t := int }
//! apply(gnarly ♥t)  =  gnarly int
//!
//! σ = { t := gnarly int }
//! apply(beefy ♥t)   =  beefy gnarly int
//! ```
//!
//! ## Resolution and path compression
//!
//! Variables may be bound to types whose base is again a variable. The
//! unifier only ever looks at fully resolved types, so [`Substitution::resolve`]
//! chases such chains and, union-find style, rewrites every binding it
//! passes through to point directly at the end of the chain. Qualifiers
//! collected along the chain are preserved in the compressed binding.
//!
//! ## Re-binding
//!
//! Unlike a classical Hindley-Milner substitution, a binding here is not
//! final: the unifier may *loosen* a variable to a strictly less qualified
//! type mid-pass (see [`crate::types::unify`]). [`Substitution::rebind`]
//! is that overwrite. Tightening never replaces a binding.
//!
//! ## Related Modules
//!
//! - [`crate::types::ty`] - The types being substituted
//! - [`crate::types::unify`] - Produces and consumes substitutions

use std::collections::HashMap;

use super::ty::{BaseType, Type};

/// A substitution mapping type-variable identities to types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Substitution(HashMap<usize, Type>);

impl Substitution {
    /// Create an empty substitution.
    pub fn empty() -> Self {
        Substitution(HashMap::new())
    }

    /// The binding for a variable, if any. Not resolved; most callers want
    /// [`Substitution::resolve`] instead.
    pub fn lookup(&self, id: usize) -> Option<&Type> {
        self.0.get(&id)
    }

    pub fn is_bound(&self, id: usize) -> bool {
        self.0.contains_key(&id)
    }

    /// Record a first binding for a variable.
    pub fn bind(&mut self, id: usize, ty: Type) {
        self.0.insert(id, ty);
    }

    /// Replace an existing binding with a less qualified one.
    ///
    /// The caller (the unifier) is responsible for only loosening here:
    /// the new type's qualifiers must be a strict subset of the old ones.
    pub fn rebind(&mut self, id: usize, ty: Type) {
        self.0.insert(id, ty);
    }

    /// Resolve a type's top-level variable chain through this substitution.
    ///
    /// Returns the type with its base no longer a *bound* variable, its
    /// qualifier set the union of the site's qualifiers and every binding
    /// passed through. Bindings along the chain are compressed to point at
    /// the final type, so later lookups are O(1).
    pub fn resolve(&mut self, ty: &Type) -> Type {
        if let BaseType::Var(v) = &ty.base {
            if let Some(resolved) = self.resolve_var(v.id) {
                return Type::new(ty.quals.union(&resolved.quals), resolved.base);
            }
        }
        ty.clone()
    }

    /// Fully resolved binding of a variable, compressing as a side effect.
    fn resolve_var(&mut self, id: usize) -> Option<Type> {
        let bound = self.0.get(&id)?.clone();
        let resolved = self.resolve(&bound);
        self.0.insert(id, resolved.clone());
        Some(resolved)
    }

    /// Apply this substitution to a type, recursively and with qualifier
    /// normalization (see the module docs).
    pub fn apply(&self, ty: &Type) -> Type {
        match &ty.base {
            BaseType::Var(v) => match self.0.get(&v.id) {
                Some(bound) => {
                    let inner = self.apply(bound);
                    Type::new(ty.quals.union(&inner.quals), inner.base)
                }
                None => ty.clone(),
            },
            BaseType::Map { key, value } => Type::new(
                ty.quals.clone(),
                BaseType::Map {
                    key: key.as_ref().map(|k| Box::new(self.apply(k))),
                    value: Box::new(self.apply(value)),
                },
            ),
            _ => ty.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ty::{QualifierSet, TypeVar};

    fn var(id: usize) -> Type {
        Type::bare(BaseType::Var(TypeVar::new(id)))
    }

    #[test]
    fn test_empty_substitution() {
        let subst = Substitution::empty();
        assert_eq!(subst.apply(&Type::bare(BaseType::Int)), Type::bare(BaseType::Int));
        assert_eq!(subst.apply(&var(0)), var(0));
    }

    #[test]
    fn test_apply_unions_qualifiers() {
        let mut subst = Substitution::empty();
        subst.bind(0, Type::bare(BaseType::Int).qualify("gnarly"));

        let site = var(0).qualify("beefy");
        let applied = subst.apply(&site);
        assert_eq!(
            applied,
            Type::new(
                QualifierSet::from_names(["beefy", "gnarly"]),
                BaseType::Int
            )
        );
    }

    #[test]
    fn test_apply_recurses_into_maps() {
        let mut subst = Substitution::empty();
        subst.bind(0, Type::bare(BaseType::String));

        let map = Type::map(Some(Type::bare(BaseType::Ref)), var(0));
        let applied = subst.apply(&map);
        assert_eq!(
            applied,
            Type::map(Some(Type::bare(BaseType::Ref)), Type::bare(BaseType::String))
        );
    }

    #[test]
    fn test_resolve_chases_chains() {
        let mut subst = Substitution::empty();
        subst.bind(0, var(1).qualify("gnarly"));
        subst.bind(1, Type::bare(BaseType::Int).qualify("beefy"));

        let resolved = subst.resolve(&var(0));
        assert_eq!(
            resolved,
            Type::new(
                QualifierSet::from_names(["beefy", "gnarly"]),
                BaseType::Int
            )
        );

        // chain is compressed: 0 now points straight at beefy gnarly int
        assert_eq!(
            subst.lookup(0),
            Some(&Type::new(
                QualifierSet::from_names(["beefy", "gnarly"]),
                BaseType::Int
            ))
        );
    }

    #[test]
    fn test_resolve_keeps_site_qualifiers() {
        let mut subst = Substitution::empty();
        subst.bind(0, Type::bare(BaseType::Int));

        let site = var(0).qualify("spiky");
        assert_eq!(
            subst.resolve(&site),
            Type::bare(BaseType::Int).qualify("spiky")
        );
    }

    #[test]
    fn test_resolve_unbound_is_identity() {
        let mut subst = Substitution::empty();
        let site = var(3).qualify("gnarly");
        assert_eq!(subst.resolve(&site), site);
    }

    #[test]
    fn test_rebind_overwrites() {
        let mut subst = Substitution::empty();
        subst.bind(0, Type::bare(BaseType::Int).qualify("gnarly"));
        subst.rebind(0, Type::bare(BaseType::Int));
        assert_eq!(subst.apply(&var(0)), Type::bare(BaseType::Int));
    }
}
