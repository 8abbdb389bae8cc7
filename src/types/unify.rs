//! Directional unification.
//!
//! `unify(receptor, provider, σ)` is *not* symmetric: the receptor is the
//! declared/expected side, the provider the supplied side, and the provider
//! must be at least as qualified as the receptor. A bound variable on the
//! receptor side may be re-bound to a strictly less qualified type when the
//! provider demands it; the earlier, more qualified binding was only a
//! conservative upper bound.

use std::fmt;

use log::debug;

use super::subst::Substitution;
use super::ty::{BaseType, QualifierSet, Type, TypeVar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifyError {
    /// The provider's qualifier set is not a superset of the receptor's.
    QualifierViolation {
        receptor: Type,
        provider: Type,
        missing: QualifierSet,
    },
    /// Base types disagree structurally.
    Mismatch { expected: Type, found: Type },
    /// A variable would be bound to a type containing itself.
    OccursCheck { var: TypeVar, ty: Type },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnifyError::QualifierViolation {
                receptor,
                provider,
                missing,
            } => {
                let missing: Vec<&str> = missing.iter().collect();
                write!(
                    f,
                    "qualifier-set violation: {} required, not present ({} cannot receive {})",
                    missing.join(" "),
                    receptor.pretty(),
                    provider.pretty()
                )
            }
            UnifyError::Mismatch { expected, found } => {
                write!(
                    f,
                    "type mismatch: expected {}, found {}",
                    expected.pretty(),
                    found.pretty()
                )
            }
            UnifyError::OccursCheck { var, ty } => {
                write!(
                    f,
                    "cannot construct infinite type: {} = {}",
                    Type::bare(BaseType::Var(var.clone())).pretty(),
                    ty.pretty()
                )
            }
        }
    }
}

fn occurs_in(id: usize, ty: &Type, subst: &Substitution) -> bool {
    match &ty.base {
        BaseType::Var(v) => {
            v.id == id
                || subst
                    .lookup(v.id)
                    .is_some_and(|bound| occurs_in(id, bound, subst))
        }
        BaseType::Map { key, value } => {
            key.as_ref().is_some_and(|k| occurs_in(id, k, subst))
                || occurs_in(id, value, subst)
        }
        _ => false,
    }
}

fn violation(receptor: &Type, provider: &Type) -> UnifyError {
    UnifyError::QualifierViolation {
        receptor: receptor.clone(),
        provider: provider.clone(),
        missing: receptor.quals.difference(&provider.quals),
    }
}

/// Unify the receptor with the provider, extending `subst`.
///
/// On success, applying `subst` to both sides yields types whose base types
/// agree and where the provider's qualifiers are a superset of the
/// receptor's. On failure `subst` may contain bindings from partial
/// progress; callers discard it (one substitution per site).
pub fn unify(receptor: &Type, provider: &Type, subst: &mut Substitution) -> Result<(), UnifyError> {
    debug!(
        "unifying {} (receptor) with {} (provider)",
        receptor.pretty(),
        provider.pretty()
    );

    // Bound receptor variable: unify against the dereferenced binding, and
    // if that fails only on qualifiers, loosen the binding (re-bind rule).
    if let BaseType::Var(v) = &receptor.base {
        if subst.is_bound(v.id) {
            let deref = subst.resolve(receptor);
            return match unify(&deref, provider, subst) {
                Err(err @ UnifyError::QualifierViolation { .. }) => {
                    rebind(v.id, &receptor.quals, provider, subst).ok_or(err)
                }
                other => other,
            };
        }
    }

    let r = subst.resolve(receptor);
    let p = subst.resolve(provider);

    match (&r.base, &p.base) {
        (BaseType::Var(rv), BaseType::Var(pv)) => {
            if !p.quals.is_superset(&r.quals) {
                return Err(violation(&r, &p));
            }
            if rv.id != pv.id {
                // receptor wins: the provider variable is narrowed to it
                subst.bind(pv.id, r.clone());
            }
            Ok(())
        }
        (BaseType::Var(rv), _) => {
            if !p.quals.is_superset(&r.quals) {
                return Err(violation(&r, &p));
            }
            if occurs_in(rv.id, &p, subst) {
                return Err(UnifyError::OccursCheck {
                    var: rv.clone(),
                    ty: p.clone(),
                });
            }
            // the variable carries the extra qualifiers the provider
            // supplied beyond what this site already wrote
            subst.bind(
                rv.id,
                Type::new(p.quals.difference(&r.quals), p.base.clone()),
            );
            Ok(())
        }
        (_, BaseType::Var(pv)) => {
            if occurs_in(pv.id, &r, subst) {
                return Err(UnifyError::OccursCheck {
                    var: pv.clone(),
                    ty: r.clone(),
                });
            }
            // unbound provider variable: absorbed into the receptor's type
            subst.bind(pv.id, r.clone());
            Ok(())
        }
        _ => {
            if !p.quals.is_superset(&r.quals) {
                return Err(violation(&r, &p));
            }
            match (&r.base, &p.base) {
                (
                    BaseType::Map { key: rk, value: rv },
                    BaseType::Map { key: pk, value: pv },
                ) => {
                    match (rk, pk) {
                        (Some(rk), Some(pk)) => unify(rk, pk, subst)?,
                        // unspecified-key receptor accepts any provider key
                        (None, _) => {}
                        (Some(_), None) => {
                            return Err(UnifyError::Mismatch {
                                expected: r.clone(),
                                found: p.clone(),
                            });
                        }
                    }
                    unify(rv, pv, subst)
                }
                (rb, pb) if rb == pb => Ok(()),
                _ => Err(UnifyError::Mismatch {
                    expected: r.clone(),
                    found: p.clone(),
                }),
            }
        }
    }
}

/// Attempt the re-binding rule for variable `id` whose dereferenced binding
/// was too qualified for `provider`. `site_quals` are the qualifiers
/// written at the receptor use site itself; the provider must still cover
/// those. Only loosening (a strictly smaller qualifier set over an agreeing
/// base) replaces the binding.
fn rebind(
    id: usize,
    site_quals: &QualifierSet,
    provider: &Type,
    subst: &mut Substitution,
) -> Option<()> {
    let p = subst.resolve(provider);
    if matches!(p.base, BaseType::Var(_)) {
        return None;
    }
    if !p.quals.is_superset(site_quals) {
        return None;
    }
    let old = subst.lookup(id)?.clone();
    let new_quals = p.quals.difference(site_quals);
    if !(new_quals.is_subset(&old.quals) && new_quals != old.quals) {
        return None;
    }
    if unify(
        &Type::bare(old.base.clone()),
        &Type::bare(p.base.clone()),
        subst,
    )
    .is_err()
    {
        return None;
    }
    debug!(
        "re-binding ♥t{} from {} to less qualified {}",
        id,
        old.pretty(),
        Type::new(new_quals.clone(), p.base.clone()).pretty()
    );
    subst.rebind(id, Type::new(new_quals, p.base));
    Some(())
}
