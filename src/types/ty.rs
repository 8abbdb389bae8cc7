//! # Core Type System Definitions
//!
//! This module defines the type representation used by the Dieter checker:
//! qualifier sets, base types, type variables, and procedure signatures.
//!
//! ## Overview
//!
//! A Dieter type is a pair of a qualifier set and a base type:
//!
//! ```text
//! beefy gnarly int        QualifierSet {beefy, gnarly} over BaseType::Int
//! map from ref to string  empty qualifier set over BaseType::Map
//! gnarly ♥t               QualifierSet {gnarly} over BaseType::Var(t)
//! ```
//!
//! ## Qualifier sets
//!
//! Qualifiers are set-like: commutative and idempotent. `gnarly beefy int`
//! and `beefy beefy gnarly int` denote the same type. [`QualifierSet`]
//! stores a sorted, deduplicated vector of names so that set equality is
//! plain structural equality and subset tests are simple scans.
//!
//! ## Type variables
//!
//! A type variable has a globally unique integer identity and an optional
//! source name (the `t` in `♥t`). Identities are freshly minted per
//! procedure *invocation*: every call-site resolution works on a renamed
//! copy of the callee's signature (see [`Signature::freshen`]), so bindings
//! from one call can never leak into another.
//!
//! ## Related Modules
//!
//! - [`crate::types::subst`] - Substitutions binding variables to types
//! - [`crate::types::unify`] - Directional unification over these types
//! - [`crate::types::check`] - The checker driving both

use std::fmt;

use lachs::Span;

/// A set of qualifier names.
///
/// Kept sorted and duplicate-free, so two sets are equal iff they denote
/// the same set of qualifiers. Sets are tiny in practice (a handful of
/// names), so a vector beats a hash set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QualifierSet(Vec<String>);

impl QualifierSet {
    /// The empty qualifier set (a "bare" type).
    pub fn empty() -> Self {
        QualifierSet(Vec::new())
    }

    /// Build a set from arbitrary names; duplicates and order are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = QualifierSet::empty();
        for name in names {
            set.insert(name.into());
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.binary_search_by(|q| q.as_str().cmp(name)).is_ok()
    }

    /// Insert a name, keeping the set sorted. Inserting an existing name is
    /// a no-op (idempotence).
    pub fn insert(&mut self, name: String) {
        if let Err(pos) = self.0.binary_search(&name) {
            self.0.insert(pos, name);
        }
    }

    /// `self ⊆ other`
    pub fn is_subset(&self, other: &QualifierSet) -> bool {
        self.0.iter().all(|q| other.contains(q))
    }

    /// `self ⊇ other`
    pub fn is_superset(&self, other: &QualifierSet) -> bool {
        other.is_subset(self)
    }

    /// `self ∪ other`
    pub fn union(&self, other: &QualifierSet) -> QualifierSet {
        let mut result = self.clone();
        for q in &other.0 {
            result.insert(q.clone());
        }
        result
    }

    /// `self \ other`
    pub fn difference(&self, other: &QualifierSet) -> QualifierSet {
        QualifierSet(
            self.0
                .iter()
                .filter(|q| !other.contains(q))
                .cloned()
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|q| q.as_str())
    }
}

/// Type variable with a unique identity.
///
/// # Fields
///
/// * `id` - Globally unique identifier, minted by the checker's counter
/// * `name` - Source name for pretty printing (the `t` in `♥t`), if any
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub id: usize,
    pub name: Option<String>,
}

impl TypeVar {
    pub fn new(id: usize) -> Self {
        Self { id, name: None }
    }

    pub fn with_name(id: usize, name: String) -> Self {
        Self {
            id,
            name: Some(name),
        }
    }
}

/// The bare part of a type, without qualifiers.
///
/// # Variants
///
/// * `Bool`, `Int`, `Rat`, `String`, `Ref`, `Void` - primitives
/// * `Map` - `map [from K] to V`; `key: None` is the unspecified-key
///   "mixin" map, which on the receptor side accepts any key type
/// * `Var` - a type variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Bool,
    Int,
    Rat,
    String,
    Ref,
    Void,
    Map {
        key: Option<Box<Type>>,
        value: Box<Type>,
    },
    Var(TypeVar),
}

/// A Dieter type: qualifier set plus base type.
///
/// # Examples
///
/// ```text
/// Type::bare(BaseType::Int)                      // int
/// Type::bare(BaseType::Int).qualify("gnarly")    // gnarly int
/// Type::new(QualifierSet::from_names(["beefy", "gnarly"]), BaseType::Int)
///                                                // beefy gnarly int
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub quals: QualifierSet,
    pub base: BaseType,
}

impl Type {
    pub fn new(quals: QualifierSet, base: BaseType) -> Self {
        Type { quals, base }
    }

    /// A type with no qualifiers.
    pub fn bare(base: BaseType) -> Self {
        Type {
            quals: QualifierSet::empty(),
            base,
        }
    }

    /// A map type. `key: None` produces the unspecified-key form.
    pub fn map(key: Option<Type>, value: Type) -> Self {
        Type::bare(BaseType::Map {
            key: key.map(Box::new),
            value: Box::new(value),
        })
    }

    /// Returns this type with the given qualifier added. Adding a qualifier
    /// the type already carries is a no-op.
    pub fn qualify(&self, qualifier: &str) -> Type {
        let mut quals = self.quals.clone();
        quals.insert(qualifier.to_string());
        Type {
            quals,
            base: self.base.clone(),
        }
    }

    /// Structural equality up to a consistent renaming of type variables.
    ///
    /// Used for return-type coherence: `foo(♥t): ♥t` and `foo(int): ♥u`
    /// declare the same return type even though the variable identities
    /// differ.
    pub fn equal_modulo_vars(&self, other: &Type) -> bool {
        fn go(a: &Type, b: &Type, pairs: &mut Vec<(usize, usize)>) -> bool {
            if a.quals != b.quals {
                return false;
            }
            match (&a.base, &b.base) {
                (BaseType::Var(va), BaseType::Var(vb)) => {
                    for (l, r) in pairs.iter() {
                        if *l == va.id || *r == vb.id {
                            return *l == va.id && *r == vb.id;
                        }
                    }
                    pairs.push((va.id, vb.id));
                    true
                }
                (BaseType::Map { key: ka, value: va }, BaseType::Map { key: kb, value: vb }) => {
                    let keys_match = match (ka, kb) {
                        (Some(ka), Some(kb)) => go(ka, kb, pairs),
                        (None, None) => true,
                        _ => false,
                    };
                    keys_match && go(va, vb, pairs)
                }
                (l, r) => l == r,
            }
        }
        go(self, other, &mut Vec::new())
    }

    /// Convert this type to the surface notation it was written in.
    ///
    /// # Examples
    ///
    /// ```text
    /// int
    /// beefy gnarly int
    /// map from person ref to string
    /// gnarly ♥t
    /// ```
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for qual in self.quals.iter() {
            out.push_str(qual);
            out.push(' ');
        }
        match &self.base {
            BaseType::Bool => out.push_str("bool"),
            BaseType::Int => out.push_str("int"),
            BaseType::Rat => out.push_str("rat"),
            BaseType::String => out.push_str("string"),
            BaseType::Ref => out.push_str("ref"),
            BaseType::Void => out.push_str("void"),
            BaseType::Map { key, value } => {
                out.push_str("map ");
                if let Some(key) = key {
                    out.push_str("from ");
                    out.push_str(&key.pretty());
                    out.push(' ');
                }
                out.push_str("to ");
                out.push_str(&value.pretty());
            }
            BaseType::Var(v) => {
                if let Some(name) = &v.name {
                    out.push('♥');
                    out.push_str(name);
                } else {
                    out.push_str(&format!("♥t{}", v.id));
                }
            }
        }
        out
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

/// A procedure signature: one dispatch candidate.
///
/// Multiple signatures may share a name (the dispatch set); they are kept
/// in declaration order in the procedure table, and `id` is the global
/// insertion index used to identify a candidate in a dispatch chain.
#[derive(Debug, Clone)]
pub struct Signature {
    pub id: usize,
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    /// Module the declaration appeared in; `None` for forwards.
    pub module: Option<String>,
    pub position: Span,
}

impl Signature {
    /// Returns a copy of this signature with every type variable replaced
    /// by a freshly minted identity, consistently across parameters and
    /// return type. Called once per candidate per call-site resolution.
    pub fn freshen(&self, next_id: &mut usize) -> Signature {
        fn go(ty: &Type, next_id: &mut usize, renames: &mut Vec<(usize, TypeVar)>) -> Type {
            match &ty.base {
                BaseType::Var(v) => {
                    let fresh = match renames.iter().find(|(old, _)| *old == v.id) {
                        Some((_, fresh)) => fresh.clone(),
                        None => {
                            let fresh = TypeVar {
                                id: *next_id,
                                name: v.name.clone(),
                            };
                            *next_id += 1;
                            renames.push((v.id, fresh.clone()));
                            fresh
                        }
                    };
                    Type::new(ty.quals.clone(), BaseType::Var(fresh))
                }
                BaseType::Map { key, value } => Type::new(
                    ty.quals.clone(),
                    BaseType::Map {
                        key: key.as_ref().map(|k| Box::new(go(k, next_id, renames))),
                        value: Box::new(go(value, next_id, renames)),
                    },
                ),
                _ => ty.clone(),
            }
        }

        let mut renames: Vec<(usize, TypeVar)> = Vec::new();
        let params = self
            .params
            .iter()
            .map(|p| go(p, next_id, &mut renames))
            .collect();
        let return_type = go(&self.return_type, next_id, &mut renames);

        Signature {
            id: self.id,
            name: self.name.clone(),
            params,
            return_type,
            module: self.module.clone(),
            position: self.position.clone(),
        }
    }

    /// `name(T, ...): R` for diagnostics and the symbol-table dump.
    pub fn pretty(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.pretty()).collect();
        format!(
            "{}({}): {}",
            self.name,
            params.join(", "),
            self.return_type.pretty()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_span() -> Span {
        crate::lexer::lex("x").expect("lexing failed")[0].pos()
    }

    #[test]
    fn test_qualifier_set_deduplicates() {
        let set = QualifierSet::from_names(["gnarly", "gnarly", "beefy"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("gnarly"));
        assert!(set.contains("beefy"));
    }

    #[test]
    fn test_qualifier_set_order_irrelevant() {
        let a = QualifierSet::from_names(["beefy", "gnarly"]);
        let b = QualifierSet::from_names(["gnarly", "beefy"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_type_equality_is_set_equality() {
        let a = Type::new(QualifierSet::from_names(["a", "b"]), BaseType::Int);
        let b = Type::new(QualifierSet::from_names(["b", "a", "a"]), BaseType::Int);
        assert_eq!(a, b);

        let c = Type::new(QualifierSet::from_names(["a"]), BaseType::Int);
        assert_ne!(a, c);
    }

    #[test]
    fn test_subset_superset() {
        let small = QualifierSet::from_names(["gnarly"]);
        let big = QualifierSet::from_names(["beefy", "gnarly"]);
        assert!(small.is_subset(&big));
        assert!(big.is_superset(&small));
        assert!(!big.is_subset(&small));
    }

    #[test]
    fn test_union_difference() {
        let a = QualifierSet::from_names(["beefy", "gnarly"]);
        let b = QualifierSet::from_names(["gnarly", "spiky"]);
        assert_eq!(
            a.union(&b),
            QualifierSet::from_names(["beefy", "gnarly", "spiky"])
        );
        assert_eq!(a.difference(&b), QualifierSet::from_names(["beefy"]));
    }

    #[test]
    fn test_qualify_idempotent() {
        let ty = Type::bare(BaseType::Int).qualify("gnarly");
        let again = ty.qualify("gnarly");
        assert_eq!(ty, again);
    }

    #[test]
    fn test_pretty_print() {
        let ty = Type::new(QualifierSet::from_names(["gnarly", "beefy"]), BaseType::Int);
        assert_eq!(ty.pretty(), "beefy gnarly int");

        let map = Type::map(
            Some(Type::bare(BaseType::Ref).qualify("person")),
            Type::bare(BaseType::String),
        );
        assert_eq!(map.pretty(), "map from person ref to string");

        let var = Type::bare(BaseType::Var(TypeVar::with_name(0, "t".to_string())));
        assert_eq!(var.pretty(), "♥t");
    }

    #[test]
    fn test_equal_modulo_vars() {
        let t = Type::bare(BaseType::Var(TypeVar::new(0)));
        let u = Type::bare(BaseType::Var(TypeVar::new(7)));
        assert!(t.equal_modulo_vars(&u));

        let qualified = Type::bare(BaseType::Var(TypeVar::new(7))).qualify("gnarly");
        assert!(!t.equal_modulo_vars(&qualified));
    }

    #[test]
    fn test_equal_modulo_vars_consistent_renaming() {
        // map from ♥a to ♥a vs map from ♥x to ♥y must not be equal
        let a = Type::bare(BaseType::Var(TypeVar::new(0)));
        let pair_same = Type::map(Some(a.clone()), a.clone());
        let pair_diff = Type::map(
            Some(Type::bare(BaseType::Var(TypeVar::new(1)))),
            Type::bare(BaseType::Var(TypeVar::new(2))),
        );
        assert!(!pair_same.equal_modulo_vars(&pair_diff));
        assert!(pair_same.equal_modulo_vars(&pair_same.clone()));
    }

    #[test]
    fn test_freshen_renames_consistently() {
        let t = TypeVar::with_name(0, "t".to_string());
        let sig = Signature {
            id: 0,
            name: "glunt".to_string(),
            params: vec![Type::new(
                QualifierSet::from_names(["beefy", "gnarly"]),
                BaseType::Var(t.clone()),
            )],
            return_type: Type::new(QualifierSet::from_names(["gnarly"]), BaseType::Var(t)),
            module: None,
            position: some_span(),
        };

        let mut next = 10;
        let fresh = sig.freshen(&mut next);
        assert_eq!(next, 11);

        let param_var = match &fresh.params[0].base {
            BaseType::Var(v) => v.clone(),
            other => panic!("expected var, got {:?}", other),
        };
        let ret_var = match &fresh.return_type.base {
            BaseType::Var(v) => v.clone(),
            other => panic!("expected var, got {:?}", other),
        };
        assert_eq!(param_var.id, 10);
        assert_eq!(param_var, ret_var);
        assert_eq!(param_var.name.as_deref(), Some("t"));
    }
}
