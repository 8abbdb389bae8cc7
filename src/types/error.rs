//! # Diagnostic Definitions
//!
//! This module defines the diagnostics the checker can report. Every
//! diagnostic carries a source [`Span`]; the `Display` implementation
//! renders the message with source context when the span has one.
//!
//! Diagnostics are values, never panics: the checker collects them and
//! keeps going with sibling declarations, so one run can surface several.
//!
//! ## Related Modules
//!
//! - [`crate::types::unify`] - Unification failures converted via
//!   [`TypeError::from_unify_error`]
//! - [`crate::types::check`] - The checker producing these

use std::fmt;

use lachs::Span;

use super::order::OrderingCycle;
use super::ty::{QualifierSet, Type, TypeVar};
use super::unify::UnifyError;

/// What sort of name a lookup failed on (or a duplicate collided on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Qualifier,
    Variable,
    Procedure,
    Module,
}

impl NameKind {
    fn describe(&self) -> &'static str {
        match self {
            NameKind::Qualifier => "qualifier",
            NameKind::Variable => "variable",
            NameKind::Procedure => "procedure",
            NameKind::Module => "module",
        }
    }
}

/// A diagnostic produced while checking a program.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    /// A qualifier, variable, or procedure was used but never declared.
    UndefinedName {
        kind: NameKind,
        name: String,
        span: Span,
    },

    /// A name was declared twice in the same scope (or two modules share
    /// a name).
    DuplicateName {
        kind: NameKind,
        name: String,
        span: Span,
    },

    /// `bestow q` used outside module `q`.
    QualifierMismatch {
        qualifier: String,
        module: String,
        span: Span,
    },

    /// The provider side of a unification lacked qualifiers the receptor
    /// requires.
    QualifierViolation {
        receptor: Type,
        provider: Type,
        missing: QualifierSet,
        span: Span,
    },

    /// Base types disagree structurally.
    TypeMismatch {
        expected: Type,
        found: Type,
        span: Span,
    },

    /// Unification would have produced an infinite type.
    OccursCheck { var: TypeVar, ty: Type, span: Span },

    /// Two signatures sharing a name disagree on their return type.
    ReturnTypeDivergence {
        name: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    /// Applicable candidates at a call site cannot be linearized by
    /// specificity and the ordering graph.
    AmbiguousDispatch {
        name: String,
        left: String,
        right: String,
        span: Span,
    },

    /// An `order` declaration would make the relation cyclic.
    OrderingCycle {
        before: String,
        after: String,
        span: Span,
    },

    /// A call's argument count matches no candidate.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// Several candidates matched the call's arity but none survived the
    /// unification probe.
    NoApplicableCandidate {
        name: String,
        reason: Option<Box<TypeError>>,
        span: Span,
    },

    /// `super` used in a procedure whose name has no other candidate.
    SuperWithoutChain { name: String, span: Span },

    /// A module marked `fails` typechecked cleanly.
    ModuleDidNotFail { name: String, span: Span },
}

impl TypeError {
    pub fn undefined(kind: NameKind, name: impl Into<String>, span: Span) -> Self {
        TypeError::UndefinedName {
            kind,
            name: name.into(),
            span,
        }
    }

    pub fn duplicate(kind: NameKind, name: impl Into<String>, span: Span) -> Self {
        TypeError::DuplicateName {
            kind,
            name: name.into(),
            span,
        }
    }

    /// Convert a unification failure to a diagnostic at the given site.
    pub fn from_unify_error(err: UnifyError, span: Span) -> Self {
        match err {
            UnifyError::QualifierViolation {
                receptor,
                provider,
                missing,
            } => TypeError::QualifierViolation {
                receptor,
                provider,
                missing,
                span,
            },
            UnifyError::Mismatch { expected, found } => TypeError::TypeMismatch {
                expected,
                found,
                span,
            },
            UnifyError::OccursCheck { var, ty } => TypeError::OccursCheck { var, ty, span },
        }
    }

    pub fn from_ordering_cycle(cycle: OrderingCycle, span: Span) -> Self {
        TypeError::OrderingCycle {
            before: cycle.before,
            after: cycle.after,
            span,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            TypeError::UndefinedName { span, .. }
            | TypeError::DuplicateName { span, .. }
            | TypeError::QualifierMismatch { span, .. }
            | TypeError::QualifierViolation { span, .. }
            | TypeError::TypeMismatch { span, .. }
            | TypeError::OccursCheck { span, .. }
            | TypeError::ReturnTypeDivergence { span, .. }
            | TypeError::AmbiguousDispatch { span, .. }
            | TypeError::OrderingCycle { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::NoApplicableCandidate { span, .. }
            | TypeError::SuperWithoutChain { span, .. }
            | TypeError::ModuleDidNotFail { span, .. } => span,
        }
    }

    fn message(&self) -> String {
        match self {
            TypeError::UndefinedName { kind, name, .. } => {
                format!("undefined {}: {}", kind.describe(), name)
            }
            TypeError::DuplicateName { kind, name, .. } => {
                format!("{} {} already declared", kind.describe(), name)
            }
            TypeError::QualifierMismatch {
                qualifier, module, ..
            } => {
                format!(
                    "type operation on {} used outside of its module (in module {})",
                    qualifier, module
                )
            }
            TypeError::QualifierViolation {
                receptor,
                provider,
                missing,
                ..
            } => {
                let missing: Vec<&str> = missing.iter().collect();
                format!(
                    "qualifier-set violation: {} required, not present ({} cannot receive {})",
                    missing.join(" "),
                    receptor.pretty(),
                    provider.pretty()
                )
            }
            TypeError::TypeMismatch {
                expected, found, ..
            } => {
                format!(
                    "type mismatch: expected {}, found {}",
                    expected.pretty(),
                    found.pretty()
                )
            }
            TypeError::OccursCheck { var, ty, .. } => {
                format!(
                    "cannot construct infinite type: {} = {}",
                    Type::bare(super::ty::BaseType::Var(var.clone())).pretty(),
                    ty.pretty()
                )
            }
            TypeError::ReturnTypeDivergence {
                name,
                expected,
                found,
                ..
            } => {
                format!(
                    "return-type divergence: {} already declared returning {}, now {}",
                    name,
                    expected.pretty(),
                    found.pretty()
                )
            }
            TypeError::AmbiguousDispatch {
                name, left, right, ..
            } => {
                format!(
                    "ambiguous dispatch for {}: {} and {} are incomparable; add an order declaration",
                    name, left, right
                )
            }
            TypeError::OrderingCycle { before, after, .. } => {
                format!(
                    "ordering cycle: order {} < {} contradicts the existing ordering",
                    before, after
                )
            }
            TypeError::ArityMismatch {
                name,
                expected,
                found,
                ..
            } => {
                format!(
                    "arity mismatch: {} takes {} argument(s), {} given",
                    name, expected, found
                )
            }
            TypeError::NoApplicableCandidate { name, reason, .. } => {
                let mut msg = format!("no applicable candidate for call to {}", name);
                if let Some(reason) = reason {
                    msg.push_str(&format!("\n  Note: {}", reason.message()));
                }
                msg
            }
            TypeError::SuperWithoutChain { name, .. } => {
                format!("super used in {}, which has no other candidate", name)
            }
            TypeError::ModuleDidNotFail { name, .. } => {
                format!("module {} claimed to fail typechecking but didn't", name)
            }
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = self.message();
        if self.span().source.is_empty() {
            write!(f, "Type error: {}", msg)
        } else {
            write!(f, "{}", self.span().to_string(&msg))
        }
    }
}

impl std::error::Error for TypeError {}
