//! # Abstract Syntax Tree for Dieter Programs
//!
//! A program is a sequence of top-level declarations, terminated by `.`:
//!
//! - `forward` declarations, pre-declaring a procedure signature (used for
//!   intrinsics such as `new_ref` and for declaration-before-use);
//! - `order` declarations, relating two qualifier names for dispatch;
//! - `module` declarations, each of which defines the qualifier of the same
//!   name and contains module-local variables and procedures.
//!
//! Every node carries a [`lachs::Span`] so diagnostics can point back into
//! the source. The tree itself is untyped; the checker in [`crate::types`]
//! consumes it read-only and reports its findings separately.

use lachs::Span;

pub mod expression;
pub mod statement;
pub mod type_expr;

use expression::Ident;
use statement::Statement;
use type_expr::TypeExpr;

/// A complete Dieter program.
///
/// Declarations are kept in source order per kind; the checker processes
/// forwards, then orderings, then modules.
#[derive(Debug, Clone)]
pub struct Program {
    pub forwards: Vec<FwdDecl>,
    pub orderings: Vec<Ordering>,
    pub modules: Vec<Module>,
}

/// `order q < q'` declares `q'` strictly more general than `q` for
/// dispatch ordering.
#[derive(Debug, Clone)]
pub struct Ordering {
    pub before: Ident,
    pub after: Ident,
    pub position: Span,
}

/// `forward name(T, ...) : R` declares a procedure signature without a
/// body. Forwards count as dispatch candidates like any other declaration.
#[derive(Debug, Clone)]
pub struct FwdDecl {
    pub name: Ident,
    pub params: Vec<TypeExpr>,
    pub return_type: TypeExpr,
    pub position: Span,
}

/// A module: the defining occurrence of the qualifier of the same name,
/// plus module-local variables and procedures.
///
/// A module marked `fails` declares that it is expected *not* to typecheck;
/// the checker verifies that expectation instead of reporting its errors.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: Ident,
    pub fails: bool,
    pub locals: Vec<VarDecl>,
    pub procs: Vec<ProcDecl>,
    pub position: Span,
}

/// A variable declaration, `name : Type` (module-local, parameter, or
/// procedure-local). All variables carry explicit types.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub position: Span,
}

/// A procedure declaration with parameters, an explicit return type,
/// local variables, and a single body statement.
#[derive(Debug, Clone)]
pub struct ProcDecl {
    pub name: Ident,
    pub params: Vec<VarDecl>,
    pub return_type: TypeExpr,
    pub locals: Vec<VarDecl>,
    pub body: Statement,
    pub position: Span,
}
