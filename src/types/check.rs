//! The type checker and multi-dispatch resolver.
//!
//! One [`Checker`] instance owns all state for the check of one program:
//! the qualifier table, the procedure table, the ordering graph, the
//! fresh-identity counter, collected diagnostics, and the dispatch chains
//! resolved so far. Substitutions never live here; each call site,
//! assignment, return, condition, and indexed read/write builds its own
//! and drops it when that site is done.
//!
//! Checking order matches declaration order: module names define their
//! qualifiers up front (so forwards may mention them), then orderings are
//! ingested, then forwards declared, then each module is checked top to
//! bottom. Procedures are entered into the table before their body is
//! checked, so recursion works but later siblings need a `forward`.

use std::collections::HashMap;

use lachs::Span;
use log::debug;

use crate::ast;
use crate::ast::expression::{Call, Expression, Ident};
use crate::ast::statement::Statement;
use crate::ast::type_expr::{BareTypeExpr, PrimitiveType, TypeExpr};

use super::env::{ProcTable, QualifierTable, Scopes};
use super::error::{NameKind, TypeError};
use super::order::{Comparison, OrderingGraph};
use super::subst::Substitution;
use super::ty::{BaseType, QualifierSet, Signature, Type, TypeVar};
use super::unify::unify;

/// One resolved call site: the candidates that will run for it, most
/// general first.
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    pub name: String,
    pub position: Span,
    /// Signature ids ([`Signature::id`]) in chain order.
    pub chain: Vec<usize>,
}

/// The outcome of a successful check.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Every resolved call site, in checking order.
    pub calls: Vec<ResolvedCall>,
    /// Qualifier table entries: (qualifier, defining module).
    pub qualifiers: Vec<(String, String)>,
    /// Procedure signatures in declaration order, pretty-printed.
    pub procedures: Vec<String>,
}

impl CheckReport {
    /// Human-readable symbol-table dump for the driver's `--dump-symtab`.
    pub fn dump_symbols(&self) -> String {
        let mut out = String::new();
        for (qualifier, module) in &self.qualifiers {
            out.push_str(&format!("{} : qualifier (module {})\n", qualifier, module));
        }
        for signature in &self.procedures {
            out.push_str(signature);
            out.push('\n');
        }
        out
    }
}

/// Check a whole program: either a report, or every diagnostic found.
pub fn check_program(program: &ast::Program) -> Result<CheckReport, Vec<TypeError>> {
    let mut checker = Checker::new();
    checker.check(program);
    if checker.errors.is_empty() {
        Ok(CheckReport {
            calls: checker.calls,
            qualifiers: checker.qualifiers.entries(),
            procedures: checker.procedures.entries(),
        })
    } else {
        Err(checker.errors)
    }
}

/// The enclosing procedure, while its body is being checked.
struct ProcCtx<'a> {
    module: &'a str,
    name: &'a str,
    return_type: &'a Type,
}

pub struct Checker {
    qualifiers: QualifierTable,
    procedures: ProcTable,
    ordering: OrderingGraph,
    next_var: usize,
    errors: Vec<TypeError>,
    calls: Vec<ResolvedCall>,
}

impl Checker {
    pub fn new() -> Self {
        Checker {
            qualifiers: QualifierTable::new(),
            procedures: ProcTable::new(),
            ordering: OrderingGraph::new(),
            next_var: 0,
            errors: Vec::new(),
            calls: Vec::new(),
        }
    }

    fn check(&mut self, program: &ast::Program) {
        for module in &program.modules {
            if let Err(err) = self
                .qualifiers
                .define(&module.name.value, &module.name.position)
            {
                self.errors.push(err);
            }
        }

        for ordering in &program.orderings {
            if let Err(cycle) = self
                .ordering
                .declare(&ordering.before.value, &ordering.after.value)
            {
                self.errors
                    .push(TypeError::from_ordering_cycle(cycle, ordering.position.clone()));
            }
        }

        for forward in &program.forwards {
            if let Err(err) = self.declare_forward(forward) {
                self.errors.push(err);
            }
        }

        for module in &program.modules {
            self.check_module(module);
        }
    }

    fn declare_forward(&mut self, forward: &ast::FwdDecl) -> Result<(), TypeError> {
        let mut vars = HashMap::new();
        let mut params = Vec::new();
        for param in &forward.params {
            params.push(self.resolve_type(param, &mut vars)?);
        }
        let return_type = self.resolve_type(&forward.return_type, &mut vars)?;
        self.procedures.insert(
            &forward.name.value,
            params,
            return_type,
            None,
            &forward.name.position,
        )?;
        Ok(())
    }

    fn check_module(&mut self, module: &ast::Module) {
        debug!("typechecking module {}", module.name.value);
        let mut errors = Vec::new();
        let mut scopes = Scopes::new();
        scopes.push_frame();

        for local in &module.locals {
            let mut vars = HashMap::new();
            match self.resolve_type(&local.ty, &mut vars) {
                Ok(ty) => {
                    if let Err(err) = scopes.declare(&local.name.value, ty, &local.name.position) {
                        errors.push(err);
                    }
                }
                Err(err) => errors.push(err),
            }
        }

        for proc in &module.procs {
            if let Err(err) = self.check_proc(module, proc, &mut scopes) {
                errors.push(err);
            }
        }

        if module.fails {
            // the module declared it would not typecheck; hold it to that
            if errors.is_empty() {
                self.errors.push(TypeError::ModuleDidNotFail {
                    name: module.name.value.clone(),
                    span: module.name.position.clone(),
                });
            } else {
                debug!(
                    "module {} failed typechecking as intended: {}",
                    module.name.value, errors[0]
                );
            }
        } else {
            self.errors.extend(errors);
        }
    }

    fn check_proc(
        &mut self,
        module: &ast::Module,
        proc: &ast::ProcDecl,
        scopes: &mut Scopes,
    ) -> Result<(), TypeError> {
        debug!("typechecking procedure {}", proc.name.value);
        scopes.push_frame();
        let result = self.check_proc_inner(module, proc, scopes);
        scopes.pop_frame();
        result
    }

    fn check_proc_inner(
        &mut self,
        module: &ast::Module,
        proc: &ast::ProcDecl,
        scopes: &mut Scopes,
    ) -> Result<(), TypeError> {
        // one type-variable scope for the whole declaration: every ♥t in
        // this procedure's types denotes the same variable
        let mut vars = HashMap::new();

        let mut params = Vec::new();
        for param in &proc.params {
            let ty = self.resolve_type(&param.ty, &mut vars)?;
            scopes.declare(&param.name.value, ty.clone(), &param.name.position)?;
            params.push(ty);
        }
        let return_type = self.resolve_type(&proc.return_type, &mut vars)?;
        for local in &proc.locals {
            let ty = self.resolve_type(&local.ty, &mut vars)?;
            scopes.declare(&local.name.value, ty, &local.name.position)?;
        }

        self.procedures.insert(
            &proc.name.value,
            params,
            return_type.clone(),
            Some(module.name.value.clone()),
            &proc.name.position,
        )?;

        let ctx = ProcCtx {
            module: &module.name.value,
            name: &proc.name.value,
            return_type: &return_type,
        };
        self.check_statement(&proc.body, scopes, &ctx)
    }

    /// Resolve a syntactic type expression against the qualifier table.
    /// `vars` is the declaration's type-variable scope: the same name maps
    /// to the same identity throughout one declaration.
    fn resolve_type(
        &mut self,
        expr: &TypeExpr,
        vars: &mut HashMap<String, TypeVar>,
    ) -> Result<Type, TypeError> {
        let mut quals = QualifierSet::empty();
        for qualifier in &expr.qualifiers {
            if !self.qualifiers.is_defined(&qualifier.value) {
                return Err(TypeError::undefined(
                    NameKind::Qualifier,
                    &qualifier.value,
                    qualifier.position.clone(),
                ));
            }
            quals.insert(qualifier.value.clone());
        }

        let base = match &expr.base {
            BareTypeExpr::Primitive(primitive) => match primitive {
                PrimitiveType::Bool => BaseType::Bool,
                PrimitiveType::Int => BaseType::Int,
                PrimitiveType::Rat => BaseType::Rat,
                PrimitiveType::String => BaseType::String,
                PrimitiveType::Ref => BaseType::Ref,
                PrimitiveType::Void => BaseType::Void,
            },
            BareTypeExpr::Map { key, value } => {
                let key = match key {
                    Some(key) => Some(Box::new(self.resolve_type(key, vars)?)),
                    None => None,
                };
                let value = Box::new(self.resolve_type(value, vars)?);
                BaseType::Map { key, value }
            }
            BareTypeExpr::Var(name) => {
                let var = match vars.get(&name.value) {
                    Some(var) => var.clone(),
                    None => {
                        let var = TypeVar::with_name(self.next_var, name.value.clone());
                        self.next_var += 1;
                        vars.insert(name.value.clone(), var.clone());
                        var
                    }
                };
                BaseType::Var(var)
            }
        };
        Ok(Type::new(quals, base))
    }

    fn check_statement(
        &mut self,
        stmt: &Statement,
        scopes: &mut Scopes,
        ctx: &ProcCtx,
    ) -> Result<(), TypeError> {
        match stmt {
            Statement::Compound(compound) => {
                for step in &compound.steps {
                    self.check_statement(step, scopes, ctx)?;
                }
                Ok(())
            }
            Statement::If(stmt) => {
                self.check_condition(&stmt.test, scopes, ctx)?;
                self.check_statement(&stmt.then_stmt, scopes, ctx)?;
                if let Some(else_stmt) = &stmt.else_stmt {
                    self.check_statement(else_stmt, scopes, ctx)?;
                }
                Ok(())
            }
            Statement::While(stmt) => {
                self.check_condition(&stmt.test, scopes, ctx)?;
                self.check_statement(&stmt.body, scopes, ctx)
            }
            Statement::Return(stmt) => {
                // `final` only matters to an evaluator walking the chain;
                // the type rule is the same either way
                let provided = self.type_of_expr(&stmt.expr, scopes, ctx)?;
                let mut subst = Substitution::empty();
                unify(ctx.return_type, &provided, &mut subst)
                    .map_err(|err| TypeError::from_unify_error(err, stmt.position.clone()))?;
                Ok(())
            }
            Statement::Call(call) => {
                self.resolve_call(call, scopes, ctx)?;
                Ok(())
            }
            Statement::Assign(stmt) => {
                let declared = scopes.lookup(&stmt.name.value).cloned().ok_or_else(|| {
                    TypeError::undefined(
                        NameKind::Variable,
                        &stmt.name.value,
                        stmt.name.position.clone(),
                    )
                })?;

                let mut subst = Substitution::empty();
                let receptor = match &stmt.index {
                    Some(index) => {
                        let (key, value) = self.map_parts(&declared, &stmt.name.position)?;
                        let index_ty = self.type_of_expr(index, scopes, ctx)?;
                        if let Some(key) = &key {
                            unify(key, &index_ty, &mut subst).map_err(|err| {
                                TypeError::from_unify_error(err, index.position())
                            })?;
                        }
                        value
                    }
                    None => declared,
                };

                let provided = self.type_of_expr(&stmt.value, scopes, ctx)?;
                unify(&receptor, &provided, &mut subst)
                    .map_err(|err| TypeError::from_unify_error(err, stmt.position.clone()))?;
                Ok(())
            }
        }
    }

    fn check_condition(
        &mut self,
        test: &Expression,
        scopes: &Scopes,
        ctx: &ProcCtx,
    ) -> Result<(), TypeError> {
        let test_ty = self.type_of_expr(test, scopes, ctx)?;
        let mut subst = Substitution::empty();
        unify(&Type::bare(BaseType::Bool), &test_ty, &mut subst)
            .map_err(|err| TypeError::from_unify_error(err, test.position()))
    }

    fn type_of_expr(
        &mut self,
        expr: &Expression,
        scopes: &Scopes,
        ctx: &ProcCtx,
    ) -> Result<Type, TypeError> {
        match expr {
            Expression::Integer(_) => Ok(Type::bare(BaseType::Int)),
            Expression::String(_) => Ok(Type::bare(BaseType::String)),
            Expression::VarRef(var) => {
                let declared = scopes.lookup(&var.name.value).cloned().ok_or_else(|| {
                    TypeError::undefined(
                        NameKind::Variable,
                        &var.name.value,
                        var.name.position.clone(),
                    )
                })?;
                match &var.index {
                    Some(index) => {
                        let (key, value) = self.map_parts(&declared, &var.name.position)?;
                        let index_ty = self.type_of_expr(index, scopes, ctx)?;
                        let mut subst = Substitution::empty();
                        if let Some(key) = &key {
                            unify(key, &index_ty, &mut subst).map_err(|err| {
                                TypeError::from_unify_error(err, index.position())
                            })?;
                        }
                        Ok(subst.apply(&value))
                    }
                    None => Ok(declared),
                }
            }
            Expression::Call(call) => self.resolve_call(call, scopes, ctx),
            Expression::Bestow(bestow) => {
                if bestow.qualifier.value != ctx.module {
                    return Err(TypeError::QualifierMismatch {
                        qualifier: bestow.qualifier.value.clone(),
                        module: ctx.module.to_string(),
                        span: bestow.position.clone(),
                    });
                }
                let inner = self.type_of_expr(&bestow.expr, scopes, ctx)?;
                Ok(inner.qualify(&bestow.qualifier.value))
            }
            Expression::Super(sup) => {
                // meaningless unless some other candidate shares the name
                if self.procedures.candidate_count(ctx.name) < 2 {
                    return Err(TypeError::SuperWithoutChain {
                        name: ctx.name.to_string(),
                        span: sup.position.clone(),
                    });
                }
                Ok(ctx.return_type.clone())
            }
        }
    }

    /// Split a map type into key and value, or report that the variable is
    /// not a map.
    fn map_parts(&mut self, ty: &Type, span: &Span) -> Result<(Option<Type>, Type), TypeError> {
        match &ty.base {
            BaseType::Map { key, value } => {
                Ok((key.as_deref().cloned(), value.as_ref().clone()))
            }
            _ => {
                let value = Type::bare(BaseType::Var(TypeVar::new(self.next_var)));
                self.next_var += 1;
                Err(TypeError::TypeMismatch {
                    expected: Type::map(None, value),
                    found: ty.clone(),
                    span: span.clone(),
                })
            }
        }
    }

    fn resolve_call(
        &mut self,
        call: &Call,
        scopes: &Scopes,
        ctx: &ProcCtx,
    ) -> Result<Type, TypeError> {
        debug!("typechecking call to {}", call.name.value);
        let mut args = Vec::new();
        for arg in &call.args {
            args.push(self.type_of_expr(arg, scopes, ctx)?);
        }
        self.dispatch(&call.name, &args)
    }

    /// Resolve one call site: filter candidates by arity, probe each with a
    /// freshened signature and its own substitution, enforce the shared
    /// return type, and linearize the survivors into a dispatch chain.
    fn dispatch(&mut self, name: &Ident, args: &[Type]) -> Result<Type, TypeError> {
        let span = name.position.clone();
        let candidates: Vec<Signature> = match self.procedures.lookup(&name.value) {
            Some(sigs) => sigs.to_vec(),
            None => {
                return Err(TypeError::undefined(
                    NameKind::Procedure,
                    &name.value,
                    span,
                ));
            }
        };

        let mut rejection: Option<TypeError> = None;
        let mut applicable: Vec<(Signature, Signature, Substitution)> = Vec::new();
        let mut arity_matched = 0usize;
        for sig in &candidates {
            if sig.params.len() != args.len() {
                continue;
            }
            arity_matched += 1;
            let fresh = sig.freshen(&mut self.next_var);
            let mut subst = Substitution::empty();
            let mut probe_ok = true;
            for (param, arg) in fresh.params.iter().zip(args) {
                if let Err(err) = unify(param, arg, &mut subst) {
                    // a rejection, not a hard error; remembered in case no
                    // candidate survives
                    if rejection.is_none() {
                        rejection = Some(TypeError::from_unify_error(err, span.clone()));
                    }
                    probe_ok = false;
                    break;
                }
            }
            if probe_ok {
                applicable.push((sig.clone(), fresh, subst));
            }
        }

        if arity_matched == 0 {
            return Err(TypeError::ArityMismatch {
                name: name.value.clone(),
                expected: candidates[0].params.len(),
                found: args.len(),
                span,
            });
        }
        if applicable.is_empty() {
            if arity_matched == 1 {
                return Err(rejection.expect("probe failed without recording an error"));
            }
            return Err(TypeError::NoApplicableCandidate {
                name: name.value.clone(),
                reason: rejection.map(Box::new),
                span,
            });
        }

        let return_type = applicable[0].2.apply(&applicable[0].1.return_type);
        for (_, fresh, subst) in &applicable[1..] {
            let other = subst.apply(&fresh.return_type);
            if !return_type.equal_modulo_vars(&other) {
                return Err(TypeError::ReturnTypeDivergence {
                    name: name.value.clone(),
                    expected: return_type,
                    found: other,
                    span,
                });
            }
        }

        // the chain must be a total order before sorting makes sense
        for i in 0..applicable.len() {
            for j in (i + 1)..applicable.len() {
                if self.compare_signatures(&applicable[i].0, &applicable[j].0)
                    == Comparison::Incomparable
                {
                    return Err(TypeError::AmbiguousDispatch {
                        name: name.value.clone(),
                        left: applicable[i].0.pretty(),
                        right: applicable[j].0.pretty(),
                        span,
                    });
                }
            }
        }

        // stable insertion: most general first, declaration order on ties
        let mut chain: Vec<&Signature> = Vec::new();
        for (declared, _, _) in &applicable {
            let at = chain
                .iter()
                .position(|other| self.compare_signatures(declared, other) == Comparison::Less)
                .unwrap_or(chain.len());
            chain.insert(at, declared);
        }

        let chain: Vec<usize> = chain.iter().map(|sig| sig.id).collect();
        debug!(
            "dispatch chain for {}: {:?} (return type {})",
            name.value,
            chain,
            return_type.pretty()
        );
        self.calls.push(ResolvedCall {
            name: name.value.clone(),
            position: span,
            chain,
        });
        Ok(return_type)
    }

    /// Specificity of two candidates: per-position qualifier-set
    /// comparison, which must agree across positions.
    fn compare_signatures(&self, a: &Signature, b: &Signature) -> Comparison {
        let mut acc = Comparison::Equal;
        for (pa, pb) in a.params.iter().zip(&b.params) {
            match self.ordering.compare_sets(&pa.quals, &pb.quals) {
                Comparison::Equal => {}
                Comparison::Incomparable => return Comparison::Incomparable,
                dir => {
                    if acc == Comparison::Equal {
                        acc = dir;
                    } else if acc != dir {
                        return Comparison::Incomparable;
                    }
                }
            }
        }
        acc
    }
}

impl Default for Checker {
    fn default() -> Self {
        Checker::new()
    }
}
