//! Grammar module for the Dieter language
//!
//! Parsing rules organized by category:
//! - `literal`: identifiers, integers, strings
//! - `types`: type expressions
//! - `expression`: expression forms
//! - `statement`: statements
//! - declarations and the program rule (this module)

mod expression;
mod literal;
mod statement;
mod types;

use crate::ast::{FwdDecl, Module, Ordering, ProcDecl, Program, VarDecl};
use crate::lexer::Token;

use super::combinators::{
    BoxedParser, expect_colon, expect_comma, expect_end, expect_forward, expect_less,
    expect_lparen, expect_module, expect_order, expect_procedure, expect_rparen, optional,
};
use super::state::{ParseError, ParseState, Parser};

use literal::ident;
use statement::statement;
use types::type_expr;

/// var_decl := ident ":" type_expr
fn var_decl() -> BoxedParser<VarDecl> {
    ((ident() - expect_colon()) + type_expr())
        >> |(name, ty)| VarDecl {
            position: name.position.clone(),
            name,
            ty,
        }
}

/// ordering := "order" qualName "<" qualName
fn ordering() -> BoxedParser<Ordering> {
    BoxedParser::new(move |state: &mut ParseState| {
        let position = expect_order().parse(state)?.pos();
        let before = ident().parse(state)?;
        expect_less().parse(state)?;
        let after = ident().parse(state)?;
        Ok(Ordering {
            before,
            after,
            position,
        })
    })
}

/// forward := "forward" procName "(" [type_expr {"," type_expr}] ")" ":" type_expr
fn forward() -> BoxedParser<FwdDecl> {
    BoxedParser::new(move |state: &mut ParseState| {
        let position = expect_forward().parse(state)?.pos();
        let name = ident().parse(state)?;
        expect_lparen().parse(state)?;

        let mut params = Vec::new();
        if !matches!(state.peek(), Some(Token::RParen(_))) {
            params.push(type_expr().parse(state)?);
            while optional(expect_comma()).parse(state)?.is_some() {
                params.push(type_expr().parse(state)?);
            }
        }
        expect_rparen().parse(state)?;
        expect_colon().parse(state)?;
        let return_type = type_expr().parse(state)?;

        Ok(FwdDecl {
            name,
            params,
            return_type,
            position,
        })
    })
}

/// proc_decl := "procedure" procName "(" [var_decl {"," var_decl}] ")" ":" type_expr
///              {"var" var_decl} statement
fn proc_decl() -> BoxedParser<ProcDecl> {
    BoxedParser::new(move |state: &mut ParseState| {
        let position = expect_procedure().parse(state)?.pos();
        let name = ident().parse(state)?;
        expect_lparen().parse(state)?;

        let mut params = Vec::new();
        if !matches!(state.peek(), Some(Token::RParen(_))) {
            params.push(var_decl().parse(state)?);
            while optional(expect_comma()).parse(state)?.is_some() {
                params.push(var_decl().parse(state)?);
            }
        }
        expect_rparen().parse(state)?;
        expect_colon().parse(state)?;
        let return_type = type_expr().parse(state)?;

        let mut locals = Vec::new();
        while matches!(state.peek(), Some(Token::Var(_))) {
            state.advance();
            locals.push(var_decl().parse(state)?);
        }
        let body = statement().parse(state)?;

        Ok(ProcDecl {
            name,
            params,
            return_type,
            locals,
            body,
            position,
        })
    })
}

/// module := "module" qualName ["fails"] {"var" var_decl} {proc_decl} "end"
fn module() -> BoxedParser<Module> {
    BoxedParser::new(move |state: &mut ParseState| {
        let position = expect_module().parse(state)?.pos();
        let name = ident().parse(state)?;
        let fails = if matches!(state.peek(), Some(Token::Fails(_))) {
            state.advance();
            true
        } else {
            false
        };

        let mut locals = Vec::new();
        while matches!(state.peek(), Some(Token::Var(_))) {
            state.advance();
            locals.push(var_decl().parse(state)?);
        }
        let mut procs = Vec::new();
        while matches!(state.peek(), Some(Token::Procedure(_))) {
            procs.push(proc_decl().parse(state)?);
        }

        expect_end().parse(state)?;
        Ok(Module {
            name,
            fails,
            locals,
            procs,
            position,
        })
    })
}

/// Skip forward to the next top-level declaration (or the terminating dot)
/// so one malformed declaration doesn't hide errors in the rest.
fn skip_to_next_decl(state: &mut ParseState) {
    state.advance();
    while let Some(tok) = state.peek() {
        if matches!(
            tok,
            Token::Order(_) | Token::Module(_) | Token::Forward(_) | Token::Dot(_)
        ) {
            break;
        }
        state.advance();
    }
}

/// program := { module | ordering | forward } "."
pub fn program() -> BoxedParser<Program> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut program = Program {
            forwards: Vec::new(),
            orderings: Vec::new(),
            modules: Vec::new(),
        };

        loop {
            let recovered = match state.peek() {
                Some(Token::Order(_)) => match ordering().parse(state) {
                    Ok(decl) => {
                        program.orderings.push(decl);
                        false
                    }
                    Err(err) => {
                        commit(state, err);
                        true
                    }
                },
                Some(Token::Forward(_)) => match forward().parse(state) {
                    Ok(decl) => {
                        program.forwards.push(decl);
                        false
                    }
                    Err(err) => {
                        commit(state, err);
                        true
                    }
                },
                Some(Token::Module(_)) => match module().parse(state) {
                    Ok(decl) => {
                        program.modules.push(decl);
                        false
                    }
                    Err(err) => {
                        commit(state, err);
                        true
                    }
                },
                _ => break,
            };
            if recovered {
                skip_to_next_decl(state);
            }
        }

        match state.peek() {
            Some(Token::Dot(_)) => {
                state.advance();
                Ok(program)
            }
            Some(tok) => {
                let err = ParseError::new("unexpected token")
                    .expected("'order', 'module', 'forward' or '.'")
                    .found(tok.describe())
                    .at(tok.pos());
                state.record_error(err.clone());
                Err(err)
            }
            None => {
                let err = ParseError::new("unexpected end of input").expected("'.'");
                state.record_error(err.clone());
                Err(err)
            }
        }
    })
}

/// Commit the best error for a failed declaration: the furthest one if
/// tracking caught something deeper, otherwise the returned one.
fn commit(state: &mut ParseState, err: ParseError) {
    if state.get_furthest_error().is_some() {
        state.commit_furthest_error();
    } else {
        state.collect_error(err);
    }
}

/// Parse a complete program from the token stream.
/// Returns the parsed program (if one could be assembled) along with all
/// collected errors.
pub fn parse(state: &mut ParseState) -> (Option<Program>, Vec<ParseError>) {
    let result = program().parse(state);

    let program = match result {
        Ok(prog) if state.has_next() => {
            if let Some(furthest) = state.get_furthest_error() {
                let furthest = furthest.clone();
                state.collect_error(furthest);
            } else {
                let err = state.error_here("unexpected token after program end");
                state.collect_error(err);
            }
            Some(prog)
        }
        Ok(prog) => Some(prog),
        Err(err) => {
            if let Some(furthest) = state.get_furthest_error() {
                let furthest = furthest.clone();
                state.collect_error(furthest);
            } else {
                state.collect_error(err);
            }
            None
        }
    };

    let errors = state.take_errors();
    (program, errors)
}
