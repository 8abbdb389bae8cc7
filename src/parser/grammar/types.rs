//! Type-expression parsers for the Dieter language

use crate::ast::type_expr::{BareTypeExpr, PrimitiveType, TypeExpr};
use crate::lexer::Token;

use crate::parser::combinators::{BoxedParser, expect_to};
use crate::parser::state::{ParseError, ParseState, Parser};

use super::literal::ident;

/// type_expr := qualName* bare_type
///
/// Qualifiers come out in canonical form: deduplicated and sorted, so
/// structurally equal spellings compare equal downstream.
pub fn type_expr() -> BoxedParser<TypeExpr> {
    BoxedParser::new(move |state: &mut ParseState| {
        let position = match state.peek() {
            Some(tok) => tok.pos(),
            None => {
                let err = ParseError::new("unexpected end of input").expected("type expression");
                state.record_error(err.clone());
                return Err(err);
            }
        };

        // qualifiers are plain identifiers; base types are keywords, so
        // this loop stops at the bare type by itself
        let mut qualifiers = Vec::new();
        loop {
            let pos = state.position();
            match ident().parse(state) {
                Ok(qualifier) => qualifiers.push(qualifier),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        let base = bare_type().parse(state)?;

        qualifiers.sort_by(|a, b| a.value.cmp(&b.value));
        qualifiers.dedup_by(|a, b| a.value == b.value);

        Ok(TypeExpr {
            qualifiers,
            base,
            position,
        })
    })
}

/// bare_type := "map" ["from" type_expr] "to" type_expr
///            | "♥" tvarName
///            | "void" | "bool" | "int" | "rat" | "string" | "ref"
pub fn bare_type() -> BoxedParser<BareTypeExpr> {
    BoxedParser::new(move |state: &mut ParseState| {
        let primitive = match state.peek() {
            Some(Token::Bool(_)) => Some(PrimitiveType::Bool),
            Some(Token::Int(_)) => Some(PrimitiveType::Int),
            Some(Token::Rat(_)) => Some(PrimitiveType::Rat),
            Some(Token::StringType(_)) => Some(PrimitiveType::String),
            Some(Token::Ref(_)) => Some(PrimitiveType::Ref),
            Some(Token::Void(_)) => Some(PrimitiveType::Void),
            _ => None,
        };
        if let Some(primitive) = primitive {
            state.advance();
            return Ok(BareTypeExpr::Primitive(primitive));
        }

        match state.peek() {
            Some(Token::Map(_)) => {
                state.advance();
                let key = if matches!(state.peek(), Some(Token::From(_))) {
                    state.advance();
                    Some(Box::new(type_expr().parse(state)?))
                } else {
                    None
                };
                expect_to().parse(state)?;
                let value = Box::new(type_expr().parse(state)?);
                Ok(BareTypeExpr::Map { key, value })
            }
            Some(Token::Heart(_)) => {
                state.advance();
                let name = ident().parse(state)?;
                Ok(BareTypeExpr::Var(name))
            }
            Some(tok) => {
                let err = ParseError::new("unexpected token")
                    .expected("type expression")
                    .found(tok.describe())
                    .at(tok.pos());
                state.record_error(err.clone());
                Err(err)
            }
            None => {
                let err = ParseError::new("unexpected end of input").expected("type expression");
                state.record_error(err.clone());
                Err(err)
            }
        }
    })
}
