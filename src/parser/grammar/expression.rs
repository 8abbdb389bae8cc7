//! Expression parsers for the Dieter language

use crate::ast::expression::{Bestow, Call, Expression, Super, VarRef};
use crate::lexer::Token;

use crate::parser::combinators::{BoxedParser, expect_comma, expect_rbracket, expect_rparen, optional};
use crate::parser::state::{ParseError, ParseResult, ParseState, Parser};

use super::literal::{ident, integer, string_literal};

/// call_args := expression ("," expression)*
pub(super) fn call_args(state: &mut ParseState) -> ParseResult<Vec<Expression>> {
    let first = expression().parse(state)?;
    let mut args = vec![first];

    loop {
        let pos = state.position();
        if optional(expect_comma()).parse(state)?.is_some() {
            match expression().parse(state) {
                Ok(arg) => args.push(arg),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        } else {
            break;
        }
    }

    Ok(args)
}

/// Arguments of a call whose name and "(" were already consumed.
pub(super) fn call_rest(state: &mut ParseState) -> ParseResult<Vec<Expression>> {
    let pos = state.position();
    if expect_rparen().parse(state).is_ok() {
        return Ok(vec![]);
    }
    state.restore(pos);
    let args = call_args(state)?;
    expect_rparen().parse(state)?;
    Ok(args)
}

/// expression := "(" expression ")"
///             | "bestow" qualName expression
///             | "super"
///             | integer | string
///             | procName "(" [call_args] ")"
///             | varName ["[" expression "]"]
pub fn expression() -> BoxedParser<Expression> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(Token::LParen(_)) => {
            state.advance();
            let expr = expression().parse(state)?;
            expect_rparen().parse(state)?;
            Ok(expr)
        }
        Some(Token::Bestow(_)) => {
            let start = state.advance().unwrap().pos();
            let qualifier = ident().parse(state)?;
            let expr = expression().parse(state)?;
            let position = start.merge(&expr.position());
            Ok(Expression::Bestow(Bestow {
                qualifier,
                expr: Box::new(expr),
                position,
            }))
        }
        Some(Token::Super(_)) => {
            let position = state.advance().unwrap().pos();
            Ok(Expression::Super(Super { position }))
        }
        Some(Token::Integer(_)) => integer().parse(state).map(Expression::Integer),
        Some(Token::StringLiteral(_)) => string_literal().parse(state).map(Expression::String),
        Some(Token::Ident(_)) => {
            let name = ident().parse(state)?;
            let position = name.position.clone();

            if matches!(state.peek(), Some(Token::LParen(_))) {
                state.advance();
                let args = call_rest(state)?;
                return Ok(Expression::Call(Call {
                    name,
                    args,
                    position,
                }));
            }

            let index = if matches!(state.peek(), Some(Token::LBracket(_))) {
                state.advance();
                let index = expression().parse(state)?;
                expect_rbracket().parse(state)?;
                Some(Box::new(index))
            } else {
                None
            };
            Ok(Expression::VarRef(VarRef {
                name,
                index,
                position,
            }))
        }
        Some(tok) => {
            let err = ParseError::new("unexpected token")
                .expected("expression")
                .found(tok.describe())
                .at(tok.pos());
            state.record_error(err.clone());
            Err(err)
        }
        None => {
            let err = ParseError::new("unexpected end of input").expected("expression");
            state.record_error(err.clone());
            Err(err)
        }
    })
}
