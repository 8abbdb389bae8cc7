//! Statement parsers for the Dieter language

use crate::ast::expression::Call;
use crate::ast::statement::{
    AssignStatement, Compound, IfStatement, ReturnStatement, Statement, WhileStatement,
};
use crate::lexer::Token;

use crate::parser::combinators::{
    BoxedParser, expect_assign, expect_do, expect_end, expect_rbracket, expect_then,
};
use crate::parser::state::{ParseError, ParseState, Parser};

use super::expression::{call_rest, expression};
use super::literal::ident;

/// statement := "begin" statement* "end"
///            | "if" expression "then" statement ["else" statement]
///            | "while" expression "do" statement
///            | "return" ["final"] expression
///            | procName "(" [call_args] ")"
///            | varName ["[" expression "]"] ":=" expression
pub fn statement() -> BoxedParser<Statement> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(Token::Begin(_)) => {
            let start = state.advance().unwrap().pos();
            let mut steps = Vec::new();
            while !matches!(state.peek(), Some(Token::End(_))) {
                steps.push(statement().parse(state)?);
            }
            let end = expect_end().parse(state)?.pos();
            Ok(Statement::Compound(Compound {
                steps,
                position: start.merge(&end),
            }))
        }
        Some(Token::If(_)) => {
            let position = state.advance().unwrap().pos();
            let test = expression().parse(state)?;
            expect_then().parse(state)?;
            let then_stmt = Box::new(statement().parse(state)?);
            let else_stmt = if matches!(state.peek(), Some(Token::Else(_))) {
                state.advance();
                Some(Box::new(statement().parse(state)?))
            } else {
                None
            };
            Ok(Statement::If(IfStatement {
                test,
                then_stmt,
                else_stmt,
                position,
            }))
        }
        Some(Token::While(_)) => {
            let position = state.advance().unwrap().pos();
            let test = expression().parse(state)?;
            expect_do().parse(state)?;
            let body = Box::new(statement().parse(state)?);
            Ok(Statement::While(WhileStatement {
                test,
                body,
                position,
            }))
        }
        Some(Token::Return(_)) => {
            let position = state.advance().unwrap().pos();
            let is_final = if matches!(state.peek(), Some(Token::Final(_))) {
                state.advance();
                true
            } else {
                false
            };
            let expr = expression().parse(state)?;
            Ok(Statement::Return(ReturnStatement {
                expr,
                is_final,
                position,
            }))
        }
        Some(Token::Ident(_)) => {
            let name = ident().parse(state)?;
            let position = name.position.clone();

            if matches!(state.peek(), Some(Token::LParen(_))) {
                state.advance();
                let args = call_rest(state)?;
                return Ok(Statement::Call(Call {
                    name,
                    args,
                    position,
                }));
            }

            let index = if matches!(state.peek(), Some(Token::LBracket(_))) {
                state.advance();
                let index = expression().parse(state)?;
                expect_rbracket().parse(state)?;
                Some(index)
            } else {
                None
            };
            expect_assign().parse(state)?;
            let value = expression().parse(state)?;
            Ok(Statement::Assign(AssignStatement {
                name,
                index,
                value,
                position,
            }))
        }
        Some(tok) => {
            let err = ParseError::new("unexpected token")
                .expected("statement")
                .found(tok.describe())
                .at(tok.pos());
            state.record_error(err.clone());
            Err(err)
        }
        None => {
            let err = ParseError::new("unexpected end of input").expected("statement");
            state.record_error(err.clone());
            Err(err)
        }
    })
}
