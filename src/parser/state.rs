//! # Parser State Management
//!
//! Infrastructure shared by every grammar function:
//!
//! - [`ParseState`]: token stream position, backtracking, and error
//!   tracking. Parsers save the position, try an alternative, and restore
//!   on failure.
//! - [`ParseError`]: structured parse failures with expected/found context
//!   and a source span.
//! - [`Parser`]: the trait every parser (including plain closures)
//!   implements.
//!
//! ## Error tracking
//!
//! Recursive-descent with backtracking produces many transient errors; the
//! one worth reporting is usually at the *furthest* position the parser
//! reached. `ParseState` records that furthest error, merging the expected
//! lists of alternatives that failed at the same spot, and separately
//! collects committed errors so one run can report several (top-level
//! declaration recovery relies on this).

use lachs::Span;

use crate::lexer::Token;

/// Structured parse error with context information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Box<Span>>,
    pub expected: Vec<String>,
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            span: None,
            expected: vec![],
            found: None,
        }
    }

    /// Add an expected token/construct to this error.
    pub fn expected(mut self, what: impl Into<String>) -> Self {
        self.expected.push(what.into());
        self
    }

    /// Set what was actually found.
    pub fn found(mut self, what: impl Into<String>) -> Self {
        self.found = Some(what.into());
        self
    }

    /// Set the source location for this error.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(Box::new(span));
        self
    }

    /// Merge expected tokens from another error (used when alternatives
    /// fail at the same position).
    pub fn merge_expected(mut self, other: &ParseError) -> Self {
        for exp in &other.expected {
            if !self.expected.contains(exp) {
                self.expected.push(exp.clone());
            }
        }
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = if !self.expected.is_empty() {
            let expected_str = if self.expected.len() == 1 {
                self.expected[0].clone()
            } else {
                let (last, rest) = self.expected.split_last().unwrap();
                format!("{} or {}", rest.join(", "), last)
            };
            match &self.found {
                Some(found) => format!("expected {}, found {}", expected_str, found),
                None => format!("expected {}", expected_str),
            }
        } else {
            self.message.clone()
        };

        if let Some(span) = &self.span {
            write!(f, "{}", span.to_string(&msg))
        } else {
            write!(f, "Parse error: {}", msg)
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state: token stream, position, and error tracking.
pub struct ParseState {
    /// The complete token stream being parsed
    tokens: Vec<Token>,

    /// Current position in the token stream (index of next token to read)
    index: usize,

    /// Error at the furthest position reached during parsing
    furthest_error: Option<(usize, ParseError)>,

    /// All errors committed during parsing (for multi-error reporting)
    collected_errors: Vec<ParseError>,
}

impl ParseState {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            furthest_error: None,
            collected_errors: Vec::new(),
        }
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Option<Token> {
        if self.has_next() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            Some(token)
        } else {
            None
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    /// Current position, for later [`ParseState::restore`].
    pub fn position(&self) -> usize {
        self.index
    }

    /// Backtrack to a previously saved position.
    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    /// Record an error, keeping the one at the furthest position reached.
    /// Errors at the same position merge their expected lists.
    pub fn record_error(&mut self, error: ParseError) {
        match &self.furthest_error {
            Some((pos, _)) if *pos > self.index => {}
            Some((pos, existing)) if *pos == self.index => {
                let merged = existing.clone().merge_expected(&error);
                self.furthest_error = Some((self.index, merged));
            }
            _ => {
                self.furthest_error = Some((self.index, error));
            }
        }
    }

    pub fn get_furthest_error(&self) -> Option<&ParseError> {
        self.furthest_error.as_ref().map(|(_, e)| e)
    }

    /// Collect an error for later reporting.
    pub fn collect_error(&mut self, error: ParseError) {
        self.collected_errors.push(error);
    }

    /// Commit the tracked furthest error to the collected list, typically
    /// when giving up on one declaration and recovering at the next.
    pub fn commit_furthest_error(&mut self) {
        if let Some((_, err)) = self.furthest_error.take() {
            self.collected_errors.push(err);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.collected_errors.is_empty()
    }

    /// Take all collected errors, leaving the list empty.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.collected_errors)
    }

    /// Create an error at the current position with span info attached.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        let msg = message.into();
        match self.peek() {
            Some(tok) => ParseError::new(&msg).at(tok.pos()).found(tok.describe()),
            None => ParseError::new(msg).found("end of input".to_string()),
        }
    }
}

/// Generic parser trait, implemented by every grammar function and by any
/// closure of the right shape.
pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
