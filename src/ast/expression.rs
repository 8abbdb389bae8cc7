use lachs::Span;

#[derive(Debug, Clone)]
pub enum Expression {
    Integer(IntegerLiteral),
    String(StringLiteral),
    VarRef(VarRef),
    Call(Call),
    Bestow(Bestow),
    Super(Super),
}

impl Expression {
    pub fn position(&self) -> Span {
        match self {
            Expression::Integer(i) => i.position.clone(),
            Expression::String(s) => s.position.clone(),
            Expression::VarRef(v) => v.position.clone(),
            Expression::Call(c) => c.position.clone(),
            Expression::Bestow(b) => b.position.clone(),
            Expression::Super(s) => s.position.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub value: String,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub value: i128,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub value: String,
    pub position: Span,
}

/// A variable reference, optionally indexed into a map: `v` or `v[k]`.
#[derive(Debug, Clone)]
pub struct VarRef {
    pub name: Ident,
    pub index: Option<Box<Expression>>,
    pub position: Span,
}

/// A procedure call, as an expression or (via [`super::statement::Statement::Call`])
/// as a statement.
#[derive(Debug, Clone)]
pub struct Call {
    pub name: Ident,
    pub args: Vec<Expression>,
    pub position: Span,
}

/// `bestow q e` adds qualifier `q` to the type of `e`. Only legal inside
/// the module named `q`.
#[derive(Debug, Clone)]
pub struct Bestow {
    pub qualifier: Ident,
    pub expr: Box<Expression>,
    pub position: Span,
}

/// `super` stands for the next, more specific procedure in the dispatch
/// chain; its static type is the enclosing procedure's return type.
#[derive(Debug, Clone)]
pub struct Super {
    pub position: Span,
}
