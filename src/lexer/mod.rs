use lachs::Span;

#[lachs::token]
pub enum Token {
    #[terminal("order")]
    Order,
    #[terminal("module")]
    Module,
    #[terminal("fails")]
    Fails,
    #[terminal("forward")]
    Forward,
    #[terminal("var")]
    Var,
    #[terminal("procedure")]
    Procedure,
    #[terminal("begin")]
    Begin,
    #[terminal("end")]
    End,
    #[terminal("if")]
    If,
    #[terminal("then")]
    Then,
    #[terminal("else")]
    Else,
    #[terminal("while")]
    While,
    #[terminal("do")]
    Do,
    #[terminal("return")]
    Return,
    #[terminal("final")]
    Final,
    #[terminal("bestow")]
    Bestow,
    #[terminal("super")]
    Super,
    #[terminal("map")]
    Map,
    #[terminal("from")]
    From,
    #[terminal("to")]
    To,
    #[terminal("void")]
    Void,
    #[terminal("bool")]
    Bool,
    #[terminal("int")]
    Int,
    #[terminal("rat")]
    Rat,
    #[terminal("string")]
    StringType,
    #[terminal("ref")]
    Ref,
    #[terminal("♥")]
    Heart,
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal("[")]
    LBracket,
    #[terminal("]")]
    RBracket,
    #[terminal(":=")]
    Assign,
    #[terminal(":")]
    Colon,
    #[terminal(";")]
    Semicolon,
    #[terminal(",")]
    Comma,
    #[terminal(".")]
    Dot,
    #[terminal("<")]
    Less,
    #[literal("[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[literal("[0-9][0-9]*")]
    Integer,
    #[literal(r#""([^"\\]|\\.)*""#)]
    StringLiteral,
    #[literal(r#"/\*([^*]|\*[^/])*\*/"#)]
    Comment,
}

/// Lex a source string into tokens, dropping comments.
pub fn lex(input: &str) -> Result<Vec<Token>, Box<dyn std::error::Error + Send + Sync>> {
    let tokens = Token::lex(input)?;
    Ok(tokens
        .into_iter()
        .filter(|token| !matches!(token, Token::Comment(_)))
        .collect())
}

impl Token {
    pub fn pos(&self) -> Span {
        match self {
            Token::Order(inner) => inner.position.clone(),
            Token::Module(inner) => inner.position.clone(),
            Token::Fails(inner) => inner.position.clone(),
            Token::Forward(inner) => inner.position.clone(),
            Token::Var(inner) => inner.position.clone(),
            Token::Procedure(inner) => inner.position.clone(),
            Token::Begin(inner) => inner.position.clone(),
            Token::End(inner) => inner.position.clone(),
            Token::If(inner) => inner.position.clone(),
            Token::Then(inner) => inner.position.clone(),
            Token::Else(inner) => inner.position.clone(),
            Token::While(inner) => inner.position.clone(),
            Token::Do(inner) => inner.position.clone(),
            Token::Return(inner) => inner.position.clone(),
            Token::Final(inner) => inner.position.clone(),
            Token::Bestow(inner) => inner.position.clone(),
            Token::Super(inner) => inner.position.clone(),
            Token::Map(inner) => inner.position.clone(),
            Token::From(inner) => inner.position.clone(),
            Token::To(inner) => inner.position.clone(),
            Token::Void(inner) => inner.position.clone(),
            Token::Bool(inner) => inner.position.clone(),
            Token::Int(inner) => inner.position.clone(),
            Token::Rat(inner) => inner.position.clone(),
            Token::StringType(inner) => inner.position.clone(),
            Token::Ref(inner) => inner.position.clone(),
            Token::Heart(inner) => inner.position.clone(),
            Token::LParen(inner) => inner.position.clone(),
            Token::RParen(inner) => inner.position.clone(),
            Token::LBracket(inner) => inner.position.clone(),
            Token::RBracket(inner) => inner.position.clone(),
            Token::Assign(inner) => inner.position.clone(),
            Token::Colon(inner) => inner.position.clone(),
            Token::Semicolon(inner) => inner.position.clone(),
            Token::Comma(inner) => inner.position.clone(),
            Token::Dot(inner) => inner.position.clone(),
            Token::Less(inner) => inner.position.clone(),
            Token::Ident(inner) => inner.position.clone(),
            Token::Integer(inner) => inner.position.clone(),
            Token::StringLiteral(inner) => inner.position.clone(),
            Token::Comment(inner) => inner.position.clone(),
        }
    }

    /// Returns a human-readable description of the token
    pub fn describe(&self) -> String {
        match self {
            Token::Order(_) => "'order'".to_string(),
            Token::Module(_) => "'module'".to_string(),
            Token::Fails(_) => "'fails'".to_string(),
            Token::Forward(_) => "'forward'".to_string(),
            Token::Var(_) => "'var'".to_string(),
            Token::Procedure(_) => "'procedure'".to_string(),
            Token::Begin(_) => "'begin'".to_string(),
            Token::End(_) => "'end'".to_string(),
            Token::If(_) => "'if'".to_string(),
            Token::Then(_) => "'then'".to_string(),
            Token::Else(_) => "'else'".to_string(),
            Token::While(_) => "'while'".to_string(),
            Token::Do(_) => "'do'".to_string(),
            Token::Return(_) => "'return'".to_string(),
            Token::Final(_) => "'final'".to_string(),
            Token::Bestow(_) => "'bestow'".to_string(),
            Token::Super(_) => "'super'".to_string(),
            Token::Map(_) => "'map'".to_string(),
            Token::From(_) => "'from'".to_string(),
            Token::To(_) => "'to'".to_string(),
            Token::Void(_) => "'void'".to_string(),
            Token::Bool(_) => "'bool'".to_string(),
            Token::Int(_) => "'int'".to_string(),
            Token::Rat(_) => "'rat'".to_string(),
            Token::StringType(_) => "'string'".to_string(),
            Token::Ref(_) => "'ref'".to_string(),
            Token::Heart(_) => "'♥'".to_string(),
            Token::LParen(_) => "'('".to_string(),
            Token::RParen(_) => "')'".to_string(),
            Token::LBracket(_) => "'['".to_string(),
            Token::RBracket(_) => "']'".to_string(),
            Token::Assign(_) => "':='".to_string(),
            Token::Colon(_) => "':'".to_string(),
            Token::Semicolon(_) => "';'".to_string(),
            Token::Comma(_) => "','".to_string(),
            Token::Dot(_) => "'.'".to_string(),
            Token::Less(_) => "'<'".to_string(),
            Token::Ident(inner) => format!("identifier '{}'", inner.value),
            Token::Integer(inner) => format!("integer '{}'", inner.value),
            Token::StringLiteral(inner) => format!("string {}", inner.value),
            Token::Comment(_) => "comment".to_string(),
        }
    }
}
