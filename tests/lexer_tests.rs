use dieter::lexer::{Token, lex};

#[test]
fn lex_heart_sigil() {
    let tokens = lex("♥t").expect("lexing failed");
    assert_eq!(tokens.len(), 2);
    assert!(matches!(tokens[0], Token::Heart(_)));
    assert!(matches!(&tokens[1], Token::Ident(id) if id.value == "t"));
}

#[test]
fn lex_assign_vs_colon() {
    let tokens = lex("x := y : int").expect("lexing failed");
    assert!(matches!(tokens[1], Token::Assign(_)));
    assert!(matches!(tokens[3], Token::Colon(_)));
    assert!(matches!(tokens[4], Token::Int(_)));
}

#[test]
fn lex_keywords() {
    let tokens = lex("module procedure begin end return final bestow super").expect("lexing failed");
    assert!(matches!(tokens[0], Token::Module(_)));
    assert!(matches!(tokens[1], Token::Procedure(_)));
    assert!(matches!(tokens[2], Token::Begin(_)));
    assert!(matches!(tokens[3], Token::End(_)));
    assert!(matches!(tokens[4], Token::Return(_)));
    assert!(matches!(tokens[5], Token::Final(_)));
    assert!(matches!(tokens[6], Token::Bestow(_)));
    assert!(matches!(tokens[7], Token::Super(_)));
}

#[test]
fn lex_keyword_prefix_stays_identifier() {
    let tokens = lex("mapping").expect("lexing failed");
    assert_eq!(tokens.len(), 1);
    assert!(matches!(&tokens[0], Token::Ident(id) if id.value == "mapping"));
}

#[test]
fn lex_skips_comments() {
    let tokens = lex("module /* not tokens */ m end").expect("lexing failed");
    assert_eq!(tokens.len(), 3);
    assert!(matches!(tokens[0], Token::Module(_)));
    assert!(matches!(&tokens[1], Token::Ident(id) if id.value == "m"));
    assert!(matches!(tokens[2], Token::End(_)));
}

#[test]
fn lex_integer_and_string() {
    let tokens = lex(r#"42 "hello""#).expect("lexing failed");
    assert!(matches!(&tokens[0], Token::Integer(i) if i.value == "42"));
    assert!(matches!(tokens[1], Token::StringLiteral(_)));
}

#[test]
fn lex_punctuation() {
    let tokens = lex("( ) [ ] , ; . <").expect("lexing failed");
    assert!(matches!(tokens[0], Token::LParen(_)));
    assert!(matches!(tokens[1], Token::RParen(_)));
    assert!(matches!(tokens[2], Token::LBracket(_)));
    assert!(matches!(tokens[3], Token::RBracket(_)));
    assert!(matches!(tokens[4], Token::Comma(_)));
    assert!(matches!(tokens[5], Token::Semicolon(_)));
    assert!(matches!(tokens[6], Token::Dot(_)));
    assert!(matches!(tokens[7], Token::Less(_)));
}
