use rocket_lang::lexeme::LexemeKind;
use rocket_lang::lexer::Lexer;

#[test]
fn classifies_every_reserved_identifier_and_constant() {
    let lexer = Lexer::new();
    let (lexemes, errors) = lexer.scan("13 != 100500");
    assert!(errors.is_empty());
    assert_eq!(lexemes.len(), 3);
    assert_eq!(lexemes[0].kind, LexemeKind::Constant);
    assert_eq!(lexemes[1].kind, LexemeKind::Terminal);
    assert_eq!(lexemes[1].text, "!=");
    assert_eq!(lexemes[2].kind, LexemeKind::Constant);
}

#[test]
fn splits_dense_expressions_without_losing_characters() {
    let lexer = Lexer::new();
    let (lexemes, errors) = lexer.scan("(3+4)/(10-7)+2-12*(13*169)");
    assert!(errors.is_empty());
    let texts: Vec<&str> = lexemes.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["(", "3", "+", "4", ")", "/", "(", "10", "-", "7", ")", "+", "2", "-", "12", "*", "(", "13", "*", "169", ")"]
    );
}

#[test]
fn aggregates_multiple_lexical_errors_instead_of_stopping_at_the_first() {
    let lexer = Lexer::new();
    let (_, errors) = lexer.scan("a = $ + 1;\nb = # * 2;");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].text, "$");
    assert_eq!(errors[1].text, "#");
}
