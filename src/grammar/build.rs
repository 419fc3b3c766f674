use super::{Grammar, GrammarBuilder};
use crate::lexeme::LexemeKind;

/// Builds the grammar for the Rocket language:
///
/// ```text
/// statement_list        := (statement ';')*
/// statement              := assignment_statement | output_statement
///                          | input_statement | conditional_statement | iteration_statement
/// assignment_statement    := identifier '=' expression
/// output_statement        := 'write' expression
/// input_statement         := 'read' identifier
/// conditional_statement    := 'if' expression 'then' block 'else' block
/// iteration_statement      := 'while' expression 'do' block 'enddo'
/// block                    := '{' statement_list '}'
/// expression               := term (low_priority_operator term)*
/// term                     := factor (high_priority_math_operator factor)*
/// factor                   := constant | low_priority_math_operator constant
///                            | identifier | low_priority_math_operator identifier
///                            | '(' expression ')'
/// low_priority_operator     := comparison_operator | low_priority_math_operator
/// ```
pub fn rocket_grammar() -> Grammar {
    let mut b = GrammarBuilder::new();

    let constant = b.regex("constant", LexemeKind::Constant);
    let identifier = b.regex("identifier", LexemeKind::Identifier);

    let comparison_operator = b.literal_set("comparison_operator", &["==", "!=", ">", "<", ">=", "<=", "<>"]);
    let low_priority_math_operator = b.literal_set("low_priority_math_operator", &["+", "-"]);
    let high_priority_math_operator = b.literal_set("high_priority_math_operator", &["*", "/", "^"]);
    let low_priority_operator =
        b.alternatives("low_priority_operator", vec![vec![comparison_operator], vec![low_priority_math_operator]]);

    let opening_parenthesis = b.literal_set("opening_parenthesis", &["("]);
    let closing_parenthesis = b.literal_set("closing_parenthesis", &[")"]);
    let opening_curly_brace = b.literal_set("opening_curly_brace", &["{"]);
    let closing_curly_brace = b.literal_set("closing_curly_brace", &["}"]);
    let assignment_operator = b.literal_set("assignment_operator", &["="]);
    let statement_separator = b.literal_set("statement_separator", &[";"]);

    let kw_if = b.literal_set("if", &["if"]);
    let kw_then = b.literal_set("then", &["then"]);
    let kw_else = b.literal_set("else", &["else"]);
    let kw_while = b.literal_set("while", &["while"]);
    let kw_do = b.literal_set("do", &["do"]);
    let kw_enddo = b.literal_set("enddo", &["enddo"]);
    let kw_write = b.literal_set("write", &["write"]);
    let kw_read = b.literal_set("read", &["read"]);

    // `expression` and `factor` are mutually recursive: reserve `expression`
    // so `factor`'s parenthesized alternative can reference it before its
    // own alternatives are known.
    let expression = b.reserve("expression");

    let factor = b.alternatives(
        "factor",
        vec![
            vec![constant],
            vec![low_priority_math_operator, constant],
            vec![identifier],
            vec![low_priority_math_operator, identifier],
            vec![opening_parenthesis, expression, closing_parenthesis],
        ],
    );
    let term_tail = b.repetition("term_tail", vec![high_priority_math_operator, factor]);
    let term = b.alternatives("term", vec![vec![factor, term_tail]]);
    let expression_tail = b.repetition("expression_tail", vec![low_priority_operator, term]);
    b.alternatives("expression", vec![vec![term, expression_tail]]);

    let assignment_statement = b.alternatives("assignment_statement", vec![vec![identifier, assignment_operator, expression]]);
    let output_statement = b.alternatives("output_statement", vec![vec![kw_write, expression]]);
    let input_statement = b.alternatives("input_statement", vec![vec![kw_read, identifier]]);

    let statement_list = b.reserve("statement_list");
    let block = b.alternatives("block", vec![vec![opening_curly_brace, statement_list, closing_curly_brace]]);

    let conditional_statement =
        b.alternatives("conditional_statement", vec![vec![kw_if, expression, kw_then, block, kw_else, block]]);
    let iteration_statement =
        b.alternatives("iteration_statement", vec![vec![kw_while, expression, kw_do, block, kw_enddo]]);

    let statement = b.alternatives(
        "statement",
        vec![
            vec![assignment_statement],
            vec![output_statement],
            vec![input_statement],
            vec![conditional_statement],
            vec![iteration_statement],
        ],
    );
    b.repetition("statement_list", vec![statement, statement_separator]);

    b.build().expect("the Rocket grammar defines every symbol it reserves")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolKind;

    #[test]
    fn every_reserved_symbol_ends_up_defined() {
        let grammar = rocket_grammar();
        let root = grammar.root("statement_list").unwrap();
        assert!(matches!(grammar.kind(root), SymbolKind::Repetition(_)));
    }

    #[test]
    fn unknown_root_name_is_rejected() {
        let grammar = rocket_grammar();
        assert!(grammar.root("no_such_symbol").is_err());
    }
}
