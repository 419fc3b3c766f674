//! Recursive-descent matching engine that walks a [`Grammar`] against a
//! lexeme stream, producing either a parse tree or a precise diagnosis of
//! where the input diverged from the grammar.

use log::{error, trace};

use crate::grammar::{Grammar, GrammarError, SymbolId, SymbolKind};
use crate::lexeme::Lexeme;

/// A terminal leaf of a parse tree: the symbol that matched and the lexeme
/// it consumed.
#[derive(Debug, Clone)]
pub struct TerminalMatch {
    pub symbol_name: String,
    pub lexeme: Lexeme,
}

/// The result of matching a symbol against a lexeme stream.
#[derive(Debug, Clone)]
pub enum Match {
    Terminal(TerminalMatch),
    NonTerminal { symbol_name: String, children: Vec<Match> },
    Empty,
}

impl Match {
    /// Flattens the tree into the ordered list of terminal leaves, the form
    /// the postfix transformer consumes. Empty matches contribute nothing.
    pub fn terminal_matches(&self) -> Vec<TerminalMatch> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals(&self, out: &mut Vec<TerminalMatch>) {
        match self {
            Match::Terminal(t) => out.push(t.clone()),
            Match::NonTerminal { children, .. } => {
                for child in children {
                    child.collect_terminals(out);
                }
            }
            Match::Empty => {}
        }
    }
}

/// The outcome of matching a program's lexeme stream against a grammar root.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Matched(Match),
    /// The parser reached as far as the returned lexeme before the grammar
    /// had nothing left that could consume it.
    UnexpectedSymbol(Lexeme),
    /// The input ended before the grammar reached a complete match, with no
    /// specific offending lexeme to report.
    UnexpectedEnd,
}

/// Drives a single top-level match attempt, tracking how deep into the
/// lexeme stream the grammar ever reached so a failed parse can be blamed on
/// a specific lexeme rather than reported as a bare failure.
pub struct Parser<'g> {
    grammar: &'g Grammar,
    deepest_remaining: Option<usize>,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Parser { grammar, deepest_remaining: None }
    }

    pub fn parse(&mut self, root: &str, lexemes: &[Lexeme]) -> Result<ParseOutcome, GrammarError> {
        let root_id = self.grammar.root(root)?;
        self.deepest_remaining = None;
        let (top_match, remaining) = self.match_symbol(root_id, lexemes)?;

        match self.deepest_remaining {
            Some(1) => {
                let leftover = !remaining.is_empty();
                match top_match {
                    Some(Match::Empty) | None => Ok(ParseOutcome::UnexpectedEnd),
                    Some(_) if leftover => Ok(ParseOutcome::UnexpectedEnd),
                    Some(m) => Ok(ParseOutcome::Matched(m)),
                }
            }
            Some(k) => {
                let idx = lexemes.len() - k + 1;
                Ok(ParseOutcome::UnexpectedSymbol(lexemes[idx].clone()))
            }
            None => Ok(ParseOutcome::UnexpectedEnd),
        }
    }

    fn match_symbol<'l>(&mut self, id: SymbolId, lexemes: &'l [Lexeme]) -> Result<(Option<Match>, &'l [Lexeme]), GrammarError> {
        let name = self.grammar.name(id).to_string();
        match self.grammar.kind(id).clone() {
            SymbolKind::Regex(kind) => {
                if let Some(first) = lexemes.first() {
                    if first.kind == kind {
                        self.deepest_remaining = Some(lexemes.len());
                        trace!("deepest reach now {} remaining, matched '{}' as {name}", lexemes.len(), first.text);
                        return Ok((Some(Match::Terminal(TerminalMatch { symbol_name: name, lexeme: first.clone() })), &lexemes[1..]));
                    }
                }
                Ok((None, lexemes))
            }
            SymbolKind::LiteralSet(members) => {
                if let Some(first) = lexemes.first() {
                    if members.iter().any(|m| m == &first.text) {
                        self.deepest_remaining = Some(lexemes.len());
                        trace!("deepest reach now {} remaining, matched '{}' as {name}", lexemes.len(), first.text);
                        return Ok((Some(Match::Terminal(TerminalMatch { symbol_name: name, lexeme: first.clone() })), &lexemes[1..]));
                    }
                }
                Ok((None, lexemes))
            }
            SymbolKind::Alternatives(sequences) => {
                let mut successes = Vec::new();
                for sequence in &sequences {
                    if let Some((children, remaining)) = self.match_sequence(sequence, lexemes)? {
                        successes.push((children, remaining));
                    }
                }
                match successes.len() {
                    0 => Ok((None, lexemes)),
                    1 => {
                        let (children, remaining) = successes.into_iter().next().unwrap();
                        Ok((Some(Match::NonTerminal { symbol_name: name, children }), remaining))
                    }
                    _ => {
                        error!("more than one alternative of '{name}' matched");
                        Err(GrammarError::Ambiguous(name))
                    }
                }
            }
            SymbolKind::Repetition(sequence) => {
                let entry = lexemes;
                let mut collected = Vec::new();
                let mut cursor = lexemes;
                loop {
                    match self.match_sequence(&sequence, cursor)? {
                        Some((mut children, remaining)) => {
                            collected.append(&mut children);
                            cursor = remaining;
                        }
                        None if !collected.is_empty() => break,
                        None => return Ok((Some(Match::Empty), entry)),
                    }
                }
                Ok((Some(Match::NonTerminal { symbol_name: name, children: collected }), cursor))
            }
        }
    }

    fn match_sequence<'l>(&mut self, sequence: &[SymbolId], lexemes: &'l [Lexeme]) -> Result<Option<(Vec<Match>, &'l [Lexeme])>, GrammarError> {
        let mut children = Vec::with_capacity(sequence.len());
        let mut cursor = lexemes;
        for &id in sequence {
            let (m, remaining) = self.match_symbol(id, cursor)?;
            match m {
                Some(m) => {
                    cursor = remaining;
                    children.push(m);
                }
                None => return Ok(None),
            }
        }
        Ok(Some((children, cursor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::rocket_grammar;
    use crate::lexer::Lexer;

    fn lexemes_for(source: &str) -> Vec<Lexeme> {
        let lexer = Lexer::new();
        let (lexemes, errors) = lexer.scan(source);
        assert!(errors.is_empty(), "unexpected lexical errors: {errors:?}");
        lexemes
    }

    #[test]
    fn parses_a_simple_assignment_statement_list() {
        let grammar = rocket_grammar();
        let lexemes = lexemes_for("a = 3 + 1;");
        let mut parser = Parser::new(&grammar);
        let outcome = parser.parse("statement_list", &lexemes).unwrap();
        assert!(matches!(outcome, ParseOutcome::Matched(_)));
    }

    #[test]
    fn flags_unbalanced_closing_paren_as_the_offending_symbol() {
        let grammar = rocket_grammar();
        let lexemes = lexemes_for("1+2)");
        let mut parser = Parser::new(&grammar);
        let outcome = parser.parse("expression", &lexemes).unwrap();
        match outcome {
            ParseOutcome::UnexpectedSymbol(lexeme) => assert_eq!(lexeme.text, ")"),
            other => panic!("expected UnexpectedSymbol, got {other:?}"),
        }
    }

    #[test]
    fn flags_trailing_operator_as_unexpected_end() {
        let grammar = rocket_grammar();
        let lexemes = lexemes_for("1 +");
        let mut parser = Parser::new(&grammar);
        let outcome = parser.parse("expression", &lexemes).unwrap();
        assert!(matches!(outcome, ParseOutcome::UnexpectedEnd));
    }
}
