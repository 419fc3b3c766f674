//! Splits source lines into lexemes using a regex-driven splitter, then
//! classifies each non-whitespace fragment against the reserved table and
//! the `identifier`/`constant` regexes.

mod reserved;

pub use reserved::ReservedTable;

use std::error::Error;
use std::fmt;

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexeme::{Lexeme, LexemeKind};

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z_0-9]*$").unwrap());
static CONSTANT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap());

/// A lexical failure: an unrecognized fragment encountered while scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalError {
    pub line: usize,
    pub column: usize,
    pub row: String,
    pub text: String,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}, column {}\n{}\nLexical Error: Unknown symbol '{}'",
            self.line, self.column, self.row, self.text
        )
    }
}

impl Error for LexicalError {}

/// Splits a single line into `(byte_offset, fragment)` pairs using a regex
/// built from the reserved punctuation, verifying that the concatenation of
/// fragments reproduces the input line exactly.
struct LineSplitter {
    regex: Regex,
}

impl LineSplitter {
    fn new(special_substrings: &[&str]) -> Self {
        let mut ordered: Vec<&str> = special_substrings.to_vec();
        ordered.sort_by_key(|s| std::cmp::Reverse(s.len()));
        let mut pieces: Vec<String> = ordered.iter().map(|s| regex::escape(s)).collect();
        pieces.push(r"\s+".to_string());
        let pattern = format!("({})", pieces.join("|"));
        LineSplitter { regex: Regex::new(&pattern).expect("lexer splitter pattern must compile") }
    }

    /// Returns `(byte_offset, fragment)` for every non-whitespace fragment in `line`.
    fn tokens<'a>(&self, line: &'a str) -> Vec<(usize, &'a str)> {
        let mut fragments = Vec::new();
        let mut last = 0;
        for m in self.regex.find_iter(line) {
            if m.start() > last {
                fragments.push(&line[last..m.start()]);
            }
            fragments.push(m.as_str());
            last = m.end();
        }
        if last < line.len() {
            fragments.push(&line[last..]);
        }

        let rebuilt: String = fragments.concat();
        assert_eq!(rebuilt, line, "line splitter self-check failed: fragments do not reconstitute the source line");

        let mut result = Vec::new();
        let mut offset = 0;
        for fragment in fragments {
            if !fragment.is_empty() && !fragment.chars().all(char::is_whitespace) {
                result.push((offset, fragment));
            }
            offset += fragment.len();
        }
        result
    }
}

/// Scans source text into a flat stream of [`Lexeme`]s, collecting every
/// lexical error rather than stopping at the first one.
pub struct Lexer {
    reserved: ReservedTable,
    splitter: LineSplitter,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        let reserved = ReservedTable::new();
        let special: Vec<&str> = reserved.punctuation().collect();
        Lexer { splitter: LineSplitter::new(&special), reserved }
    }

    pub fn reserved(&self) -> &ReservedTable {
        &self.reserved
    }

    /// Scans `source`, returning every lexeme found and every lexical error
    /// encountered. Callers should not attempt syntax analysis when `errors`
    /// is non-empty.
    pub fn scan(&self, source: &str) -> (Vec<Lexeme>, Vec<LexicalError>) {
        let mut lexemes = Vec::new();
        let mut errors = Vec::new();
        let rows: Vec<&str> = source.lines().collect();

        for (line_number, row) in rows.iter().enumerate() {
            for (column, fragment) in self.splitter.tokens(row) {
                let kind = self.classify(fragment);
                let terminal_number = self.terminal_number(fragment, kind);
                let lexeme = Lexeme::new(fragment, kind, line_number, column, terminal_number);
                trace!("lexeme {lexeme}");
                if kind == LexemeKind::Error {
                    errors.push(LexicalError {
                        line: line_number,
                        column,
                        row: row.to_string(),
                        text: fragment.to_string(),
                    });
                }
                lexemes.push(lexeme);
            }
        }

        debug!("scanned {} lexemes, {} lexical errors", lexemes.len(), errors.len());
        (lexemes, errors)
    }

    fn classify(&self, text: &str) -> LexemeKind {
        if self.reserved.contains(text) {
            return LexemeKind::Terminal;
        }
        if IDENTIFIER_RE.is_match(text) {
            return LexemeKind::Identifier;
        }
        if CONSTANT_RE.is_match(text) {
            return LexemeKind::Constant;
        }
        LexemeKind::Error
    }

    fn terminal_number(&self, text: &str, kind: LexemeKind) -> usize {
        if let Some(n) = self.reserved.number_of(text) {
            return n;
        }
        match kind {
            LexemeKind::Identifier => self.reserved.len(),
            _ => self.reserved.len() + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_classifies_a_simple_statement() {
        let lexer = Lexer::new();
        let (lexemes, errors) = lexer.scan("a = 3 + 1;");
        assert!(errors.is_empty());
        let texts: Vec<&str> = lexemes.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "=", "3", "+", "1", ";"]);
        assert_eq!(lexemes[0].kind, LexemeKind::Identifier);
        assert_eq!(lexemes[2].kind, LexemeKind::Constant);
        assert_eq!(lexemes[1].kind, LexemeKind::Terminal);
    }

    #[test]
    fn reports_comparison_operator_as_a_single_terminal() {
        let lexer = Lexer::new();
        let (lexemes, errors) = lexer.scan("13 != 100500");
        assert!(errors.is_empty());
        let texts: Vec<&str> = lexemes.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["13", "!=", "100500"]);
        assert_eq!(lexemes[1].kind, LexemeKind::Terminal);
    }

    #[test]
    fn flags_unknown_symbols_without_stopping() {
        let lexer = Lexer::new();
        let (lexemes, errors) = lexer.scan("a = $ + 1;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text, "$");
        assert_eq!(lexemes.iter().find(|l| l.text == "$").unwrap().kind, LexemeKind::Error);
    }

    #[test]
    fn constant_value_distinguishes_integer_and_float() {
        let lexer = Lexer::new();
        let (lexemes, _) = lexer.scan("1.5 7");
        assert_eq!(lexemes[0].value(), crate::lexeme::Number::Float(1.5));
        assert_eq!(lexemes[1].value(), crate::lexeme::Number::Int(7));
    }
}
