//! The token produced by the lexer and consumed by the grammar/parser layer.

use std::fmt;

/// Classification of a lexeme, mirroring the four lexical categories a
/// source fragment can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexemeKind {
    Terminal,
    Identifier,
    Constant,
    Error,
}

impl fmt::Display for LexemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LexemeKind::Terminal => "terminal",
            LexemeKind::Identifier => "identifier",
            LexemeKind::Constant => "constant",
            LexemeKind::Error => "error",
        };
        f.write_str(label)
    }
}

/// The numeric value a `constant` lexeme resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_truthy(self) -> bool {
        match self {
            Number::Int(i) => i != 0,
            Number::Float(f) => f != 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(n) => write!(f, "{n}"),
        }
    }
}

/// A single classified fragment of source text: `{text, kind, line, column, terminal_number}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub text: String,
    pub kind: LexemeKind,
    pub line: usize,
    pub column: usize,
    pub terminal_number: usize,
}

impl Lexeme {
    pub fn new(text: impl Into<String>, kind: LexemeKind, line: usize, column: usize, terminal_number: usize) -> Self {
        Lexeme { text: text.into(), kind, line, column, terminal_number }
    }

    /// The numeric interpretation of a `constant` lexeme. Integer if the text
    /// round-trips through integer parsing, floating-point otherwise.
    ///
    /// Panics if called on a non-constant lexeme; callers only invoke this
    /// once `kind == LexemeKind::Constant` has already been established.
    pub fn value(&self) -> Number {
        assert_eq!(self.kind, LexemeKind::Constant, "value() called on a non-constant lexeme");
        if let Ok(i) = self.text.parse::<i64>() {
            return Number::Int(i);
        }
        Number::Float(self.text.parse::<f64>().expect("constant lexeme text must be numeric"))
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.line.to_string(),
            self.column.to_string(),
            self.text.clone(),
            self.kind.to_string(),
            self.terminal_number.to_string(),
        ]
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}:{:<3} {:>10} {:>12} {:>3}", self.line, self.column, self.text, self.kind, self.terminal_number)
    }
}
