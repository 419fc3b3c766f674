//! A small declarative grammar representation: symbols are tagged variants
//! (regex leaf, literal set, ordered alternatives, repetition) addressed by
//! an interned [`SymbolId`] rather than by pointer, so the grammar graph
//! never needs `Rc`/`RefCell` cycles even though productions reference each
//! other (and, for `expression`, reference themselves through `factor`).

mod build;

pub use build::rocket_grammar;

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use log::error;

use crate::lexeme::LexemeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

/// What a symbol matches against a lexeme stream.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    /// Matches a single lexeme of the given kind (`identifier` or `constant`).
    Regex(LexemeKind),
    /// Matches a single lexeme whose text is one of `members`.
    LiteralSet(Vec<String>),
    /// Tries each sequence in order against the same input; exactly one must
    /// match (more than one matching is an ambiguous-grammar error).
    Alternatives(Vec<Vec<SymbolId>>),
    /// Matches `sequence` zero or more times, greedily.
    Repetition(Vec<SymbolId>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    UnknownSymbol(String),
    Undefined(String),
    Ambiguous(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UnknownSymbol(name) => write!(f, "grammar has no symbol named '{name}'"),
            GrammarError::Undefined(name) => write!(f, "symbol '{name}' was reserved but never defined"),
            GrammarError::Ambiguous(name) => write!(f, "more than one alternative of '{name}' matched"),
        }
    }
}

impl Error for GrammarError {}

/// A grammar: every symbol's name and kind, addressable by [`SymbolId`].
pub struct Grammar {
    names: Vec<String>,
    kinds: Vec<SymbolKind>,
    by_name: HashMap<String, SymbolId>,
}

impl Grammar {
    pub fn root(&self, name: &str) -> Result<SymbolId, GrammarError> {
        self.by_name.get(name).copied().ok_or_else(|| GrammarError::UnknownSymbol(name.to_string()))
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id.0]
    }

    pub fn kind(&self, id: SymbolId) -> &SymbolKind {
        &self.kinds[id.0]
    }
}

/// Builds a [`Grammar`], allowing symbols to be reserved before their kind is
/// known so mutually-recursive productions (`factor` referencing
/// `expression`, which references `factor` through `term`) can be wired up.
#[derive(Default)]
pub struct GrammarBuilder {
    names: Vec<String>,
    kinds: Vec<Option<SymbolKind>>,
    by_name: HashMap<String, SymbolId>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, allocating an undefined placeholder the
    /// first time it is seen.
    pub fn reserve(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = SymbolId(self.names.len());
        self.names.push(name.to_string());
        self.kinds.push(None);
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn define(&mut self, name: &str, kind: SymbolKind) -> SymbolId {
        let id = self.reserve(name);
        self.kinds[id.0] = Some(kind);
        id
    }

    pub fn regex(&mut self, name: &str, kind: LexemeKind) -> SymbolId {
        self.define(name, SymbolKind::Regex(kind))
    }

    pub fn literal_set(&mut self, name: &str, members: &[&str]) -> SymbolId {
        self.define(name, SymbolKind::LiteralSet(members.iter().map(|s| s.to_string()).collect()))
    }

    pub fn alternatives(&mut self, name: &str, sequences: Vec<Vec<SymbolId>>) -> SymbolId {
        self.define(name, SymbolKind::Alternatives(sequences))
    }

    pub fn repetition(&mut self, name: &str, sequence: Vec<SymbolId>) -> SymbolId {
        self.define(name, SymbolKind::Repetition(sequence))
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        for (i, kind) in self.kinds.iter().enumerate() {
            if kind.is_none() {
                let name = self.names[i].clone();
                error!("symbol '{name}' was reserved but never defined");
                return Err(GrammarError::Undefined(name));
            }
        }
        let kinds = self.kinds.into_iter().map(|k| k.unwrap()).collect();
        Ok(Grammar { names: self.names, kinds, by_name: self.by_name })
    }
}
