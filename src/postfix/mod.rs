//! Infix-to-postfix transformation (shunting-yard) with `Mark`/`Jump`
//! pseudo-ops synthesized for `if`/`else` and `while`/`do`/`enddo`.

use std::collections::HashMap;

use log::trace;
use once_cell::sync::Lazy;

use crate::parser::TerminalMatch;

pub type MarkId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Unconditional,
    OnFalse,
}

/// One element of a postfix stream: a terminal operand/operator, a mark
/// (jump target), or a jump.
#[derive(Debug, Clone)]
pub enum Op {
    Terminal(TerminalMatch),
    Mark(MarkId),
    Jump(JumpKind, MarkId),
}

impl Op {
    pub fn display(&self, marks: &Marks) -> String {
        match self {
            Op::Terminal(t) => t.lexeme.text.clone(),
            Op::Mark(id) => marks.name(*id),
            Op::Jump(JumpKind::Unconditional, _) => "jump".to_string(),
            Op::Jump(JumpKind::OnFalse, _) => "jump_on_False".to_string(),
        }
    }
}

/// Resolved positions for every mark allocated during a transformation.
#[derive(Debug, Clone, Default)]
pub struct Marks {
    positions: HashMap<MarkId, usize>,
}

impl Marks {
    pub fn position(&self, id: MarkId) -> usize {
        self.positions[&id]
    }

    pub fn name(&self, id: MarkId) -> String {
        format!("mark_{id}")
    }

    pub fn table(&self) -> Vec<Vec<String>> {
        let mut rows = vec![vec!["mark name".to_string(), "position".to_string()]];
        let mut ids: Vec<&MarkId> = self.positions.keys().collect();
        ids.sort();
        for id in ids {
            rows.push(vec![self.name(*id), self.positions[id].to_string()]);
        }
        rows
    }
}

/// One row of the step-by-step transformation trace, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub step: usize,
    pub enter: String,
    pub stack: String,
    pub output: String,
}

static PRIORITY: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    let tiers: [&[&str]; 13] = [
        &["(", "{", "if", "while"],
        &[";"],
        &["write", "read", "enddo"],
        &["="],
        &["or"],
        &["and"],
        &["not"],
        &["<", ">", ">=", "<=", "!=", "<>", "=="],
        &["+", "-"],
        &["*", "/"],
        &["^"],
        &["@", "+_"],
        &[","],
    ];
    let mut map = HashMap::new();
    for (priority, operators) in tiers.iter().enumerate() {
        for operator in *operators {
            map.insert(*operator, priority as u8);
        }
    }
    map
});

fn priority(text: &str) -> u8 {
    PRIORITY[text]
}

enum StackItem {
    Match(TerminalMatch),
    Mark(MarkId),
}

/// Converts the terminal leaves of a parse tree into a postfix stream,
/// synthesizing marks and jumps for control flow.
pub struct Transformer {
    output: Vec<Op>,
    marks: Marks,
    stack: Vec<StackItem>,
    execute_from_stack_on_separator: bool,
    next_mark: MarkId,
    history: Vec<HistoryRow>,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer {
    pub fn new() -> Self {
        Transformer {
            output: Vec::new(),
            marks: Marks::default(),
            stack: Vec::new(),
            execute_from_stack_on_separator: false,
            next_mark: 0,
            history: Vec::new(),
        }
    }

    pub fn transform(mut self, terminals: &[TerminalMatch]) -> (Vec<Op>, Marks, Vec<HistoryRow>) {
        for (i, current) in terminals.iter().enumerate() {
            let before = self.output.len();
            self.step(terminals, i, current);
            self.history.push(HistoryRow {
                step: i,
                enter: current.lexeme.text.clone(),
                stack: self.stack_repr(),
                output: self.output[before..].iter().map(|op| op.display(&self.marks)).collect::<Vec<_>>().join(", "),
            });
        }

        if !self.stack.is_empty() {
            let drained: Vec<StackItem> = self.stack.drain(..).rev().collect();
            let before = self.output.len();
            for item in drained {
                match item {
                    StackItem::Mark(id) => {
                        self.marks.positions.insert(id, self.output.len());
                    }
                    StackItem::Match(m) => self.output.push(Op::Terminal(m)),
                }
            }
            if let Some(last) = self.history.last_mut() {
                last.stack.clear();
                last.output = self.output[before..].iter().map(|op| op.display(&self.marks)).collect::<Vec<_>>().join(", ");
            }
        }

        (self.output, self.marks, self.history)
    }

    fn stack_repr(&self) -> String {
        self.stack
            .iter()
            .map(|item| match item {
                StackItem::Match(m) => m.lexeme.text.clone(),
                StackItem::Mark(id) => self.marks.name(*id),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn add_mark(&mut self) -> MarkId {
        let id = self.next_mark;
        self.next_mark += 1;
        id
    }

    fn move_higher_priority_operators_to_output(&mut self, baseline: u8, strictly_greater: bool) {
        loop {
            match self.stack.last() {
                None => return,
                Some(StackItem::Mark(_)) => return,
                Some(StackItem::Match(m)) => {
                    let p = priority(&m.lexeme.text);
                    let should_pop = if strictly_greater { p > baseline } else { p >= baseline };
                    if !should_pop {
                        return;
                    }
                    if let Some(StackItem::Match(m)) = self.stack.pop() {
                        self.output.push(Op::Terminal(m));
                    }
                }
            }
        }
    }

    fn clear_operator_stack(&mut self, till_symbol_name: &str) {
        loop {
            let is_boundary = match self.stack.last() {
                Some(StackItem::Match(m)) => m.symbol_name == till_symbol_name,
                _ => false,
            };
            if is_boundary {
                break;
            }
            match self.stack.pop().expect("operator stack exhausted before reaching boundary symbol") {
                StackItem::Mark(id) => {
                    self.marks.positions.insert(id, self.output.len());
                }
                StackItem::Match(m) => self.output.push(Op::Terminal(m)),
            }
        }
        self.stack.pop();
    }

    fn step(&mut self, terminals: &[TerminalMatch], i: usize, current: &TerminalMatch) {
        let name = current.symbol_name.as_str();
        let text = current.lexeme.text.as_str();

        if name == "constant" || name == "identifier" {
            self.output.push(Op::Terminal(current.clone()));
        } else if name == "if" || name == "opening_parenthesis" || name == "opening_curly_brace" {
            self.stack.push(StackItem::Match(current.clone()));
        } else if name == "closing_parenthesis" {
            self.clear_operator_stack("opening_parenthesis");
        } else if name == "closing_curly_brace" {
            self.clear_operator_stack("opening_curly_brace");
            self.execute_from_stack_on_separator = true;
        } else if name == "then" {
            self.clear_operator_stack("if");
            let false_mark = self.add_mark();
            self.output.push(Op::Mark(false_mark));
            self.output.push(Op::Jump(JumpKind::OnFalse, false_mark));
            self.stack.push(StackItem::Mark(false_mark));
        } else if name == "do" {
            self.clear_operator_stack("while");
            let false_mark = self.add_mark();
            self.output.push(Op::Mark(false_mark));
            self.output.push(Op::Jump(JumpKind::OnFalse, false_mark));
            self.stack.push(StackItem::Mark(false_mark));
        } else if name == "else" {
            self.execute_from_stack_on_separator = false;
            let exit_mark = self.add_mark();
            self.output.push(Op::Mark(exit_mark));
            self.output.push(Op::Jump(JumpKind::Unconditional, exit_mark));
            if let Some(StackItem::Mark(false_mark)) = self.stack.pop() {
                self.marks.positions.insert(false_mark, self.output.len());
            }
            self.stack.push(StackItem::Mark(exit_mark));
        } else if name == "while" {
            let loop_mark = self.add_mark();
            self.marks.positions.insert(loop_mark, self.output.len());
            self.stack.push(StackItem::Mark(loop_mark));
            self.stack.push(StackItem::Match(current.clone()));
        } else if name == "enddo" {
            self.execute_from_stack_on_separator = false;
            let exit_mark = match self.stack.pop() {
                Some(StackItem::Mark(id)) => id,
                _ => unreachable!("enddo expects an exit mark on the operator stack"),
            };
            let loop_mark = match self.stack.pop() {
                Some(StackItem::Mark(id)) => id,
                _ => unreachable!("enddo expects a loop mark on the operator stack"),
            };
            self.output.push(Op::Mark(loop_mark));
            self.output.push(Op::Jump(JumpKind::Unconditional, loop_mark));
            self.marks.positions.insert(exit_mark, self.output.len());
        } else if name == "write" || name == "read" {
            self.stack.push(StackItem::Match(current.clone()));
        } else if name == "statement_separator" {
            if self.execute_from_stack_on_separator {
                match self.stack.pop() {
                    Some(StackItem::Mark(id)) => {
                        self.marks.positions.insert(id, self.output.len());
                    }
                    Some(StackItem::Match(m)) => self.output.push(Op::Terminal(m)),
                    None => {}
                }
                self.execute_from_stack_on_separator = false;
            }
            self.move_higher_priority_operators_to_output(priority(text), false);
        } else {
            if (text == "-" || text == "+") && self.is_unary_position(terminals, i) {
                let rewritten = if text == "-" { "@" } else { "+_" };
                let mut unary = current.clone();
                unary.lexeme.text = rewritten.to_string();
                self.stack.push(StackItem::Match(unary));
                return;
            }
            let strictly_greater = text == "^";
            self.move_higher_priority_operators_to_output(priority(text), strictly_greater);
            self.stack.push(StackItem::Match(current.clone()));
        }
        trace!("postfix step {i}: {text}");
    }

    /// A `+`/`-` terminal is unary when the preceding terminal was not an
    /// operand and not a closing parenthesis (or there is no preceding
    /// terminal at all).
    fn is_unary_position(&self, terminals: &[TerminalMatch], i: usize) -> bool {
        if i == 0 {
            return true;
        }
        let previous = &terminals[i - 1];
        let previous_is_operand = matches!(previous.symbol_name.as_str(), "constant" | "identifier");
        !previous_is_operand && previous.lexeme.text != ")"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::rocket_grammar;
    use crate::lexer::Lexer;
    use crate::parser::{Match, ParseOutcome, Parser};

    fn postfix_text(source: &str, root: &str) -> String {
        let lexer = Lexer::new();
        let (lexemes, errors) = lexer.scan(source);
        assert!(errors.is_empty());
        let grammar = rocket_grammar();
        let mut parser = Parser::new(&grammar);
        let outcome = parser.parse(root, &lexemes).unwrap();
        let m: Match = match outcome {
            ParseOutcome::Matched(m) => m,
            other => panic!("expected a match, got {other:?}"),
        };
        let terminals = m.terminal_matches();
        let (postfix, marks, _history) = Transformer::new().transform(&terminals);
        postfix.iter().map(|op| op.display(&marks)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn simple_infix_becomes_postfix() {
        assert_eq!(postfix_text("1 + 2 * 3", "expression"), "1 2 3 * +");
    }

    #[test]
    fn exponentiation_is_right_associative() {
        assert_eq!(postfix_text("2 + 3^6 / 8", "expression"), "2 3 6 ^ 8 / +");
    }

    #[test]
    fn assignment_chain_postfix() {
        let lexer = Lexer::new();
        let (lexemes, errors) = lexer.scan("a = 3 + 1; a = a + 2;");
        assert!(errors.is_empty());
        let grammar = rocket_grammar();
        let mut parser = Parser::new(&grammar);
        let outcome = parser.parse("statement_list", &lexemes).unwrap();
        assert!(matches!(outcome, ParseOutcome::Matched(_)));
    }
}
