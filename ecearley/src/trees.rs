#![deny(warnings)]

use crate::chart::Chart;
use crate::error_grammar::ErrorGrammar;
use crate::grammar::Symbol;
use crate::items::{Production, StateId};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    // ("Simple_Name", "x")
    Leaf(String, String),
    // ("Expr", [("Simple_Name", "x"), ...])
    Node(String, Vec<Tree>),
}

impl Tree {
    pub fn label(&self) -> &str {
        match self {
            Tree::Leaf(label, _) | Tree::Node(label, _) => label,
        }
    }

    /// Matched tokens, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        match self {
            Tree::Leaf(_, token) => vec![token.as_str()],
            Tree::Node(_, children) => children.iter().flat_map(Tree::leaves).collect(),
        }
    }

    fn print_helper(&self, level: &str, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tree::Leaf(label, token) => writeln!(f, "{}`-- {} ==> {:?}", level, label, token),
            Tree::Node(label, children) => {
                writeln!(f, "{}`-- {}", level, label)?;
                if let Some((last, rest)) = children.split_last() {
                    let l = format!("{}  |", level);
                    for n in rest { n.print_helper(&l, f)?; }
                    let l = format!("{}   ", level);
                    last.print_helper(&l, f)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.print_helper("", f)
    }
}

/// A token level edit that turns the input into a sentence of the grammar.
/// Positions index the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// something matching `expected` is missing before token `at`
    Insert { at: usize, expected: String },
    Delete { at: usize, found: String },
    Replace { at: usize, found: String, expected: String },
}

/// The cheapest derivation and the error productions it went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub cost: u32,
    pub tree: Tree,
    /// canonical text of every error production used, in tree order
    pub error_rules: Vec<String>,
    pub repairs: Vec<Repair>,
}

/// Walks back-pointers from an accepted state.
pub(crate) struct Extractor<'a, 'g> {
    pub chart: &'a Chart<'g>,
    pub grammar: &'a ErrorGrammar,
    pub tokens: &'a [String],
}

impl<'a, 'g> Extractor<'a, 'g> {
    pub fn tree(&self, id: StateId) -> Tree {
        let g = self.grammar.grammar();
        let state = self.chart.state(id);
        match state.production {
            Production::Lexeme(sym) =>
                Tree::Leaf(g.name(sym).to_string(), self.tokens[state.origin].clone()),
            Production::Rule(rule) => Tree::Node(
                g.name(g.rule(rule).lhs).to_string(),
                state.back_pointers.iter().map(|child| self.tree(*child)).collect()),
        }
    }

    pub fn derivation(&self, id: StateId) -> Derivation {
        let mut derivation = Derivation{
            cost: self.chart.state(id).cost,
            tree: self.tree(id),
            error_rules: Vec::new(),
            repairs: Vec::new(),
        };
        self.collect(id, None, &mut derivation);
        derivation
    }

    fn collect(&self, id: StateId, parent: Option<Symbol>, out: &mut Derivation) {
        let (eg, g) = (self.grammar, self.grammar.grammar());
        let state = self.chart.state(id);
        // the tag an enclosing Err_T stood in for
        let replaced = parent.and_then(|p| eg.stands_for(p));
        match state.production {
            Production::Rule(rule_id) => {
                let rule = g.rule(rule_id);
                if rule.kind.is_error() {
                    out.error_rules.push(eg.rule_key(rule_id));
                }
                if rule.lhs == eg.err_tag() && rule.rhs.is_empty() {
                    if let Some(tag) = replaced {
                        out.repairs.push(Repair::Insert{at: state.origin, expected: g.name(tag).to_string()});
                    }
                }
                for child in &state.back_pointers {
                    self.collect(*child, Some(rule.lhs), out);
                }
            },
            Production::Lexeme(sym) => {
                let found = &self.tokens[state.origin];
                let token = g.symbol(found);
                if sym != eg.err_tag() && sym != eg.insert_err() {
                    return;
                }
                if let Some(alternative) = token.and_then(|t| eg.scan_rule(sym, t)) {
                    out.error_rules.push(eg.rule_key(alternative));
                }
                if sym == eg.insert_err() {
                    out.repairs.push(Repair::Delete{at: state.origin, found: found.clone()});
                } else if let Some(tag) = replaced {
                    if !token.is_some_and(|t| eg.tag_accepts(tag, t)) {
                        out.repairs.push(Repair::Replace{
                            at: state.origin,
                            found: found.clone(),
                            expected: g.name(tag).to_string(),
                        });
                    }
                }
            },
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
