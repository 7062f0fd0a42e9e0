#![deny(warnings)]

use crate::grammar::{Grammar, RuleId, Symbol};
use std::fmt;

/// Index of a State in the chart's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StateId(pub(crate) u32);

impl StateId {
    pub fn index(self) -> usize { self.0 as usize }
}

/// What a State is matching.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Production {
    Rule(RuleId),
    /// A single token scanned for a tag (or a bare terminal).
    /// Always complete, it spans exactly one token.
    Lexeme(Symbol),
}

/// States sharing a key are the same item; only the cheapest one is kept.
/// The end position is implied by the chart entry holding the state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StateKey {
    pub production: Production,
    pub dot: usize,
    pub origin: usize,
}

/// A partially matched production with its accumulated error cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub production: Production,
    pub dot: usize,          // symbols matched so far
    pub origin: usize,       // input position where the match starts
    pub end: usize,          // input position where the match ends
    pub cost: u32,
    /// completed children matched so far, left to right
    pub back_pointers: Vec<StateId>,
}

impl State {
    pub fn predicted(rule: RuleId, pos: usize) -> State {
        State{
            production: Production::Rule(rule),
            dot: 0,
            origin: pos,
            end: pos,
            cost: 0,
            back_pointers: Vec::new(),
        }
    }

    pub fn lexeme(symbol: Symbol, pos: usize, cost: u32) -> State {
        State{
            production: Production::Lexeme(symbol),
            dot: 1,
            origin: pos,
            end: pos + 1,
            cost,
            back_pointers: Vec::new(),
        }
    }

    /// Move the dot over `child`, which completed at `end`.
    pub fn advanced(&self, child: StateId, end: usize, cost: u32) -> State {
        let mut back_pointers = self.back_pointers.clone();
        back_pointers.push(child);
        State{
            production: self.production,
            dot: self.dot + 1,
            origin: self.origin,
            end,
            cost,
            back_pointers,
        }
    }

    pub fn key(&self) -> StateKey {
        StateKey{production: self.production, dot: self.dot, origin: self.origin}
    }

    pub fn lhs(&self, grammar: &Grammar) -> Symbol {
        match self.production {
            Production::Rule(id) => grammar.rule(id).lhs,
            Production::Lexeme(sym) => sym,
        }
    }

    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        match self.production {
            Production::Rule(id) => grammar.rule(id).rhs.get(self.dot).copied(),
            Production::Lexeme(_) => None,
        }
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        match self.production {
            Production::Rule(id) => self.dot >= grammar.rule(id).rhs.len(),
            Production::Lexeme(_) => true,
        }
    }

    /// Extra cost charged when this state completes into its parent.
    /// Lexemes paid theirs when scanned.
    pub fn error_score(&self, grammar: &Grammar) -> u32 {
        match self.production {
            Production::Rule(id) => grammar.rule(id).error_score(),
            Production::Lexeme(_) => 0,
        }
    }

    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> impl fmt::Display + 'a {
        StateDisplay{state: self, grammar}
    }
}

struct StateDisplay<'a> {
    state: &'a State,
    grammar: &'a Grammar,
}

impl<'a> fmt::Display for StateDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (s, g) = (self.state, self.grammar);
        let names = |syms: &[Symbol]| syms.iter()
            .map(|sym| g.name(*sym)).collect::<Vec<_>>().join(" ");
        let (pre, post) = match s.production {
            Production::Rule(id) => {
                let rhs = &g.rule(id).rhs;
                (names(&rhs[..s.dot]), names(&rhs[s.dot..]))
            },
            // the scanned token itself isn't kept on the state
            Production::Lexeme(_) => ("_".to_string(), String::new()),
        };
        write!(f, "({} - {}) {} -> {} \u{00b7} {} #cost: {} #bp: {}",
               s.origin, s.end, g.name(s.lhs(g)), pre, post, s.cost, s.back_pointers.len())
    }
}

///////////////////////////////////////////////////////////////////////////////
