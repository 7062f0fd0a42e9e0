#![deny(warnings)]

use crate::error_grammar::ErrorGrammar;
use crate::grammar::Symbol;

/// A completed state about to advance a state waiting on its lhs.
#[derive(Clone, Copy, Debug)]
pub struct Completion {
    /// lhs of the waiting production
    pub waiting_lhs: Symbol,
    pub waiting_cost: u32,
    /// lhs of the completed production, or the tag it scanned
    pub completed_lhs: Symbol,
    pub completed_cost: u32,
    /// error score of the completed production
    pub error_score: u32,
    /// the token matched when the completed state is a single lexeme
    pub token: Option<Symbol>,
}

/// Prices the state produced by a completion.
pub trait CostPolicy {
    fn completion_cost(&self, grammar: &ErrorGrammar, completion: &Completion) -> u32;
}

/// Every cost adds up.
#[derive(Clone, Copy, Debug, Default)]
pub struct Additive;

impl CostPolicy for Additive {
    fn completion_cost(&self, _: &ErrorGrammar, c: &Completion) -> u32 {
        c.waiting_cost + c.completed_cost + c.error_score
    }
}

/// Like `Additive`, but a substitution by a token the replaced tag accepts
/// anyway is no error at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct TruePositiveFree;

impl CostPolicy for TruePositiveFree {
    fn completion_cost(&self, grammar: &ErrorGrammar, c: &Completion) -> u32 {
        let true_positive = c.completed_lhs == grammar.err_tag() && c.token
            .zip(grammar.stands_for(c.waiting_lhs))
            .is_some_and(|(token, tag)| grammar.tag_accepts(tag, token));
        if true_positive {
            c.waiting_cost
        } else {
            Additive.completion_cost(grammar, c)
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
