#![deny(warnings)]

mod error;
pub use crate::error::{GrammarError, ParseError};

mod grammar;
pub use crate::grammar::{Grammar, GrammarBuilder, Rule, RuleId, RuleKind, Symbol, SymbolClass};

mod config;
pub use crate::config::{ErrorGrammarConfig, ParserConfig};

mod error_grammar;
pub use crate::error_grammar::{ErrorGrammar, AUGMENTED_START, ERR_TAG, INSERT_ERR};

mod items;
pub use crate::items::{Production, State, StateId, StateKey};

mod chart;
pub use crate::chart::{Chart, ChartEntry};

mod cost;
pub use crate::cost::{Additive, Completion, CostPolicy, TruePositiveFree};

mod parser;
pub use crate::parser::{ErrorEarleyParser, ParseChart};

mod trees;
pub use crate::trees::{Derivation, Repair, Tree};

mod program;
pub use crate::program::{program_has_parse, split_functions, tokenize_for};

/// Whether `tokens` parse within `config.max_cost` corrections.
pub fn has_parse<I>(tokens: I, grammar: &ErrorGrammar, config: &ParserConfig) -> Result<bool, ParseError>
        where I: IntoIterator, I::Item: AsRef<str> {
    Ok(ErrorEarleyParser::new(grammar, config.clone()).parse(tokens)?.has_parse())
}

/// The cheapest derivation of `tokens`, if there's one within budget.
pub fn parse_tree<I>(tokens: I, grammar: &ErrorGrammar, config: &ParserConfig) -> Result<Option<Tree>, ParseError>
        where I: IntoIterator, I::Item: AsRef<str> {
    Ok(ErrorEarleyParser::new(grammar, config.clone()).parse(tokens)?.tree())
}

#[cfg(test)]
mod parser_test;
