#![deny(warnings)]

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::error_grammar::ErrorGrammar;
use crate::parser::ErrorEarleyParser;
use lexers::{tokenize, Tokenized};
use tracing::debug;

/// Tokenize Python source for `grammar`. Terminals the grammar doesn't know
/// become `_UNKNOWN_`.
pub fn tokenize_for(source: &str, grammar: &ErrorGrammar) -> Tokenized {
    let g = grammar.grammar();
    tokenize(source).restrict_to(|t| g.symbol(t).is_some_and(|sym| g.is_terminal(sym)))
}

/// Cut a program at every top-level `def`, each piece keeps its keyword.
pub fn split_functions(source: &str) -> Vec<String> {
    source.split("\ndef ")
        .enumerate()
        .map(|(idx, chunk)| match idx {
            0 => chunk.to_string(),
            _ => format!("def {}", chunk),
        })
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
}

/// Whether every top-level piece of the program parses within the budget.
pub fn program_has_parse(source: &str, grammar: &ErrorGrammar, config: &ParserConfig)
        -> Result<bool, ParseError> {
    let parser = ErrorEarleyParser::new(grammar, config.clone());
    for (idx, chunk) in split_functions(source).iter().enumerate() {
        let tokens = tokenize_for(chunk, grammar);
        if !parser.parse(&tokens.terminals)?.has_parse() {
            debug!(chunk = idx, tokens = tokens.len(), "piece has no parse");
            return Ok(false);
        }
    }
    Ok(true)
}

///////////////////////////////////////////////////////////////////////////////
