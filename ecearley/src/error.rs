#![deny(warnings)]

use std::time::Duration;

/// Problems found while loading or augmenting a grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("line {line}: malformed rule {text:?}")]
    Malformed { line: usize, text: String },
    #[error("missing start symbol: {0}")]
    MissingStart(String),
    #[error("important tag {0} is a terminal")]
    NotANonterminal(String),
    #[error("symbol {0} is reserved for error productions")]
    ReservedSymbol(String),
    #[error("symbol is neither defined nor a known terminal: {0}")]
    UnknownSymbol(String),
}

/// A parse aborted before reaching a verdict. Running out of cost budget is
/// not an error, it's reported as "no parse".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("chart grew past {limit} states")]
    ChartLimit { limit: usize },
    #[error("parse ran longer than {limit:?}")]
    Timeout { limit: Duration },
}
