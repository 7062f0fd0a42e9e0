#![deny(warnings)]

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_COST: u32 = 8;

/// Knobs for a single parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Highest total error cost a derivation may carry.
    pub max_cost: u32,
    /// Abort with `ParseError::ChartLimit` when the chart holds more states.
    pub max_states: Option<usize>,
    /// Abort with `ParseError::Timeout` past this wall-clock time.
    pub time_limit: Option<Duration>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig{max_cost: DEFAULT_MAX_COST, max_states: None, time_limit: None}
    }
}

impl ParserConfig {
    pub fn with_max_cost(mut self, max_cost: u32) -> Self {
        self.max_cost = max_cost;
        self
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

const PYTHON_TAGS: &[&str] = &[
    "Indent", "Dedent", "Open_Paren", "Close_Paren", "Comma", "Literals",
    "Simple_Name", "Vfpdef", "Assign_Op", "Arith_Op", "MulDiv_Op", "Unary_Op",
    "Def_Keyword", "Colon", "Open_Sq_Bracket", "Close_Sq_Bracket",
];

const PYTHON_TERMINALS: &[&str] = &[
    "_INDENT_", "_DEDENT_", "(", ")", ",", "_STRING_", "_NAME_", "_NUMBER_",
    "=", "+", "-", "//", "/", "%", "**", "*", "@", "def", ":", "[", "]",
];

// Line and stream terminators are never rewritten into error tags
const LITERAL_TAGS: &[&str] = &["Newline", "Endmarker"];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Which symbols of the base grammar get error productions.
/// The default targets the Python grammar the tokenizer feeds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorGrammarConfig {
    /// Tags that may be substituted or preceded by an extra token.
    pub important_tags: Vec<String>,
    /// Terminals that may be inserted or stand in for a tag.
    pub important_terminals: Vec<String>,
    /// Tags always matched literally, even when listed as important.
    pub literal_tags: Vec<String>,
}

impl Default for ErrorGrammarConfig {
    fn default() -> Self {
        ErrorGrammarConfig{
            important_tags: owned(PYTHON_TAGS),
            important_terminals: owned(PYTHON_TERMINALS),
            literal_tags: owned(LITERAL_TAGS),
        }
    }
}

impl ErrorGrammarConfig {
    /// Error productions for a grammar other than Python's.
    pub fn for_tags<T, U>(tags: &[T], terminals: &[U]) -> Self
            where T: AsRef<str>, U: AsRef<str> {
        ErrorGrammarConfig{
            important_tags: tags.iter().map(|t| t.as_ref().to_string()).collect(),
            important_terminals: terminals.iter().map(|t| t.as_ref().to_string()).collect(),
            literal_tags: owned(LITERAL_TAGS),
        }
    }

    pub(crate) fn is_literal(&self, tag: &str) -> bool {
        self.literal_tags.iter().any(|t| t == tag)
    }

    pub(crate) fn is_important(&self, tag: &str) -> bool {
        self.important_tags.iter().any(|t| t == tag)
    }
}

///////////////////////////////////////////////////////////////////////////////
