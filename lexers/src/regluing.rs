#![deny(warnings)]

use crate::python_tokenizer::{Token, TokenKind, ARROW, NEWLINE, NUMBER, STRING};

// Compound operators rebuilt from adjacent operator characters
const GLUED: &[&str] = &[
    "**", "==", "<=", ">=", "!=", "<<", ">>", "&&", "||", "//",
    "+=", "-=", "/=", "*=", "%=", "@=", "|=", "&=", "^=",
    ">>=", "<<=", "//=", "**=", "&&=", "!!=", "...", "->",
];

// `->` never survives, it becomes `_arrow_`
pub(crate) fn is_glued(op: &str) -> bool {
    op != "->" && GLUED.contains(&op)
}

/// Final clean-up over the canonical stream. Every merge keeps terminals and
/// literals aligned.
pub(crate) fn reglue(tokens: Vec<Token>) -> Vec<Token> {
    let tokens = glue_operators(tokens);
    let tokens = join_word_operators(tokens);
    let tokens = collapse_literals(tokens);
    drop_redundant_newlines(tokens)
}

fn glued(tokens: &[Token], width: usize) -> Option<String> {
    if tokens.len() < width ||
        tokens[..width].iter().any(|t| t.kind != TokenKind::Operator) ||
        tokens[1..width].iter().any(|t| t.spaced) {
        return None;
    }
    let op: String = tokens[..width].iter().map(|t| t.literal.as_str()).collect();
    GLUED.contains(&op.as_str()).then_some(op)
}

// longest match first so `**=` wins over `**`
fn glue_operators(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut idx = 0;
    while idx < tokens.len() {
        let mut token = tokens[idx].clone();
        let mut width = 1;
        for w in [3, 2] {
            if let Some(op) = glued(&tokens[idx..], w) {
                token.terminal = if op == "->" { ARROW.to_string() } else { op.clone() };
                token.literal = op;
                width = w;
                break;
            }
        }
        out.push(token);
        idx += width;
    }
    out
}

fn join_word_operators(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let joined = match (out.last().map(|t| t.terminal.as_str()), token.terminal.as_str()) {
            (Some("not"), "in") => Some("not_in"),
            (Some("is"), "not") => Some("is_not"),
            _ => None,
        };
        if let (Some(joined), Some(prev)) = (joined, out.last_mut()) {
            prev.terminal = joined.to_string();
            prev.literal = format!("{} {}", prev.literal, token.literal);
            continue;
        }
        out.push(token);
    }
    out
}

// Implicit string concatenation becomes one literal. Numbers only merge
// when nothing separates them in the source.
fn collapse_literals(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match out.last_mut() {
            Some(prev) if prev.terminal == STRING && token.terminal == STRING => {
                prev.literal = format!("{} {}", prev.literal, token.literal);
            },
            Some(prev) if prev.terminal == NUMBER && token.terminal == NUMBER && !token.spaced => {
                prev.literal.push_str(&token.literal);
            },
            _ => out.push(token),
        }
    }
    out
}

fn drop_redundant_newlines(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let closing = matches!(token.terminal.as_str(), ")" | "]" | "}");
        if closing && out.last().is_some_and(|t| t.terminal == NEWLINE) {
            out.pop();
        }
        let repeated_newline = token.terminal == NEWLINE && match out.as_slice() {
            [.., colon, newline] => colon.terminal == ":" && newline.terminal == NEWLINE,
            _ => false,
        };
        if !repeated_newline {
            out.push(token);
        }
    }
    out
}

///////////////////////////////////////////////////////////////////////////////
