#![deny(warnings)]

use crate::helpers;
use crate::scanner::Scanner;

/// Stands in for a whole string literal in masked text.
pub const STRING_MARK: char = '\u{E000}';

/// Source text with comments and line continuations removed and every
/// string literal replaced by a single `STRING_MARK`.
#[derive(Debug, Default, PartialEq)]
pub struct Masked {
    pub text: String,
    // original literal text, in order of appearance
    pub literals: Vec<String>,
}

pub fn mask(source: &str) -> Masked {
    let mut src = Scanner::new(source.chars());
    let mut masked = Masked::default();
    while src.peek().is_some() {
        src.ignore();
        if let Some(literal) = helpers::scan_string_literal(&mut src) {
            masked.text.push(STRING_MARK);
            masked.literals.push(literal);
        } else if let Some(word) = helpers::scan_identifier(&mut src) {
            // words are consumed whole so a trailing `b` or `r` isn't a prefix
            masked.text.push_str(&word);
        } else if src.accept_char('#') {
            src.until_any_char("\n");
        } else if src.accept_char('\\') {
            src.skip_blanks();
            if !src.accept_char('\n') {
                masked.text.push_str(&src.extract_string());
            }
        } else if let Some(c) = src.next() {
            masked.text.push(if c == STRING_MARK { char::REPLACEMENT_CHARACTER } else { c });
        }
    }
    masked
}

///////////////////////////////////////////////////////////////////////////////
