#![deny(warnings)]

use crate::scanner::Scanner;

/*
 * The caller of these functions is expected to setup the scanner for a
 * clear start, ie: call scanner.ignore() to start fresh. On a miss the
 * scanner is left where it was.
 */

const DIGITS: &str = "0123456789_";

// Valid (case-insensitive) string prefixes: r u b f br rb fr rf
fn is_string_prefix(prefix: &[char]) -> bool {
    let prefix: String = prefix.iter().collect::<String>().to_lowercase();
    matches!(prefix.as_str(), "" | "r" | "u" | "b" | "f" | "br" | "rb" | "fr" | "rf")
}

// scan numbers like [0-9_]+(\.[0-9_]*)?([eE][+-]?[0-9]+)?[jJ]? or \.[0-9]+...
pub fn scan_number<I: Iterator<Item=char>>(scanner: &mut Scanner<I>) -> Option<String> {
    match (scanner.peek(), scanner.peek_nth(1)) {
        (Some(c), _) if c.is_ascii_digit() => (),
        (Some('.'), Some(c)) if c.is_ascii_digit() => (),
        _ => return None,
    }
    if let Some(integer) = scan_xob_integer(scanner) {
        return Some(integer);
    }
    scanner.skip_all_chars(DIGITS);
    // fractional part may be empty, as in `1.`
    if scanner.accept_char('.') {
        scanner.skip_all_chars(DIGITS);
    }
    // check for exponent part
    let backtrack = scanner.pos();
    if scanner.accept_any_char("eE").is_some() {
        scanner.accept_any_char("+-"); // exponent sign is optional
        if !scanner.skip_all_chars(DIGITS) {
            scanner.set_pos(backtrack);
        }
    }
    scanner.accept_any_char("jJ"); // imaginary suffix
    Some(scanner.extract_string())
}

// scan integers like 0x34 0b1010_1010 0o657
pub fn scan_xob_integer<I: Iterator<Item=char>>(scanner: &mut Scanner<I>) -> Option<String> {
    let backtrack = scanner.pos();
    if scanner.accept_char('0') &&
        match scanner.accept_any_char("xXoObB") {
            Some('x' | 'X') => scanner.skip_all_chars("0123456789ABCDEFabcdef_"),
            Some('o' | 'O') => scanner.skip_all_chars("01234567_"),
            Some('b' | 'B') => scanner.skip_all_chars("01_"),
            _ => false,
        } {
        return Some(scanner.extract_string());
    }
    scanner.set_pos(backtrack);
    None
}

/// Scan a complete string literal including its prefix and quotes.
///
/// Handles single, double and triple quotes with backslash escapes. Once an
/// opening quote is seen this never fails: an unterminated single-line string
/// stops before the line break, an unterminated triple-quoted string takes
/// the rest of the input.
pub fn scan_string_literal<I: Iterator<Item=char>>(scanner: &mut Scanner<I>) -> Option<String> {
    let backtrack = scanner.pos();
    scanner.skip_all_chars("rRbBuUfF");
    if !is_string_prefix(scanner.view()) {
        scanner.set_pos(backtrack);
        return None;
    }
    let Some(quote) = scanner.accept_any_char("'\"") else {
        scanner.set_pos(backtrack);
        return None;
    };
    let closing: String = [quote, quote].iter().collect();
    // `''` fails this check and closes right away in the loop
    let triple = scanner.accept_str(&closing);
    while let Some(c) = scanner.next() {
        match c {
            '\\' => { scanner.next(); },
            '\n' if !triple => { scanner.prev(); break; },
            c if c == quote && (!triple || scanner.accept_str(&closing)) => break,
            _ => (),
        }
    }
    Some(scanner.extract_string())
}

// scan identifiers, unicode letters are accepted like python does
pub fn scan_identifier<I: Iterator<Item=char>>(scanner: &mut Scanner<I>) -> Option<String> {
    scanner.accept_if(|c| c.is_alphabetic() || *c == '_')?;
    scanner.advance_while(|c| c.is_alphanumeric() || *c == '_');
    Some(scanner.extract_string())
}

pub(crate) const PUNCTUATION_CHARS: &str = "()[]{}:;,\\";
pub(crate) const OPERATOR_CHARS: &str = "+-*/%@=<>&|^~!.";

pub fn scan_punctuation<I: Iterator<Item=char>>(scanner: &mut Scanner<I>) -> Option<String> {
    scanner.accept_any_char(PUNCTUATION_CHARS)?;
    Some(scanner.extract_string())
}

// Only a few pairs are scanned glued, the rest of compound operators
// are re-assembled from single characters later on.
pub fn scan_operator<I: Iterator<Item=char>>(scanner: &mut Scanner<I>) -> Option<String> {
    for glued in ["!=", "==", "<<", ">>"] {
        if scanner.accept_str(glued) {
            return Some(scanner.extract_string());
        }
    }
    scanner.accept_any_char(OPERATOR_CHARS)?;
    Some(scanner.extract_string())
}

///////////////////////////////////////////////////////////////////////////////
