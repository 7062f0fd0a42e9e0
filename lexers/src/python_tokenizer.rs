#![deny(warnings)]

use crate::helpers;
use crate::masking::{self, STRING_MARK};
use crate::regluing;
use crate::scanner::Scanner;

pub const INDENT: &str = "_INDENT_";
pub const DEDENT: &str = "_DEDENT_";
pub const NEWLINE: &str = "_NEWLINE_";
pub const ENDMARKER: &str = "_ENDMARKER_";
pub const NAME: &str = "_NAME_";
pub const NUMBER: &str = "_NUMBER_";
pub const STRING: &str = "_STRING_";
pub const UNKNOWN: &str = "_UNKNOWN_";
pub const ARROW: &str = "_arrow_";

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "lambda", "nonlocal", "pass",
    "raise", "return", "try", "while", "with", "yield",
];

// word operators are classified along with symbolic ones
const OPERATOR_WORDS: &[&str] = &["and", "in", "is", "not", "or"];

// operators that keep a bracketed expression going across lines
const CONTINUING_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "in", "or", "and",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Name,
    Number,
    String,
    Punctuation,
    Operator,
    Keyword,
    Whitespace,
    Newline,
    Indent,
    Dedent,
    EndMarker,
    Unknown,
}

/// A classified piece of one physical line.
#[derive(Clone, PartialEq, Debug)]
pub struct Lexeme {
    pub kind: TokenKind,
    pub text: String,
}

impl Lexeme {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Lexeme{kind, text: text.into()}
    }

    fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    fn is_real(&self) -> bool {
        !matches!(self.kind, TokenKind::Whitespace | TokenKind::Newline)
    }
}

/// Scans a single masked line into lexemes. String literals were replaced by
/// `STRING_MARK` and their text is pulled back from `literals` in order.
pub struct LineTokenizer<'a, I, L>
    where I: Iterator<Item=char>, L: Iterator<Item=String>
{
    src: Scanner<I>,
    literals: &'a mut L,
}

impl<'a, I, L> LineTokenizer<'a, I, L>
    where I: Iterator<Item=char>, L: Iterator<Item=String>
{
    pub fn new(source: I, literals: &'a mut L) -> Self {
        LineTokenizer{src: Scanner::new(source), literals}
    }

    fn get_token(&mut self) -> Option<Lexeme> {
        self.src.ignore();
        if self.src.skip_blanks() {
            Some(Lexeme::new(TokenKind::Whitespace, self.src.extract_string()))
        } else if self.src.accept_char(STRING_MARK) {
            self.src.ignore();
            let literal = self.literals.next().unwrap_or_default();
            Some(Lexeme::new(TokenKind::String, literal))
        } else if let Some(num) = helpers::scan_number(&mut self.src) {
            Some(Lexeme::new(TokenKind::Number, num))
        } else if let Some(word) = helpers::scan_identifier(&mut self.src) {
            let kind = if KEYWORDS.contains(&word.as_str()) {
                TokenKind::Keyword
            } else if OPERATOR_WORDS.contains(&word.as_str()) {
                TokenKind::Operator
            } else {
                TokenKind::Name
            };
            Some(Lexeme::new(kind, word))
        } else if let Some(punct) = helpers::scan_punctuation(&mut self.src) {
            Some(Lexeme::new(TokenKind::Punctuation, punct))
        } else if let Some(op) = helpers::scan_operator(&mut self.src) {
            Some(Lexeme::new(TokenKind::Operator, op))
        } else if self.src.next().is_some() {
            Some(Lexeme::new(TokenKind::Unknown, self.src.extract_string()))
        } else {
            None
        }
    }
}

impl<I, L> Iterator for LineTokenizer<'_, I, L>
    where I: Iterator<Item=char>, L: Iterator<Item=String>
{
    type Item = Lexeme;
    fn next(&mut self) -> Option<Self::Item> {
        self.get_token()
    }
}

/// One terminal of the output stream with the source text it stands for.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub terminal: String,
    pub literal: String,
    // whitespace (or a line break) separates it from the previous token
    pub spaced: bool,
}

impl Token {
    fn marker(kind: TokenKind, terminal: &str, literal: impl Into<String>) -> Self {
        Token{kind, terminal: terminal.to_string(), literal: literal.into(), spaced: true}
    }

    fn from_lexeme(lexeme: Lexeme, spaced: bool) -> Self {
        let terminal = match lexeme.kind {
            TokenKind::Name => NAME.to_string(),
            TokenKind::Number => NUMBER.to_string(),
            TokenKind::String => STRING.to_string(),
            TokenKind::Newline => NEWLINE.to_string(),
            _ => lexeme.text.clone(),
        };
        Token{kind: lexeme.kind, terminal, literal: lexeme.text, spaced}
    }
}

/// Canonical terminal stream plus the source text of every terminal.
///
/// Both vectors are always the same length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub terminals: Vec<String>,
    pub literals: Vec<String>,
}

impl Tokenized {
    /// The space separated stream the grammar is written against.
    pub fn canonical(&self) -> String {
        self.terminals.join(" ")
    }

    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item=(&str, &str)> {
        self.terminals.iter().map(String::as_str)
            .zip(self.literals.iter().map(String::as_str))
    }

    fn from_tokens(tokens: Vec<Token>) -> Self {
        let (terminals, literals) = tokens.into_iter()
            .map(|t| (t.terminal, t.literal))
            .unzip();
        Tokenized{terminals, literals}
    }

    /// Replace terminals outside of an alphabet with `_UNKNOWN_`.
    pub fn restrict_to(&self, is_terminal: impl Fn(&str) -> bool) -> Tokenized {
        let terminals = self.terminals.iter()
            .map(|t| if is_terminal(t) { t.clone() } else { UNKNOWN.to_string() })
            .collect();
        Tokenized{terminals, literals: self.literals.clone()}
    }
}


struct Line {
    indent: usize,
    lexemes: Vec<Lexeme>,
}

// Tabs advance to the next multiple of 4, a form feed resets the count.
fn measure_indent(line: &str) -> (usize, &str) {
    let mut width = 0;
    for (idx, c) in line.char_indices() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 4 + 1) * 4,
            '\x0c' => width = 0,
            _ => return (width, &line[idx..]),
        }
    }
    (width, "")
}

fn physical_lines<L: Iterator<Item=String>>(masked: &str, literals: &mut L) -> Vec<Line> {
    let mut lines = Vec::new();
    for raw in masked.split('\n') {
        let (indent, body) = measure_indent(raw);
        if body.trim().is_empty() {
            continue;
        }
        let mut lexemes: Vec<_> = LineTokenizer::new(body.chars(), literals).collect();
        lexemes.push(Lexeme::new(TokenKind::Newline, "\n"));
        lines.push(Line{indent, lexemes});
    }
    lines
}

#[derive(Default)]
struct Nesting {
    parens: usize,
    squares: usize,
    curlies: usize,
}

impl Nesting {
    fn depth(&self) -> usize {
        self.parens + self.squares + self.curlies
    }

    fn track(&mut self, lexemes: &[Lexeme]) {
        for lx in lexemes.iter().filter(|lx| lx.kind == TokenKind::Punctuation) {
            match lx.text.as_str() {
                "(" => self.parens += 1,
                ")" => self.parens = self.parens.saturating_sub(1),
                "[" => self.squares += 1,
                "]" => self.squares = self.squares.saturating_sub(1),
                "{" => self.curlies += 1,
                "}" => self.curlies = self.curlies.saturating_sub(1),
                _ => (),
            }
        }
    }

    // the last real lexeme of a line asks for the next line to join it
    fn continued_by(&self, last: &Lexeme) -> bool {
        let nested = self.depth() > 0;
        match last.kind {
            TokenKind::Punctuation => match last.text.as_str() {
                "\\" | "(" | "[" | "{" => true,
                "," => nested,
                ":" => self.curlies > 0,
                _ => false,
            },
            TokenKind::Operator => nested && CONTINUING_OPERATORS.contains(&last.text.as_str()),
            TokenKind::String => nested,
            _ => false,
        }
    }

    // the first real lexeme of a line joins it to the previous one
    fn continues(&self, first: &Lexeme) -> bool {
        if self.depth() == 0 {
            return false;
        }
        match first.kind {
            TokenKind::Punctuation => matches!(first.text.as_str(), "," | ")" | "]" | "}" | "(" | "["),
            TokenKind::Operator => CONTINUING_OPERATORS.contains(&first.text.as_str()),
            TokenKind::Keyword => first.is(TokenKind::Keyword, "for"),
            _ => false,
        }
    }
}

// Physical lines are glued while brackets are open and the boundary looks
// like a continuation. The joined line keeps the first line's indentation.
fn logical_lines(lines: Vec<Line>) -> Vec<Line> {
    let mut nesting = Nesting::default();
    let mut logical: Vec<Line> = Vec::new();
    for line in lines {
        let joins = match logical.last() {
            Some(prev) => {
                prev.lexemes.iter().rev().find(|lx| lx.is_real())
                    .is_some_and(|last| nesting.continued_by(last)) ||
                line.lexemes.iter().find(|lx| lx.is_real())
                    .is_some_and(|first| nesting.continues(first))
            },
            None => false,
        };
        nesting.track(&line.lexemes);
        match logical.last_mut() {
            Some(prev) if joins => {
                if prev.lexemes.last().is_some_and(|lx| lx.kind == TokenKind::Newline) {
                    prev.lexemes.pop();
                }
                prev.lexemes.push(Lexeme::new(TokenKind::Whitespace, "\n"));
                prev.lexemes.extend(line.lexemes);
            },
            _ => logical.push(line),
        }
    }
    logical
}

// Emit indentation markers from the stack of open levels, drop whitespace
// and canonicalize every lexeme.
fn layout(lines: Vec<Line>) -> Vec<Token> {
    let mut levels: Vec<usize> = Vec::new();
    let mut tokens = Vec::new();
    for line in lines {
        let current = levels.last().copied().unwrap_or(0);
        if line.indent > current {
            levels.push(line.indent);
            tokens.push(Token::marker(TokenKind::Indent, INDENT, " ".repeat(line.indent)));
        }
        while levels.last().is_some_and(|&level| level > line.indent) {
            levels.pop();
            tokens.push(Token::marker(TokenKind::Dedent, DEDENT, ""));
        }
        let mut spaced = true;
        for lexeme in line.lexemes {
            if lexeme.kind == TokenKind::Whitespace {
                spaced = true;
                continue;
            }
            tokens.push(Token::from_lexeme(lexeme, spaced));
            spaced = false;
        }
    }
    for _ in levels {
        tokens.push(Token::marker(TokenKind::Dedent, DEDENT, ""));
    }
    tokens.push(Token::marker(TokenKind::EndMarker, ENDMARKER, ""));
    tokens
}

/// Turn python source into the canonical terminal stream.
///
/// This never fails. Malformed input (unbalanced brackets, unterminated
/// strings, stray characters) yields a best-effort stream and is left for
/// the parser to repair.
pub fn tokenize(source: &str) -> Tokenized {
    let masked = masking::mask(source);
    let mut literals = masked.literals.into_iter();
    let lines = physical_lines(&masked.text, &mut literals);
    let tokens = layout(logical_lines(lines));
    Tokenized::from_tokens(regluing::reglue(tokens))
}

/// Whether `terminal` belongs to the alphabet `tokenize` speaks for
/// well-formed Python. Stray characters and `_UNKNOWN_` are outside of it.
pub fn is_python_terminal(terminal: &str) -> bool {
    let single = |set: &str| {
        let mut chars = terminal.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if set.contains(c))
    };
    [INDENT, DEDENT, NEWLINE, ENDMARKER, NAME, NUMBER, STRING, ARROW].contains(&terminal) ||
        KEYWORDS.contains(&terminal) ||
        OPERATOR_WORDS.contains(&terminal) ||
        ["not_in", "is_not"].contains(&terminal) ||
        regluing::is_glued(terminal) ||
        single(helpers::PUNCTUATION_CHARS) ||
        single(helpers::OPERATOR_CHARS)
}

///////////////////////////////////////////////////////////////////////////////
