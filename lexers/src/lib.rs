mod scanner;
mod helpers;
mod masking;
mod python_tokenizer;
mod regluing;

pub use scanner::Scanner;
pub use python_tokenizer::{tokenize, is_python_terminal, Tokenized, LineTokenizer, Lexeme, TokenKind};
pub use python_tokenizer::{
    ARROW, DEDENT, ENDMARKER, INDENT, NAME, NEWLINE, NUMBER, STRING, UNKNOWN,
};

pub use helpers::scan_identifier;
pub use helpers::scan_number;
pub use helpers::scan_operator;
pub use helpers::scan_punctuation;
pub use helpers::scan_string_literal;
pub use helpers::scan_xob_integer;
