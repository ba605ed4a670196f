pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;
pub mod word;

pub use token::{significant_tokens, LexMode, Token, TokenSpan, Tokenizer, TokenizerError};
