use thiserror::Error;

use crate::analyzer::ParseError;
use crate::command::CommandError;
use crate::config::ConfigError;
use crate::keys::DictionaryError;
use crate::message::MessageError;
use crate::parser::GrammarError;
use crate::tokenizer::TokenizerError;
use crate::types::{ValueError, ValueTypeError};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("Message error: {0}")]
    Message(#[from] MessageError),
    // types
    #[error("Value type error: {0}")]
    ValueType(#[from] ValueTypeError),
    #[error("Value error: {0}")]
    Value(#[from] ValueError),
    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
