//! Keyword declarations grouped into per-actor dictionaries.
//!
//! A [`Key`] names a keyword and the value shape it expects. Keys of one
//! actor live in a [`KeysDictionary`], which is registered process wide
//! once loaded so later lookups by name reuse the same instance.

pub mod dictionary;
pub mod key;
pub mod loader;
pub mod registry;
pub mod typed_values;

use thiserror::Error;

use crate::{message::MessageError, types::ValueTypeError};

pub use dictionary::{KeysDictionary, Version};
pub use key::Key;
pub use loader::DictionaryLoader;
pub use typed_values::TypedValues;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DictionaryError {
    #[error("Repetition range only allowed for last value type")]
    RepetitionRange,
    #[error("KeysDictionary name is not unique: {0}")]
    NotUnique(String),
    #[error("Unresolved type ByName(\"{0}\")")]
    Unresolved(String),
    #[error("value types do not match for keyword {name}: {values}")]
    ValueMismatch { name: String, values: String },
    #[error("Invalid name: must be lower case: {0}")]
    InvalidName(String),
    #[error("no such key: {0}")]
    NoSuchKey(String),
    #[error("no keys dictionary found for {name}: {reason}")]
    NotFound { name: String, reason: String },
    #[error("dictionary filename and name are different: {file}, {name}")]
    NameMismatch { file: String, name: String },
    #[error("badly formatted keys dictionary in {name}:{description}")]
    BadFormat { name: String, description: String },
    #[error("{0}")]
    Definition(String),
    #[error(transparent)]
    Type(#[from] ValueTypeError),
    #[error(transparent)]
    Message(#[from] MessageError),
}

pub type DictionaryResult<T> = Result<T, DictionaryError>;
