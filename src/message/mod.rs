//! Structured commands and replies of the legacy line protocol.
//!
//! Every message type has two derived string forms. The canonical form is
//! semantically normalized, so two messages with the same canonical string
//! are equivalent. The tokenized form keeps only the grammar shape, with
//! values replaced by placeholders.

pub mod command;
pub mod keyword;
pub mod reply;
pub mod values;

use thiserror::Error;

pub use command::{Command, CommandHeader};
pub use keyword::{Keyword, Keywords};
pub use reply::{MessageCode, Reply, ReplyHeader};
pub use values::{Value, Values};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MessageError {
    #[error("keyword \"{0}\" is reserved")]
    ReservedKeyword(String),
    #[error("name '{0}' contains an illegal dot (.) character.")]
    DottedVerb(String),
    #[error("name cannot be \"{0}\"")]
    RawVerb(String),
    #[error("Invalid reply header code: {0}")]
    InvalidCode(String),
}

pub type MessageResult<T> = Result<T, MessageError>;

pub trait Canonized {
    /// Normalized form; equal strings mean equivalent messages.
    fn canonical(&self) -> String;

    /// Grammar shape only; equal strings mean the same structure.
    fn tokenized(&self) -> String;
}
