//! Lifecycle of commands sent to or run by an actor.

pub mod lifecycle;
pub mod status;
pub mod writer;

use thiserror::Error;

use crate::message::MessageError;

pub use lifecycle::{Command, CommandBuilder, Message, StatusCallback};
pub use status::CommandStatus;
pub use writer::{ChannelWriter, OutgoingReply, ReplyWriter};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("cannot modify a done command with status {status} (requested {requested})")]
    AlreadyDone {
        status: CommandStatus,
        requested: CommandStatus,
    },
    #[error("Status '{0}' is not a valid command status.")]
    InvalidStatus(String),
    #[error("no reply writer is attached to this command")]
    NoWriter,
    #[error("failed to write reply: {0}")]
    Writer(String),
    #[error("a tokio runtime is required to {0}")]
    NoRuntime(&'static str),
    #[error("command status channel closed")]
    Closed,
    #[error(transparent)]
    Message(#[from] MessageError),
}

pub type CommandResult<T> = Result<T, CommandError>;
