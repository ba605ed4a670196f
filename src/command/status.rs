use std::str::FromStr;

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::CommandError;

/// Mutually exclusive states of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CommandStatus {
    Ready,
    Running,
    Cancelling,
    Failing,
    Done,
    Cancelled,
    Failed,
    TimedOut,
}

pub const ACTIVE_STATES: [CommandStatus; 3] = [
    CommandStatus::Running,
    CommandStatus::Cancelling,
    CommandStatus::Failing,
];

pub const FAILING_STATES: [CommandStatus; 2] = [CommandStatus::Cancelling, CommandStatus::Failing];

pub const FAILED_STATES: [CommandStatus; 3] = [
    CommandStatus::Cancelled,
    CommandStatus::Failed,
    CommandStatus::TimedOut,
];

pub const DONE_STATES: [CommandStatus; 4] = [
    CommandStatus::Done,
    CommandStatus::Cancelled,
    CommandStatus::Failed,
    CommandStatus::TimedOut,
];

impl CommandStatus {
    /// Case-insensitive status name.
    pub fn parse(name: &str) -> Result<Self, CommandError> {
        CommandStatus::from_str(name).map_err(|_| CommandError::InvalidStatus(name.to_string()))
    }

    /// The reply code written when a command enters this status.
    pub fn code(&self) -> char {
        match self {
            CommandStatus::Done => ':',
            CommandStatus::Cancelled | CommandStatus::Failed | CommandStatus::TimedOut => 'f',
            CommandStatus::Ready => 'i',
            CommandStatus::Running => '>',
            CommandStatus::Cancelling | CommandStatus::Failing => 'w',
        }
    }

    /// Status implied by a reply code; anything unknown means running.
    pub fn from_code(code: char) -> Self {
        match code {
            ':' => CommandStatus::Done,
            'f' | 'F' | '!' => CommandStatus::Failed,
            _ => CommandStatus::Running,
        }
    }

    pub fn is_active(&self) -> bool {
        ACTIVE_STATES.contains(self)
    }

    pub fn is_failing(&self) -> bool {
        FAILING_STATES.contains(self)
    }

    pub fn did_fail(&self) -> bool {
        FAILED_STATES.contains(self)
    }

    pub fn did_succeed(&self) -> bool {
        *self == CommandStatus::Done
    }

    pub fn is_done(&self) -> bool {
        DONE_STATES.contains(self)
    }
}
