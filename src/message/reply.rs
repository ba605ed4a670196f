use std::{fmt, str::FromStr};

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::{Canonized, Keywords, MessageError, MessageResult};

/// One character status code that closes a reply header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum MessageCode {
    #[strum(serialize = ">")]
    Queued,
    #[strum(serialize = "D")]
    Debug,
    #[strum(serialize = "I")]
    Information,
    #[strum(serialize = "W")]
    Warning,
    #[strum(serialize = "E")]
    Error,
    #[strum(serialize = ":")]
    Finished,
    #[strum(serialize = "F")]
    Failed,
    #[strum(serialize = "!")]
    Fatal,
}

impl MessageCode {
    pub fn parse(code: &str) -> MessageResult<Self> {
        MessageCode::from_str(code).map_err(|_| MessageError::InvalidCode(code.to_string()))
    }

    pub fn help(&self) -> &'static str {
        match self {
            MessageCode::Queued => "Queued",
            MessageCode::Debug => "Debug",
            MessageCode::Information => "Information",
            MessageCode::Warning => "Warning",
            MessageCode::Error | MessageCode::Failed => "Error",
            MessageCode::Finished => "Finished",
            MessageCode::Fatal => "Fatal",
        }
    }

    /// Codes that end the command the reply belongs to.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            MessageCode::Finished | MessageCode::Failed | MessageCode::Fatal
        )
    }
}

/// `program.user[.stack] commandId actor code`
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyHeader {
    program: String,
    user: String,
    actor_stack: String,
    command_id: u64,
    actor: String,
    code: MessageCode,
}

impl ReplyHeader {
    pub fn new(
        program: impl Into<String>,
        user: impl Into<String>,
        actor_stack: impl Into<String>,
        command_id: u64,
        actor: impl Into<String>,
        code: MessageCode,
    ) -> Self {
        Self {
            program: program.into(),
            user: user.into(),
            actor_stack: actor_stack.into(),
            command_id,
            actor: actor.into(),
            code,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Extra dotted components after the user, leading dot included.
    pub fn actor_stack(&self) -> &str {
        &self.actor_stack
    }

    /// The first word of the reply line, reassembled.
    pub fn commander(&self) -> String {
        format!("{}.{}{}", self.program, self.user, self.actor_stack)
    }

    pub fn command_id(&self) -> u64 {
        self.command_id
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn code(&self) -> MessageCode {
        self.code
    }
}

impl Canonized for ReplyHeader {
    fn canonical(&self) -> String {
        format!(
            "{} {} {} {}",
            self.commander(),
            self.command_id,
            self.actor,
            self.code
        )
    }

    fn tokenized(&self) -> String {
        format!("prog.user 123 actor {}", self.code)
    }
}

/// A header followed by `;` separated keywords.
#[derive(Debug, Clone)]
pub struct Reply {
    header: ReplyHeader,
    keywords: Keywords,
    string: Option<String>,
}

impl Reply {
    pub fn new(header: ReplyHeader, keywords: Keywords) -> Self {
        Self {
            header,
            keywords,
            string: None,
        }
    }

    /// Keeps the line the reply was parsed from.
    pub fn with_string(mut self, string: impl Into<String>) -> Self {
        self.string = Some(string.into());
        self
    }

    pub fn header(&self) -> &ReplyHeader {
        &self.header
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    pub fn keywords_mut(&mut self) -> &mut Keywords {
        &mut self.keywords
    }

    pub fn string(&self) -> Option<&str> {
        self.string.as_deref()
    }
}

impl Canonized for Reply {
    fn canonical(&self) -> String {
        format!(
            "{} {}",
            self.header.canonical(),
            self.keywords.canonical_with(";")
        )
    }

    fn tokenized(&self) -> String {
        format!(
            "{} {}",
            self.header.tokenized(),
            self.keywords.tokenized_with(";")
        )
    }
}

impl PartialEq for Reply {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}
