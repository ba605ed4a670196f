use std::fmt;

use super::{values::Value, Canonized, Keywords, MessageError, MessageResult, Values};

/// A verb with optional positional values and keywords.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    values: Values,
    keywords: Keywords,
    string: Option<String>,
}

impl Command {
    /// The verb must not contain a dot nor be `raw`.
    pub fn new(name: impl Into<String>) -> MessageResult<Self> {
        let name = name.into();
        if name.contains('.') {
            return Err(MessageError::DottedVerb(name));
        }
        if name.eq_ignore_ascii_case("raw") {
            return Err(MessageError::RawVerb(name));
        }
        Ok(Self {
            name,
            values: Values::new(),
            keywords: Keywords::new(),
            string: None,
        })
    }

    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values = values.into_iter().collect();
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<Keywords>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn with_string(mut self, string: impl Into<String>) -> Self {
        self.string = Some(string.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &Values {
        &self.values
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

impl Canonized for Command {
    fn canonical(&self) -> String {
        let mut result = self.name.to_lowercase();
        if !self.values.is_empty() {
            result.push(' ');
            result.push_str(&self.values.canonical());
        }
        if !self.keywords.is_empty() {
            result.push(' ');
            result.push_str(&self.keywords.canonical_with(" "));
        }
        result
    }

    fn tokenized(&self) -> String {
        let mut result = "VERB".to_string();
        if !self.values.is_empty() {
            result.push(' ');
            result.push_str(&self.values.tokenized());
        }
        if !self.keywords.is_empty() {
            result.push(' ');
            result.push_str(&self.keywords.tokenized_with(" "));
        }
        result
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// The routing prefix of a command sent through the hub:
/// `commander mid actor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHeader {
    commander: String,
    mid: u32,
    actor: String,
}

impl CommandHeader {
    pub fn new(commander: impl Into<String>, mid: u32, actor: impl Into<String>) -> Self {
        Self {
            commander: commander.into(),
            mid,
            actor: actor.into(),
        }
    }

    pub fn commander(&self) -> &str {
        &self.commander
    }

    /// Part of the commander name before the first dot.
    pub fn program(&self) -> &str {
        self.commander
            .split_once('.')
            .map(|(program, _)| program)
            .unwrap_or(&self.commander)
    }

    pub fn mid(&self) -> u32 {
        self.mid
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }
}

impl Canonized for CommandHeader {
    fn canonical(&self) -> String {
        format!("{} {} {}", self.commander, self.mid, self.actor)
    }

    fn tokenized(&self) -> String {
        format!("prog.user 123 actor {}", self.actor)
    }
}
