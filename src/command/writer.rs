use mockall::automock;
use tokio::sync::mpsc;

use super::CommandError;
use crate::message::Keywords;

/// A reply a command asks to be written to its commander.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingReply {
    pub commander_id: String,
    pub command_id: u32,
    pub code: char,
    pub keywords: Keywords,
}

impl OutgoingReply {
    /// `commander id code[ kw;kw]`
    pub fn to_line(&self) -> String {
        let mut line = format!("{} {} {}", self.commander_id, self.command_id, self.code);
        if !self.keywords.is_empty() {
            line.push(' ');
            line.push_str(&self.keywords.canonical_with(";"));
        }
        line
    }
}

/// Where commands send their replies. Transports implement this.
#[automock]
pub trait ReplyWriter {
    fn write(&self, reply: OutgoingReply) -> Result<(), CommandError>;
}

/// Forwards replies into a channel drained by a transport task.
#[derive(Debug, Clone)]
pub struct ChannelWriter {
    sender: mpsc::UnboundedSender<OutgoingReply>,
}

impl ChannelWriter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutgoingReply>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ReplyWriter for ChannelWriter {
    fn write(&self, reply: OutgoingReply) -> Result<(), CommandError> {
        self.sender
            .send(reply)
            .map_err(|e| CommandError::Writer(e.to_string()))
    }
}
