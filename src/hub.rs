//! A client session with the hub: outgoing commands and the incoming reply
//! feed.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;

use crate::{
    command::{Command, CommandError, CommandResult, CommandStatus},
    config::HubConfig,
    error::Result,
    message::Reply,
    model::ModelSet,
    parser::{parse_reply, GrammarError},
};

/// Number of keys asked for in one `getFor` request.
pub const KEYS_PER_REQUEST: usize = 10;
/// Actor that answers `getFor` requests.
pub const KEYS_ACTOR: &str = "keys";

/// A command line ready for the transport, with the command tracking it.
#[derive(Debug, Clone)]
pub struct OutgoingCommand {
    pub mid: u32,
    pub line: String,
    pub command: Command,
}

/// What a reply line did to the session.
#[derive(Debug)]
pub struct HandledReply {
    pub reply: Reply,
    /// Keywords stored, `None` when the actor is not tracked.
    pub keywords_applied: Option<usize>,
    /// The tracked command the reply ended.
    pub completed: Option<Command>,
}

pub struct HubSession {
    commander: String,
    next_mid: u32,
    models: ModelSet,
    /// Commands waiting for a done status, keyed by message id.
    running: Arc<DashMap<u32, Command>>,
    default_keyword: String,
    default_timeout: Option<Duration>,
}

impl HubSession {
    pub fn new(commander: impl Into<String>, models: ModelSet) -> Self {
        Self {
            commander: commander.into(),
            next_mid: 1,
            models,
            running: Arc::new(DashMap::new()),
            default_keyword: crate::command::lifecycle::DEFAULT_KEYWORD.to_string(),
            default_timeout: None,
        }
    }

    /// Loads the configured models and applies the command defaults.
    pub fn from_config(config: &HubConfig) -> Result<Self> {
        let loader = config.dictionary.loader();
        let models = ModelSet::load(&loader, &config.hub.models)?
            .with_keys_prefix(config.hub.keys_prefix.clone());
        let mut session = Self::new(config.hub.commander.clone(), models);
        session.default_keyword = config.command.default_keyword.clone();
        session.default_timeout = config.command.default_timeout;
        Ok(session)
    }

    pub fn commander(&self) -> &str {
        &self.commander
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut ModelSet {
        &mut self.models
    }

    pub fn running_command(&self, mid: u32) -> Option<Command> {
        self.running.get(&mid).map(|entry| entry.value().clone())
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Builds `commander mid target body` for the next message id and
    /// tracks the running command until it is done, by reply, timeout or
    /// cancellation.
    pub fn send_command(&mut self, target: &str, body: &str) -> CommandResult<OutgoingCommand> {
        let mid = self.next_mid;
        self.next_mid = self.next_mid.wrapping_add(1);
        self.send_command_with_mid(target, body, mid)
    }

    /// Like [`send_command`](Self::send_command) with an explicit id. The
    /// sequence is not advanced.
    pub fn send_command_with_mid(
        &mut self,
        target: &str,
        body: &str,
        mid: u32,
    ) -> CommandResult<OutgoingCommand> {
        let line = format!("{} {} {} {}\n", self.commander, mid, target, body);
        let running = Arc::downgrade(&self.running);
        let mut builder = Command::builder(self.commander.clone(), mid, target)
            .body(body)
            .default_keyword(self.default_keyword.clone())
            .on_status_change(move |status| {
                if !status.is_done() {
                    return;
                }
                if let Some(running) = running.upgrade() {
                    untrack(&running, mid);
                }
            });
        if let Some(timeout) = self.default_timeout {
            builder = builder.timeout(timeout);
        }
        let command = builder.build()?;
        if let Some(previous) = self.running.insert(mid, command.clone()) {
            tracing::warn!("message id {} reused while {} was running", mid, previous);
        }
        command.set_status(CommandStatus::Running)?;
        if command.is_done() {
            untrack(&self.running, mid);
        }
        Ok(OutgoingCommand { mid, line, command })
    }

    /// `getFor=<actor> k1 k2 ...` bodies covering every key of every tracked
    /// model.
    pub fn keys_requests(&self) -> Vec<String> {
        self.models
            .actors()
            .into_iter()
            .filter_map(|actor| self.models.get(actor))
            .flat_map(|model| {
                let actor = model.actor().to_string();
                model
                    .key_names()
                    .chunks(KEYS_PER_REQUEST)
                    .map(|keys| format!("getFor={} {}", actor, keys.join(" ")))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Sends every key request to the keys actor.
    pub fn refresh_keys(&mut self) -> CommandResult<Vec<OutgoingCommand>> {
        self.keys_requests()
            .iter()
            .map(|body| self.send_command(KEYS_ACTOR, body))
            .collect()
    }

    /// Parses one reply line from the hub, updates the models and resolves
    /// the command the reply ends.
    pub fn handle_line(&mut self, line: &str) -> std::result::Result<HandledReply, GrammarError> {
        let reply = parse_reply(line).map_err(|e| {
            tracing::warn!("Failed parsing reply '{}': {}", line.trim(), e);
            e
        })?;

        let keywords_applied = self.models.apply_reply(&reply);
        let completed = self.resolve(&reply);
        Ok(HandledReply {
            reply,
            keywords_applied,
            completed,
        })
    }

    fn resolve(&mut self, reply: &Reply) -> Option<Command> {
        let mid = u32::try_from(reply.header().command_id()).ok()?;
        let code = reply
            .header()
            .code()
            .as_ref()
            .chars()
            .next()?
            .to_ascii_lowercase();
        let status = CommandStatus::from_code(code);
        if !status.is_done() {
            return None;
        }

        let (_, command) = self.running.remove(&mid)?;
        match command.set_status(status) {
            Ok(()) | Err(CommandError::AlreadyDone { .. }) => {}
            Err(e) => tracing::error!("failed to resolve {}: {}", command, e),
        }
        Some(command)
    }
}

/// Drops the command under `mid` once done. A newer command reusing the id
/// stays.
fn untrack(running: &DashMap<u32, Command>, mid: u32) {
    running.remove_if(&mid, |_, command| command.is_done());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        keys::{Key, KeysDictionary},
        model::KeywordModel,
        types::ValueType,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn session(keys: usize) -> HubSession {
        let mut dictionary = KeysDictionary::new("hubtest", (1, 0)).unwrap();
        for index in 0..keys {
            dictionary
                .add(Key::new(format!("key{}", index), [ValueType::int().into()]).unwrap())
                .unwrap();
        }
        let mut models = ModelSet::new();
        models.insert(KeywordModel::new(Arc::new(dictionary)));
        HubSession::new("tron.tron", models)
    }

    #[test]
    fn test_send_command() {
        let mut session = session(1);
        let first = session.send_command("alerts", "status").unwrap();
        let second = session.send_command("alerts", "ping").unwrap();
        assert_eq!(first.line, "tron.tron 1 alerts status\n");
        assert_eq!(second.mid, 2);
        assert_eq!(first.command.status(), CommandStatus::Running);
        assert_eq!(session.running_count(), 2);
    }

    #[test]
    fn test_mid_wraps() {
        let mut session = session(1);
        session.next_mid = u32::MAX;
        assert_eq!(session.send_command("a", "x").unwrap().mid, u32::MAX);
        assert_eq!(session.send_command("a", "x").unwrap().mid, 0);
    }

    #[test]
    fn test_done_reply_resolves_command() {
        let mut session = session(1);
        let sent = session.send_command("hubtest", "status").unwrap();

        let handled = session.handle_line("tron.tron 1 hubtest i key0=5\n").unwrap();
        assert_eq!(handled.keywords_applied, Some(1));
        assert!(handled.completed.is_none());
        assert_eq!(sent.command.status(), CommandStatus::Running);

        let handled = session.handle_line("tron.tron 1 hubtest f\n").unwrap();
        assert_eq!(handled.completed.unwrap().status(), CommandStatus::Failed);
        assert_eq!(sent.command.status(), CommandStatus::Failed);
        assert_eq!(session.running_count(), 0);

        let model = session.models().get("hubtest").unwrap();
        assert_eq!(model.get("key0").unwrap()[0].as_i64(), Some(5));
    }

    #[test]
    fn test_cancelled_commands_are_untracked() {
        let mut session = session(1);
        let sent: Vec<_> = (0..3)
            .map(|_| session.send_command("hubtest", "status").unwrap())
            .collect();
        assert_eq!(session.running_count(), 3);
        sent.iter().for_each(|s| s.command.cancel().unwrap());
        assert_eq!(session.running_count(), 0);
        assert!(session.running_command(1).is_none());

        // a done reply after cancellation finds nothing to resolve
        let handled = session.handle_line("tron.tron 1 hubtest : \n").unwrap();
        assert!(handled.completed.is_none());
        assert_eq!(sent[0].command.status(), CommandStatus::Cancelled);
    }

    #[test]
    fn test_reused_id_keeps_newer_command() {
        let mut session = session(1);
        let first = session.send_command_with_mid("hubtest", "a", 5).unwrap();
        let second = session.send_command_with_mid("hubtest", "b", 5).unwrap();
        first.command.cancel().unwrap();
        assert_eq!(session.running_count(), 1);
        assert_eq!(session.running_command(5).unwrap().body(), second.command.body());
    }

    #[tokio::test]
    async fn test_timed_out_commands_are_untracked() {
        let mut session = session(1);
        session.default_timeout = Some(Duration::from_millis(20));
        let sent = session.send_command("hubtest", "status").unwrap();
        assert_eq!(sent.command.await_result().await, CommandStatus::TimedOut);
        assert_eq!(session.running_count(), 0);
    }

    #[test]
    fn test_keys_actor_updates_model() {
        let mut session = session(1);
        let handled = session.handle_line(".hub 0 keys_hubtest : key0=7").unwrap();
        assert_eq!(handled.keywords_applied, Some(1));
        assert!(handled.completed.is_none());
    }

    #[test]
    fn test_bad_line_is_returned() {
        let mut session = session(1);
        assert!(session.handle_line("not a reply").is_err());
    }

    #[test]
    fn test_keys_requests() {
        let session = session(23);
        let requests = session.keys_requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].starts_with("getFor=hubtest key0 key1 "));
        assert_eq!(requests[2], "getFor=hubtest key20 key21 key22");
    }

    #[test]
    fn test_refresh_keys() {
        let mut session = session(12);
        let sent = session.refresh_keys().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].line.starts_with("tron.tron 2 keys getFor=hubtest key10"));
    }
}
