use std::{
    collections::VecDeque,
    fmt,
    future::{Future, IntoFuture},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use futures::{future::BoxFuture, stream, FutureExt, Stream, StreamExt};
use tokio::{
    sync::{broadcast, watch},
    task::{AbortHandle, JoinHandle},
};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use super::{
    status::CommandStatus,
    writer::{OutgoingReply, ReplyWriter},
    CommandError, CommandResult,
};
use crate::message::{Keyword, Keywords};

pub type StatusCallback = Arc<dyn Fn(CommandStatus) + Send + Sync>;

pub const DEFAULT_KEYWORD: &str = "text";
const ERROR_KEYWORD: &str = "error";

/// Content of a reply written by a command.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Message {
    #[default]
    Empty,
    /// Sent under `error` for error codes and the default keyword otherwise.
    Text(String),
    Keywords(Keywords),
}

impl Message {
    fn into_keywords(self, code: char, default_keyword: &str) -> CommandResult<Keywords> {
        match self {
            Message::Empty => Ok(Keywords::new()),
            Message::Keywords(keywords) => Ok(keywords),
            Message::Text(text) => {
                let name = if matches!(code, 'e' | 'f') {
                    ERROR_KEYWORD
                } else {
                    default_keyword
                };
                Ok(vec![Keyword::new(name, [text])?].into())
            }
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<Keywords> for Message {
    fn from(keywords: Keywords) -> Self {
        Message::Keywords(keywords)
    }
}

impl From<Keyword> for Message {
    fn from(keyword: Keyword) -> Self {
        Message::Keywords(vec![keyword].into())
    }
}

struct State {
    status: CommandStatus,
    callbacks: Vec<StatusCallback>,
    timer: Option<JoinHandle<()>>,
    task: Option<AbortHandle>,
    /// Changes whose callbacks have not run yet.
    pending: VecDeque<CommandStatus>,
    notifying: bool,
}

struct Shared {
    commander_id: String,
    command_id: u32,
    consumer_id: String,
    body: String,
    default_keyword: String,
    parent: Option<Command>,
    writer: Option<Arc<dyn ReplyWriter + Send + Sync>>,
    state: Mutex<State>,
    status_tx: watch::Sender<CommandStatus>,
    events: broadcast::Sender<CommandStatus>,
}

/// One outstanding command and its status.
///
/// Status changes write a reply through the attached [`ReplyWriter`], run
/// the registered callbacks and wake anything waiting on the command.
/// Once a done status is reached the command no longer changes. Awaiting
/// the command yields that final status.
#[derive(Clone)]
pub struct Command {
    inner: Arc<Shared>,
}

pub struct CommandBuilder {
    commander_id: String,
    command_id: u32,
    consumer_id: String,
    body: String,
    default_keyword: String,
    parent: Option<Command>,
    writer: Option<Arc<dyn ReplyWriter + Send + Sync>>,
    callbacks: Vec<StatusCallback>,
    call_now: bool,
    timeout: Option<Duration>,
}

impl CommandBuilder {
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn default_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.default_keyword = keyword.into();
        self
    }

    pub fn writer(mut self, writer: Arc<dyn ReplyWriter + Send + Sync>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Writes through the parent's ids, and its writer unless one is set.
    pub fn parent(mut self, parent: &Command) -> Self {
        if self.writer.is_none() {
            self.writer = parent.inner.writer.clone();
        }
        self.parent = Some(parent.clone());
        self
    }

    pub fn on_status_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(CommandStatus) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
        self
    }

    /// Runs the callbacks once with the initial status when built.
    pub fn call_now(mut self) -> Self {
        self.call_now = true;
        self
    }

    /// Times the command out unless it is done within `timeout`. Building
    /// then needs a tokio runtime.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> CommandResult<Command> {
        let (status_tx, _) = watch::channel(CommandStatus::Ready);
        let (events, _) = broadcast::channel(16);
        let command = Command {
            inner: Arc::new(Shared {
                commander_id: self.commander_id,
                command_id: self.command_id,
                consumer_id: self.consumer_id,
                body: self.body,
                default_keyword: self.default_keyword,
                parent: self.parent,
                writer: self.writer,
                state: Mutex::new(State {
                    status: CommandStatus::Ready,
                    callbacks: self.callbacks,
                    timer: None,
                    task: None,
                    pending: VecDeque::new(),
                    notifying: false,
                }),
                status_tx,
                events,
            }),
        };

        if let Some(timeout) = self.timeout {
            let runtime = tokio::runtime::Handle::try_current()
                .map_err(|_| CommandError::NoRuntime("time out a command"))?;
            let weak = Arc::downgrade(&command.inner);
            command.lock().timer = Some(runtime.spawn(time_out(weak, timeout)));
        }

        if self.call_now {
            command.lock().pending.push_back(CommandStatus::Ready);
            command.notify();
        }
        Ok(command)
    }
}

async fn time_out(command: Weak<Shared>, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    if let Some(inner) = command.upgrade() {
        let command = Command { inner };
        if command.is_done() {
            return;
        }
        tracing::debug!("command {} timed out after {:?}", command.command_id(), timeout);
        match command.set_status(CommandStatus::TimedOut) {
            Ok(()) | Err(CommandError::AlreadyDone { .. }) => {}
            Err(e) => tracing::error!("failed to time out command: {}", e),
        }
    }
}

impl Command {
    pub fn builder(
        commander_id: impl Into<String>,
        command_id: u32,
        consumer_id: impl Into<String>,
    ) -> CommandBuilder {
        CommandBuilder {
            commander_id: commander_id.into(),
            command_id,
            consumer_id: consumer_id.into(),
            body: String::new(),
            default_keyword: DEFAULT_KEYWORD.to_string(),
            parent: None,
            writer: None,
            callbacks: Vec::new(),
            call_now: false,
            timeout: None,
        }
    }

    pub fn commander_id(&self) -> &str {
        &self.inner.commander_id
    }

    pub fn command_id(&self) -> u32 {
        self.inner.command_id
    }

    /// The actor the command is addressed to.
    pub fn consumer_id(&self) -> &str {
        &self.inner.consumer_id
    }

    pub fn body(&self) -> &str {
        &self.inner.body
    }

    pub fn parent(&self) -> Option<&Command> {
        self.inner.parent.as_ref()
    }

    pub fn status(&self) -> CommandStatus {
        self.lock().status
    }

    pub fn is_done(&self) -> bool {
        self.status().is_done()
    }

    /// Whether the timeout timer is still armed.
    pub fn has_pending_timer(&self) -> bool {
        self.lock()
            .timer
            .as_ref()
            .map_or(false, |timer| !timer.is_finished())
    }

    pub fn on_status_change<F>(&self, callback: F)
    where
        F: Fn(CommandStatus) + Send + Sync + 'static,
    {
        self.lock().callbacks.push(Arc::new(callback));
    }

    pub fn set_status(&self, status: CommandStatus) -> CommandResult<()> {
        self.set_status_with(status, Message::Empty)
    }

    /// Moves to `status`, writing `message` with the status code. Setting
    /// the current status again does nothing and a done command refuses
    /// every change.
    ///
    /// Callbacks see changes in the order they happened. A change made from
    /// inside a callback is queued and delivered once the running callbacks
    /// return.
    pub fn set_status_with(&self, status: CommandStatus, message: impl Into<Message>) -> CommandResult<()> {
        let (timer, task) = {
            let mut state = self.lock();
            if state.status.is_done() {
                let error = CommandError::AlreadyDone {
                    status: state.status,
                    requested: status,
                };
                tracing::error!("{}: {}", self, error);
                return Err(error);
            }
            if status == state.status {
                return Ok(());
            }

            if self.inner.writer.is_some() {
                self.write(status.code(), message)?;
            }
            tracing::debug!("{}: {} -> {}", self, state.status, status);
            state.status = status;
            state.pending.push_back(status);
            self.inner.status_tx.send_replace(status);
            // nobody listening is fine
            let _ = self.inner.events.send(status);

            if status.is_done() {
                (state.timer.take(), state.task.take())
            } else {
                (None, None)
            }
        };

        if let Some(timer) = timer {
            timer.abort();
        }
        if let Some(task) = task {
            task.abort();
        }
        self.notify();
        Ok(())
    }

    /// Runs the callbacks for every queued change unless an outer call is
    /// already doing so.
    fn notify(&self) {
        {
            let mut state = self.lock();
            if state.notifying {
                return;
            }
            state.notifying = true;
        }
        loop {
            let (status, callbacks) = {
                let mut state = self.lock();
                match state.pending.pop_front() {
                    Some(status) => (status, state.callbacks.clone()),
                    None => {
                        state.notifying = false;
                        return;
                    }
                }
            };
            callbacks.iter().for_each(|callback| callback(status));
        }
    }

    pub fn finish(&self) -> CommandResult<()> {
        self.set_status(CommandStatus::Done)
    }

    pub fn finish_with(&self, message: impl Into<Message>) -> CommandResult<()> {
        self.set_status_with(CommandStatus::Done, message)
    }

    pub fn fail(&self, message: impl Into<Message>) -> CommandResult<()> {
        self.set_status_with(CommandStatus::Failed, message)
    }

    pub fn debug(&self, message: impl Into<Message>) -> CommandResult<()> {
        self.write('d', message)
    }

    pub fn info(&self, message: impl Into<Message>) -> CommandResult<()> {
        self.write('i', message)
    }

    pub fn warning(&self, message: impl Into<Message>) -> CommandResult<()> {
        self.write('w', message)
    }

    /// Writes an error without failing the command.
    pub fn error(&self, message: impl Into<Message>) -> CommandResult<()> {
        self.write('e', message)
    }

    /// Writes a reply for this command. A child command writes under its
    /// parent's ids and never ends the parent: `>` is dropped, `:` becomes
    /// `i` (dropped when empty) and `f` becomes `e`.
    pub fn write(&self, code: char, message: impl Into<Message>) -> CommandResult<()> {
        let writer = self.inner.writer.as_ref().ok_or(CommandError::NoWriter)?;
        let keywords = message
            .into()
            .into_keywords(code, &self.inner.default_keyword)?;

        let (target, code) = match &self.inner.parent {
            None => (self, code),
            Some(parent) => match code {
                '>' => return Ok(()),
                ':' if keywords.is_empty() => return Ok(()),
                ':' => (parent, 'i'),
                'f' => (parent, 'e'),
                other => (parent, other),
            },
        };

        writer.write(OutgoingReply {
            commander_id: target.commander_id().to_string(),
            command_id: target.command_id(),
            code,
            keywords,
        })
    }

    /// Cancels the command: `CANCELLING` then `CANCELLED`, aborting any
    /// running operation. Cancelling a done command does nothing.
    pub fn cancel(&self) -> CommandResult<()> {
        if self.is_done() {
            return Ok(());
        }
        self.set_status(CommandStatus::Cancelling)?;
        self.set_status(CommandStatus::Cancelled)
    }

    /// Runs `operation` as the body of the command. The command is running
    /// until the operation ends; `Ok` finishes it and `Err` fails it with
    /// the message. Cancellation and timeout abort the operation.
    pub fn spawn<F>(&self, operation: F) -> CommandResult<()>
    where
        F: Future<Output = Result<(), String>> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| CommandError::NoRuntime("run a command operation"))?;
        self.set_status(CommandStatus::Running)?;

        let command = self.clone();
        let handle = runtime.spawn(async move {
            let result = match operation.await {
                Ok(()) => command.finish(),
                Err(message) => command.fail(message),
            };
            if let Err(e) = result {
                tracing::warn!("{}: operation ended after completion: {}", command, e);
            }
        });

        let mut state = self.lock();
        if state.status.is_done() {
            handle.abort();
        } else {
            state.task = Some(handle.abort_handle());
        }
        Ok(())
    }

    /// Waits until the command is in `status`.
    pub async fn wait_for_status(&self, status: CommandStatus) -> CommandResult<()> {
        let mut receiver = self.inner.status_tx.subscribe();
        receiver
            .wait_for(|current| *current == status)
            .await
            .map(|_| ())
            .map_err(|_| CommandError::Closed)
    }

    /// Waits for a done status and returns it.
    pub async fn await_result(&self) -> CommandStatus {
        let mut receiver = self.inner.status_tx.subscribe();
        let status = match receiver.wait_for(CommandStatus::is_done).await {
            Ok(status) => *status,
            Err(_) => self.status(),
        };
        status
    }

    /// Every status change from now on, ending with the done status.
    pub fn status_stream(&self) -> impl Stream<Item = CommandStatus> {
        let events = BroadcastStream::new(self.inner.events.subscribe());
        let finished = self.is_done();
        stream::unfold((events, finished), |(mut events, finished)| async move {
            if finished {
                return None;
            }
            while let Some(received) = events.next().await {
                match received {
                    Ok(status) => return Some((status, (events, status.is_done()))),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!("status stream skipped {} changes", skipped);
                    }
                }
            }
            None
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl IntoFuture for Command {
    type Output = CommandStatus;
    type IntoFuture = BoxFuture<'static, CommandStatus>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.await_result().await }.boxed()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Command (commander_id='{}', command_id={}, body='{}')>",
            self.inner.commander_id, self.inner.command_id, self.inner.body
        )
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("commander_id", &self.inner.commander_id)
            .field("command_id", &self.inner.command_id)
            .field("consumer_id", &self.inner.consumer_id)
            .field("body", &self.inner.body)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::writer::MockReplyWriter;
    use mockall::predicate::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn command() -> Command {
        Command::builder("1", 7, "alerts").build().unwrap()
    }

    #[test]
    fn test_transitions_and_done_guard() {
        let cmd = command();
        assert_eq!(cmd.status(), CommandStatus::Ready);
        cmd.set_status(CommandStatus::Running).unwrap();
        cmd.set_status(CommandStatus::Running).unwrap();
        cmd.finish().unwrap();
        assert!(cmd.is_done());

        for status in [CommandStatus::Running, CommandStatus::Failed, CommandStatus::Done] {
            assert_eq!(
                cmd.set_status(status),
                Err(CommandError::AlreadyDone {
                    status: CommandStatus::Done,
                    requested: status
                })
            );
        }
        assert_eq!(
            cmd.set_status(CommandStatus::TimedOut),
            Err(CommandError::AlreadyDone {
                status: CommandStatus::Done,
                requested: CommandStatus::TimedOut
            })
        );
        assert_eq!(cmd.status(), CommandStatus::Done);
    }

    #[test]
    fn test_callbacks_fire_per_change() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cmd = Command::builder("1", 1, "x")
            .on_status_change(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .call_now()
            .build()
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        cmd.set_status(CommandStatus::Running).unwrap();
        cmd.set_status(CommandStatus::Running).unwrap();
        cmd.finish().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_callback_changes_are_delivered_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cmd = command();
        {
            let inner = cmd.clone();
            cmd.on_status_change(move |status| {
                if status == CommandStatus::Running {
                    inner.finish().unwrap();
                    // queued until this callback returns
                    assert_eq!(inner.status(), CommandStatus::Done);
                }
            });
        }
        let record = seen.clone();
        cmd.on_status_change(move |status| record.lock().unwrap().push(status));

        cmd.set_status(CommandStatus::Running).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![CommandStatus::Running, CommandStatus::Done]
        );
        assert_eq!(cmd.status(), CommandStatus::Done);
    }

    #[tokio::test]
    async fn test_late_timer_leaves_done_status() {
        let cmd = Command::builder("1", 1, "x")
            .timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        cmd.finish().unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cmd.status(), CommandStatus::Done);
    }

    #[test]
    fn test_status_changes_write_codes() {
        let mut writer = MockReplyWriter::new();
        writer
            .expect_write()
            .withf(|reply| reply.code == '>' && reply.keywords.is_empty())
            .times(1)
            .returning(|_| Ok(()));
        writer
            .expect_write()
            .withf(|reply| {
                reply.code == 'f'
                    && reply.command_id == 7
                    && reply.keywords.get("error").is_some()
            })
            .times(1)
            .returning(|_| Ok(()));

        let cmd = Command::builder("1", 7, "alerts")
            .writer(Arc::new(writer))
            .build()
            .unwrap();
        cmd.set_status(CommandStatus::Running).unwrap();
        cmd.fail("broken").unwrap();
        assert_eq!(cmd.status(), CommandStatus::Failed);
    }

    #[test]
    fn test_writer_failure_keeps_status() {
        let mut writer = MockReplyWriter::new();
        writer
            .expect_write()
            .returning(|_| Err(CommandError::Writer("closed".to_string())));
        let cmd = Command::builder("1", 7, "alerts")
            .writer(Arc::new(writer))
            .build()
            .unwrap();
        assert!(cmd.set_status(CommandStatus::Running).is_err());
        assert_eq!(cmd.status(), CommandStatus::Ready);
    }

    #[test]
    fn test_text_messages_use_default_keyword() {
        let mut writer = MockReplyWriter::new();
        writer
            .expect_write()
            .with(function(|reply: &OutgoingReply| {
                reply.to_line() == "1 7 i text=\"hello\""
            }))
            .times(1)
            .returning(|_| Ok(()));
        writer
            .expect_write()
            .with(function(|reply: &OutgoingReply| {
                reply.to_line() == "1 7 e error=\"bad\""
            }))
            .times(1)
            .returning(|_| Ok(()));
        let cmd = Command::builder("1", 7, "alerts")
            .writer(Arc::new(writer))
            .build()
            .unwrap();
        cmd.info("hello").unwrap();
        cmd.error("bad").unwrap();
    }

    #[test]
    fn test_write_without_writer() {
        assert_eq!(command().info("x"), Err(CommandError::NoWriter));
        // status changes do not need a writer
        assert!(command().set_status(CommandStatus::Running).is_ok());
    }

    #[test]
    fn test_child_writes_through_parent() {
        let mut writer = MockReplyWriter::new();
        writer
            .expect_write()
            .withf(|reply| reply.command_id == 7 && reply.code == 'i' && !reply.keywords.is_empty())
            .times(1)
            .returning(|_| Ok(()));
        writer
            .expect_write()
            .withf(|reply| reply.command_id == 7 && reply.code == 'e')
            .times(1)
            .returning(|_| Ok(()));

        let parent = Command::builder("1", 7, "alerts")
            .writer(Arc::new(writer))
            .build()
            .unwrap();
        let child = Command::builder("alerts", 0, "alerts")
            .parent(&parent)
            .build()
            .unwrap();
        child.set_status(CommandStatus::Running).unwrap();
        child.finish().unwrap();

        let other = Command::builder("alerts", 0, "alerts")
            .parent(&parent)
            .build()
            .unwrap();
        other.finish_with("partial").unwrap();
        let failing = Command::builder("alerts", 0, "alerts")
            .parent(&parent)
            .build()
            .unwrap();
        failing.fail("nope").unwrap();
        assert_eq!(parent.status(), CommandStatus::Ready);
    }

    #[test]
    fn test_cancel() {
        let cmd = command();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        cmd.on_status_change(move |status| record.lock().unwrap().push(status));
        cmd.set_status(CommandStatus::Running).unwrap();
        cmd.cancel().unwrap();
        cmd.cancel().unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CommandStatus::Running,
                CommandStatus::Cancelling,
                CommandStatus::Cancelled
            ]
        );
    }

    #[test]
    fn test_timeout_needs_runtime() {
        let result = Command::builder("1", 1, "x")
            .timeout(Duration::from_millis(10))
            .build();
        assert!(matches!(result, Err(CommandError::NoRuntime(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        let cmd = Command::builder("1", 1, "x")
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        cmd.spawn(async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .unwrap();
        assert_eq!(cmd.clone().await, CommandStatus::TimedOut);
        assert!(!cmd.has_pending_timer());
    }

    #[tokio::test]
    async fn test_finishing_disarms_timer() {
        let cmd = Command::builder("1", 1, "x")
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        assert!(cmd.has_pending_timer());
        cmd.finish().unwrap();
        assert!(!cmd.has_pending_timer());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cmd.status(), CommandStatus::Done);
    }

    #[tokio::test]
    async fn test_spawned_operation_results() {
        let ok = command();
        ok.spawn(async { Ok(()) }).unwrap();
        assert_eq!(ok.await_result().await, CommandStatus::Done);

        let failed = command();
        failed.spawn(async { Err("motor stalled".to_string()) }).unwrap();
        assert_eq!(failed.await_result().await, CommandStatus::Failed);
    }

    #[tokio::test]
    async fn test_cancel_aborts_operation() {
        let finished = Arc::new(AtomicUsize::new(0));
        let flag = finished.clone();
        let cmd = command();
        cmd.spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            flag.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        cmd.cancel().unwrap();
        assert_eq!(cmd.await_result().await, CommandStatus::Cancelled);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wait_for_status() {
        let cmd = command();
        let waiter = {
            let cmd = cmd.clone();
            tokio::spawn(async move { cmd.wait_for_status(CommandStatus::Failing).await })
        };
        tokio::task::yield_now().await;
        cmd.set_status(CommandStatus::Running).unwrap();
        cmd.set_status(CommandStatus::Failing).unwrap();
        assert_eq!(waiter.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_status_stream() {
        let cmd = command();
        let stream = cmd.status_stream();
        cmd.set_status(CommandStatus::Running).unwrap();
        cmd.finish().unwrap();
        let statuses: Vec<CommandStatus> = stream.collect().await;
        assert_eq!(statuses, vec![CommandStatus::Running, CommandStatus::Done]);

        let empty: Vec<CommandStatus> = cmd.status_stream().collect().await;
        assert!(empty.is_empty());
    }
}
