//! Remote command channel
//!
//! Long-polls the messaging transport for messages past the cursor, advances
//! the cursor for every message (authorized or not), drops messages from any
//! sender other than the authorized identity, and hands recognised commands
//! back to the monitor for dispatch.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::services::messaging::{InboundMessage, MessagingTransport};

/// Default long-poll timeout; the monitor tick supplies the real cadence
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Highest inbound message id already processed. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandCursor(i64);

impl CommandCursor {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Move the cursor forward to `id`; returns false when `id` was already seen
    pub fn advance(&mut self, id: i64) -> bool {
        if id > self.0 {
            self.0 = id;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Status,
}

impl Command {
    /// Case-insensitive substring match on the message text
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        if text.contains("/start") {
            Some(Command::Start)
        } else if text.contains("/stop") {
            Some(Command::Stop)
        } else if text.contains("/status") {
            Some(Command::Status)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Idle,
    Polling,
    Dispatched,
}

/// Result of one poll cycle
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub commands: Vec<Command>,
    pub received: usize,
    pub unauthorized: usize,
    pub transport_failed: bool,
}

pub struct CommandChannel {
    cursor: CommandCursor,
    authorized_id: String,
    state: ChannelState,
    poll_timeout: Duration,
}

impl CommandChannel {
    pub fn new(authorized_id: impl Into<String>) -> Self {
        Self {
            cursor: CommandCursor::default(),
            authorized_id: authorized_id.into().trim().to_string(),
            state: ChannelState::Idle,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn cursor(&self) -> CommandCursor {
        self.cursor
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn authorized_id(&self) -> &str {
        &self.authorized_id
    }

    /// Exact match after trimming; an empty authorized id admits nobody
    pub fn is_authorized(&self, sender_id: &str) -> bool {
        !self.authorized_id.is_empty() && sender_id.trim() == self.authorized_id
    }

    /// Poll once and return the authorized, recognised commands in id order.
    ///
    /// Transport failures leave the cursor untouched and yield no commands.
    pub async fn poll(&mut self, transport: &dyn MessagingTransport) -> PollReport {
        self.state = ChannelState::Polling;

        let mut messages = match transport
            .get_updates(self.cursor.value(), self.poll_timeout)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                warn!(cursor = self.cursor.value(), error = %e, "CommandChannel: poll failed");
                self.state = ChannelState::Idle;
                return PollReport {
                    transport_failed: true,
                    ..PollReport::default()
                };
            }
        };
        messages.sort_by_key(|m| m.id);

        let mut report = PollReport::default();
        for message in messages {
            if let Some(command) = self.accept(&message, &mut report) {
                report.commands.push(command);
            }
        }

        self.state = if report.commands.is_empty() {
            ChannelState::Idle
        } else {
            ChannelState::Dispatched
        };
        report
    }

    /// Consume one message: advance the cursor first, then authorize and parse
    fn accept(&mut self, message: &InboundMessage, report: &mut PollReport) -> Option<Command> {
        if !self.cursor.advance(message.id) {
            debug!(id = message.id, cursor = self.cursor.value(), "CommandChannel: stale message ignored");
            return None;
        }
        report.received += 1;

        if !self.is_authorized(&message.sender_id) {
            debug!(id = message.id, "CommandChannel: dropped message from unauthorized sender");
            report.unauthorized += 1;
            return None;
        }

        let command = Command::parse(&message.text)?;
        info!(id = message.id, command = ?command, "CommandChannel: received {:?}", command);
        Some(command)
    }

    /// Mark the dispatched batch as handled
    pub fn finish_dispatch(&mut self) {
        self.state = ChannelState::Idle;
    }
}
