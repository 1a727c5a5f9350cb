//! Gateway counters
//!
//! Nothing in the command or frame path is fatal; what gets dropped is
//! counted here and logged periodically.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use meshgate_shared::DecodeError;

/// Why an inbound radio frame was not published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropCause {
    UnknownTag,
    BadLength,
    BadContent,
    /// Peers only send telemetry; a command frame is not ours to act on
    UnexpectedCommand,
}

impl From<&DecodeError> for DropCause {
    fn from(err: &DecodeError) -> Self {
        match err {
            DecodeError::UnknownTag(_) => DropCause::UnknownTag,
            DecodeError::Empty | DecodeError::BadLength { .. } => DropCause::BadLength,
            DecodeError::InvalidField { .. } => DropCause::BadContent,
        }
    }
}

#[derive(Debug, Default)]
pub struct GatewayStats {
    commands_executed: AtomicU64,
    commands_forwarded: AtomicU64,
    commands_rejected: AtomicU64,
    lines_malformed: AtomicU64,
    frames_sent: AtomicU64,
    events_published: AtomicU64,
    dropped_unknown_tag: AtomicU64,
    dropped_bad_length: AtomicU64,
    dropped_bad_content: AtomicU64,
    dropped_unexpected_command: AtomicU64,
}

/// Point-in-time copy of [`GatewayStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub commands_executed: u64,
    pub commands_forwarded: u64,
    pub commands_rejected: u64,
    pub lines_malformed: u64,
    pub frames_sent: u64,
    pub events_published: u64,
    pub dropped_unknown_tag: u64,
    pub dropped_bad_length: u64,
    pub dropped_bad_content: u64,
    pub dropped_unexpected_command: u64,
}

impl StatsSnapshot {
    pub fn frames_dropped(&self) -> u64 {
        self.dropped_unknown_tag
            + self.dropped_bad_length
            + self.dropped_bad_content
            + self.dropped_unexpected_command
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "commands: executed={} forwarded={} rejected={} malformed={} | frames: sent={} published={} dropped={} (unknown_tag={} bad_length={} bad_content={} command={})",
            self.commands_executed,
            self.commands_forwarded,
            self.commands_rejected,
            self.lines_malformed,
            self.frames_sent,
            self.events_published,
            self.frames_dropped(),
            self.dropped_unknown_tag,
            self.dropped_bad_length,
            self.dropped_bad_content,
            self.dropped_unexpected_command,
        )
    }
}

impl GatewayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command_executed(&self) {
        self.commands_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_forwarded(&self) {
        self.commands_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_rejected(&self) {
        self.commands_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn line_malformed(&self) {
        self.lines_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_dropped(&self, cause: DropCause) {
        let counter = match cause {
            DropCause::UnknownTag => &self.dropped_unknown_tag,
            DropCause::BadLength => &self.dropped_bad_length,
            DropCause::BadContent => &self.dropped_bad_content,
            DropCause::UnexpectedCommand => &self.dropped_unexpected_command,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            commands_executed: self.commands_executed.load(Ordering::Relaxed),
            commands_forwarded: self.commands_forwarded.load(Ordering::Relaxed),
            commands_rejected: self.commands_rejected.load(Ordering::Relaxed),
            lines_malformed: self.lines_malformed.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            dropped_unknown_tag: self.dropped_unknown_tag.load(Ordering::Relaxed),
            dropped_bad_length: self.dropped_bad_length.load(Ordering::Relaxed),
            dropped_bad_content: self.dropped_bad_content.load(Ordering::Relaxed),
            dropped_unexpected_command: self.dropped_unexpected_command.load(Ordering::Relaxed),
        }
    }
}
