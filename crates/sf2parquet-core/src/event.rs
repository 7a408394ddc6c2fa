// Audit event capability
//
// Every component reports its steps through an EventSink. The trait
// method returns nothing: delivery failure is the sink's problem, and
// the signature itself guarantees a logging outage can never fail the
// primary data path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Mutex;

/// Actor recorded when the caller does not name one.
pub const DEFAULT_ACTOR: &str = "system";

/// Kind of audit event. The log store schema only knows these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Insert,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Insert => "insert",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub process: String,
    pub kind: EventKind,
    pub detail: String,
    pub actor: String,
    pub at: DateTime<Utc>,
}

/// Best-effort append-only event channel.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Append one event with an explicit actor. Infallible by contract:
    /// implementations capture and swallow their own delivery errors.
    async fn record_as(&self, process: &str, kind: EventKind, detail: &str, actor: &str);

    /// Append one event attributed to [`DEFAULT_ACTOR`].
    async fn record(&self, process: &str, kind: EventKind, detail: &str) {
        self.record_as(process, kind, detail, DEFAULT_ACTOR).await;
    }
}

/// Sink that discards everything.
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn record_as(&self, _process: &str, _kind: EventKind, _detail: &str, _actor: &str) {}
}

/// In-memory sink for tests: collects events for later assertions.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn record_as(&self, process: &str, kind: EventKind, detail: &str, actor: &str) {
        self.events.lock().unwrap().push(AuditEvent {
            process: process.to_string(),
            kind,
            detail: detail.to_string(),
            actor: actor.to_string(),
            at: Utc::now(),
        });
    }
}
