use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// What stage of an action a thought event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtKind {
    /// Intent or reasoning, before anything changes.
    Thinking,
    /// An interaction is being performed.
    Action,
    /// The observed outcome of an interaction.
    Result,
}

impl ThoughtKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThoughtKind::Thinking => "thinking",
            ThoughtKind::Action => "action",
            ThoughtKind::Result => "result",
        }
    }
}

/// One narrated line in a run's progress stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtEvent {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ThoughtKind,
    pub at: DateTime<Utc>,
}

struct NarratorInner {
    log: Mutex<Vec<ThoughtEvent>>,
    tx: broadcast::Sender<ThoughtEvent>,
}

/// Append-only, run-scoped stream of [`ThoughtEvent`]s.
///
/// Cloning a `Narrator` yields another handle onto the same stream; the
/// handle is owned by the run session rather than living in a global, so two
/// runs never interleave their narration. Live consumers use [`subscribe`],
/// after-the-fact consumers snapshot the ordered log with [`events`].
///
/// [`subscribe`]: Narrator::subscribe
/// [`events`]: Narrator::events
#[derive(Clone)]
pub struct Narrator {
    inner: Arc<NarratorInner>,
}

impl Narrator {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            inner: Arc::new(NarratorInner {
                log: Mutex::new(Vec::new()),
                tx,
            }),
        }
    }

    pub fn emit(&self, kind: ThoughtKind, message: impl Into<String>) {
        let event = ThoughtEvent {
            message: message.into(),
            kind,
            at: Utc::now(),
        };
        tracing::debug!(kind = kind.as_str(), "{}", event.message);
        self.inner
            .log
            .lock()
            .expect("narration log poisoned")
            .push(event.clone());
        // No subscribers is fine; the log is the durable record.
        let _ = self.inner.tx.send(event);
    }

    pub fn thinking(&self, message: impl Into<String>) {
        self.emit(ThoughtKind::Thinking, message);
    }

    pub fn action(&self, message: impl Into<String>) {
        self.emit(ThoughtKind::Action, message);
    }

    pub fn result(&self, message: impl Into<String>) {
        self.emit(ThoughtKind::Result, message);
    }

    /// Snapshot of every event emitted so far, in order.
    pub fn events(&self) -> Vec<ThoughtEvent> {
        self.inner.log.lock().expect("narration log poisoned").clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ThoughtEvent> {
        self.inner.tx.subscribe()
    }
}

impl Default for Narrator {
    fn default() -> Self {
        Self::new()
    }
}
