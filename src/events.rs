//! Merge point for the voice and gesture producers.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Gesture,
    Voice,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gesture => "gesture",
            Self::Voice => "voice",
        }
    }
}

/// One unit of user intent. Consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub payload: String,
    pub suppress_alert: bool,
}

impl Event {
    pub fn gesture(payload: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Gesture,
            payload: payload.into(),
            suppress_alert: false,
        }
    }

    pub fn voice(payload: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Voice,
            payload: payload.into(),
            suppress_alert: false,
        }
    }

    pub fn suppressed(mut self) -> Self {
        self.suppress_alert = true;
        self
    }
}

/// Unbounded FIFO; any number of producers, one consumer.
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

/// Cloneable producer side of an [`EventBus`].
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Never blocks. Returns false only if the bus was dropped.
    pub fn put(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    pub fn put(&self, event: Event) {
        // The bus owns a receiver, so the channel cannot be disconnected here.
        let _ = self.tx.send(event);
    }

    pub fn try_get(&self) -> Option<Event> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
