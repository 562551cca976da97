//! Progress notification for long-running reads.
//!
//! Readers own a [`StatusReporter`] and call [`StatusReporter::notify`] while
//! they work. Decorators never deliver events themselves; they only forward
//! listener registration to the reader they wrap.

use std::sync::Arc;

/// A single progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    /// Units of work completed so far
    pub progress: usize,

    /// Total units of work, or 0 when unknown
    pub total: usize,

    /// Human-readable description of the current step
    pub message: String,
}

impl StatusEvent {
    pub fn new(progress: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            progress,
            total,
            message: message.into(),
        }
    }
}

/// Receiver of [`StatusEvent`]s.
pub trait StatusListener: Send + Sync {
    fn status_updated(&self, event: &StatusEvent);
}

/// Set of registered listeners.
///
/// Membership is by `Arc` identity: registering the same listener twice keeps
/// a single entry, and removing a listener that is not registered does nothing.
#[derive(Default, Clone)]
pub struct StatusReporter {
    listeners: Vec<Arc<dyn StatusListener>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. No-op if it is already registered.
    pub fn add(&mut self, listener: Arc<dyn StatusListener>) {
        if !self.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    /// Unregister a listener. No-op if it is not registered.
    pub fn remove(&mut self, listener: &Arc<dyn StatusListener>) {
        self.listeners.retain(|l| !same_listener(l, listener));
    }

    pub fn contains(&self, listener: &Arc<dyn StatusListener>) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    /// Snapshot of the current members.
    pub fn listeners(&self) -> Vec<Arc<dyn StatusListener>> {
        self.listeners.clone()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to every registered listener.
    pub fn notify(&self, progress: usize, total: usize, message: impl Into<String>) {
        if self.listeners.is_empty() {
            return;
        }
        let event = StatusEvent::new(progress, total, message);
        for listener in &self.listeners {
            listener.status_updated(&event);
        }
    }
}

impl std::fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReporter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Compare by data pointer only; vtable pointers for the same object may differ
/// between codegen units.
fn same_listener(a: &Arc<dyn StatusListener>, b: &Arc<dyn StatusListener>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}
