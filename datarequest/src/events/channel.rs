//! The status channel and its listener trait.

use super::StatusUpdate;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Receives status updates published on a [`StatusChannel`].
#[cfg_attr(test, mockall::automock)]
pub trait StatusListener: Send + Sync {
    /// Handles one update. Must not block for long.
    fn on_status(&self, update: &StatusUpdate);
}

/// Broadcasts status updates to zero or more listeners.
///
/// The channel is created before the first stage and closed after the last
/// one. Once closed it holds no listeners and drops every update.
#[derive(Default)]
pub struct StatusChannel {
    listeners: RwLock<Vec<Arc<dyn StatusListener>>>,
    closed: AtomicBool,
}

impl StatusChannel {
    /// Creates an open channel with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Returns false if the channel is already closed.
    pub fn subscribe(&self, listener: Arc<dyn StatusListener>) -> bool {
        if self.is_closed() {
            return false;
        }
        self.listeners.write().push(listener);
        true
    }

    /// Delivers an update to every listener, in subscription order.
    ///
    /// With no listeners, or after [`StatusChannel::close`], the update is dropped.
    pub fn publish(&self, update: StatusUpdate) {
        if self.is_closed() {
            debug!(message = %update.message, "Status channel closed, dropping update");
            return;
        }

        // Snapshot so listeners may subscribe from inside a callback.
        let listeners: Vec<_> = self.listeners.read().clone();
        for listener in listeners {
            listener.on_status(&update);
        }
    }

    /// Returns the number of subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Closes the channel and releases every listener.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.listeners.write().clear();
    }

    /// Returns true once the channel has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for StatusChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusChannel")
            .field("listener_count", &self.listener_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
