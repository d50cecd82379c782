//! Multi-subscriber callback lists
//!
//! A [`Signal`] is the Rust side of a platform event: callbacks are
//! connected to it and every emitted value is delivered to all of them.
//! Connecting returns a [`Connection`] handle that disconnects the
//! callback when dropped.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Slot<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct SignalInner<T> {
    next_id: AtomicU64,
    slots: RwLock<Vec<(u64, Slot<T>)>>,
}

/// Callback list for values of type `T`
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                next_id: AtomicU64::new(0),
                slots: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Connect a callback; it stays connected while the returned handle lives
    pub fn connect<F>(&self, callback: F) -> Connection
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.slots.write().push((id, Arc::new(callback)));

        let weak: Weak<SignalInner<T>> = Arc::downgrade(&self.inner);
        Connection {
            disconnect: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.slots.write().retain(|(slot_id, _)| *slot_id != id);
                }
            })),
        }
    }

    /// Deliver `value` to every connected callback.
    ///
    /// Callbacks run on the calling thread, outside the slot lock, so a
    /// callback may connect or disconnect on this same signal.
    pub fn emit(&self, value: &T) {
        let slots: Vec<Slot<T>> = self
            .inner
            .slots
            .read()
            .iter()
            .map(|(_, slot)| Arc::clone(slot))
            .collect();

        for slot in slots {
            slot(value);
        }
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.inner.slots.read().len()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a connected callback
pub struct Connection {
    disconnect: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Connection {
    /// Disconnect now instead of at drop
    pub fn disconnect(mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("connected", &self.disconnect.is_some())
            .finish()
    }
}
