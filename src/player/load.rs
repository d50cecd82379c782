//! Load completion signalling
//!
//! Every load attempt gets its own [`LoadSignal`]. The adapter keeps only
//! the newest one; replacing it drops the sender, which releases anyone
//! still waiting on the previous attempt with `LoadSuperseded`.

use crate::utils::error::{AdapterError, Result};
use tokio::sync::watch;

/// Resolving side, owned by the adapter
#[derive(Debug)]
pub struct LoadSignal {
    tx: watch::Sender<bool>,
}

impl LoadSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Mark the load as opened; later calls are no-ops
    pub fn resolve(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_resolved(&self) -> bool {
        *self.tx.borrow()
    }

    /// Handle for awaiting this load
    pub fn completion(&self) -> LoadCompletion {
        LoadCompletion {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for LoadSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Awaitable side of a [`LoadSignal`]
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    rx: watch::Receiver<bool>,
}

impl LoadCompletion {
    /// Wait for media opened.
    ///
    /// Returns `LoadSuperseded` if a newer load replaced this one before
    /// it opened.
    pub async fn wait(mut self) -> Result<()> {
        self.rx
            .wait_for(|opened| *opened)
            .await
            .map(|_| ())
            .map_err(|_| AdapterError::LoadSuperseded)
    }

    pub fn is_resolved(&self) -> bool {
        *self.rx.borrow()
    }
}
