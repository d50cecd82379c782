//! Player construction and event dispatch
//!
//! `VideoPlayerBuilder` assembles a [`NativeVideoPlayer`] around a native
//! engine; `EventDispatcher` fans player events out to subscribers and to
//! handlers registered at build time.

use crate::native::NativePlayer;
use crate::player::{NativeVideoPlayer, PlayerEvent, PlayerEventHandler};
use crate::utils::config::PlaybackConfig;
use crate::utils::signal::{Connection, Signal};
use std::sync::Arc;

/// Builder for a native-backed video player
pub struct VideoPlayerBuilder {
    native: Arc<dyn NativePlayer>,
    config: PlaybackConfig,
    event_handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl VideoPlayerBuilder {
    /// Create a builder with default settings
    pub fn new(native: Arc<dyn NativePlayer>) -> Self {
        Self {
            native,
            config: PlaybackConfig::default(),
            event_handlers: Vec::new(),
        }
    }

    /// Set playback configuration
    pub fn with_config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    /// Add an event handler
    pub fn with_event_handler(mut self, handler: Box<dyn PlayerEventHandler>) -> Self {
        self.event_handlers.push(handler);
        self
    }

    /// Build the player
    pub fn build(self) -> NativeVideoPlayer {
        let dispatcher = EventDispatcher::new(self.event_handlers);
        NativeVideoPlayer::from_parts(self.native, self.config, dispatcher)
    }
}

/// Event dispatcher
pub struct EventDispatcher {
    subscribers: Signal<PlayerEvent>,
    handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl EventDispatcher {
    pub fn new(handlers: Vec<Box<dyn PlayerEventHandler>>) -> Self {
        Self {
            subscribers: Signal::new(),
            handlers,
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(&PlayerEvent) + Send + Sync + 'static,
    {
        EventSubscription {
            connection: self.subscribers.connect(callback),
        }
    }

    pub fn dispatch(&self, event: PlayerEvent) {
        for handler in &self.handlers {
            handler.handle_event(&event);
        }
        self.subscribers.emit(&event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.connection_count()
    }
}

/// Event subscription handle; dropping it unsubscribes
#[derive(Debug)]
pub struct EventSubscription {
    connection: Connection,
}

impl EventSubscription {
    pub fn unsubscribe(self) {
        self.connection.disconnect();
    }
}
