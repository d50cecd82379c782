//! Native media engine boundary
//!
//! The platform's media player, its media sources and its compositor are
//! external collaborators. This module describes them as traits so the
//! adapter in [`crate::player`] can drive any engine that implements them.
//! A fully in-process implementation lives in [`simulated`].

pub mod composition;
pub mod simulated;

use crate::utils::error::Result;
use crate::utils::signal::Signal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub use composition::{
    CompositionHost, CompositionSurface, Compositor, ContainerVisual, SpriteVisual, SurfaceBrush,
};
pub use simulated::{
    NativeCall, SimulatedCompositor, SimulatedHost, SimulatedPlayer, SimulatedSource,
};

/// Native playback session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativePlaybackState {
    None,
    Opening,
    Buffering,
    Playing,
    Paused,

    /// Value reported by the engine that this binding does not know
    Unknown(i32),
}

impl NativePlaybackState {
    /// Map the engine's raw enumeration value
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => NativePlaybackState::None,
            1 => NativePlaybackState::Opening,
            2 => NativePlaybackState::Buffering,
            3 => NativePlaybackState::Playing,
            4 => NativePlaybackState::Paused,
            other => NativePlaybackState::Unknown(other),
        }
    }
}

/// Native media source state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSourceState {
    Initial,
    Opening,
    Failed,
    Opened,
    Closed,
    Unknown(i32),
}

impl NativeSourceState {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => NativeSourceState::Initial,
            1 => NativeSourceState::Opening,
            2 => NativeSourceState::Failed,
            3 => NativeSourceState::Opened,
            4 => NativeSourceState::Closed,
            other => NativeSourceState::Unknown(other),
        }
    }
}

/// Session values read at the moment the engine reported a state change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub state: NativePlaybackState,
    pub rate: f64,
    pub position: Duration,
}

/// Failure reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFailure {
    pub message: String,
    pub extended_code: i32,
}

impl NativeFailure {
    pub fn new<S: Into<String>>(message: S, extended_code: i32) -> Self {
        Self {
            message: message.into(),
            extended_code,
        }
    }
}

/// Payload of a source's open-operation-completed notification
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenCompleted {
    pub error: Option<NativeFailure>,
}

/// Local file resolved on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Where a native source reads its media from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Uri(Url),
    File(ResolvedFile),
}

/// Notifications raised by the player and its session
#[derive(Default)]
pub struct PlayerSignals {
    pub playback_state_changed: Signal<SessionSnapshot>,
    pub buffering_progress_changed: Signal<f64>,
    pub media_failed: Signal<NativeFailure>,
    pub media_ended: Signal<()>,
    pub media_opened: Signal<()>,
    pub seek_completed: Signal<()>,
}

/// Notifications raised by a single media source
#[derive(Default)]
pub struct SourceSignals {
    pub state_changed: Signal<NativeSourceState>,
    pub open_completed: Signal<OpenCompleted>,
}

/// A loaded, openable media item
pub trait NativeMediaSource: Send + Sync {
    fn location(&self) -> &SourceLocation;

    fn signals(&self) -> &SourceSignals;
}

/// Entry of a [`PlaybackList`]
#[derive(Clone)]
pub struct PlaybackItem {
    source: Arc<dyn NativeMediaSource>,
}

impl PlaybackItem {
    pub fn new(source: Arc<dyn NativeMediaSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<dyn NativeMediaSource> {
        &self.source
    }
}

/// Ordered list of items handed to the native player
#[derive(Clone, Default)]
pub struct PlaybackList {
    items: Vec<PlaybackItem>,
}

impl PlaybackList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: PlaybackItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[PlaybackItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The platform media player and its playback session
pub trait NativePlayer: Send + Sync {
    /// Replace the player's source
    fn set_source(&self, list: PlaybackList) -> Result<()>;

    /// Start or resume playback
    fn play(&self) -> Result<()>;

    /// Pause playback
    fn pause(&self) -> Result<()>;

    fn playback_state(&self) -> NativePlaybackState;

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&self, rate: f64) -> Result<()>;

    fn position(&self) -> Duration;

    fn set_position(&self, position: Duration) -> Result<()>;

    /// Duration of the loaded media, zero while unknown
    fn natural_duration(&self) -> Duration;

    /// Buffered fraction of the media (0.0 to 1.0)
    fn buffering_progress(&self) -> f64;

    /// Size of the video surface in device-independent pixels
    fn set_surface_size(&self, width: f64, height: f64) -> Result<()>;

    /// Video output as a surface usable by `compositor`
    fn surface(&self, compositor: &dyn Compositor) -> Result<CompositionSurface>;

    fn create_source_from_uri(&self, uri: &Url) -> Result<Arc<dyn NativeMediaSource>>;

    fn create_source_from_file(&self, file: &ResolvedFile) -> Result<Arc<dyn NativeMediaSource>>;

    fn signals(&self) -> &PlayerSignals;
}
