//! Cross-platform video player contract and its native-engine adapter
//!
//! This module defines the `VideoPlayer` interface shared by every platform
//! backend, the status/event vocabulary it speaks, and `NativeVideoPlayer`,
//! the backend that forwards it to a [`NativePlayer`](crate::native::NativePlayer).

mod controller;
mod load;
mod media_player;
mod progress;
mod source;
mod state;
mod surface;

pub use controller::NativeVideoPlayer;
pub use load::{LoadCompletion, LoadSignal};
pub use media_player::{EventDispatcher, EventSubscription, VideoPlayerBuilder};
pub use progress::{compute_progress, ProgressPoller};
pub use source::{parse_uri, resolve_local_file, MediaSourceBuilder};
pub use state::{
    failure_transition, translate_playback_state, translate_source_state, PollerAction,
    StatusTransition,
};
pub use surface::{bind_video_surface, RenderTarget, VideoSurface};

use crate::utils::error::{AdapterError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Video player interface implemented by each platform backend
#[async_trait]
pub trait VideoPlayer: Send + Sync {
    /// Play a media descriptor; it becomes the current media file
    async fn play_file(&self, file: MediaFile);

    /// Load and play a locator.
    ///
    /// Failures are never returned to the caller; they are logged and,
    /// depending on configuration, reported through `PlayerEvent::MediaFailed`.
    async fn play_url(&self, url: &str, file_type: MediaFileType);

    /// Resume at normal rate
    fn resume(&self) -> Result<()>;

    /// Toggle: resume when paused, pause otherwise
    fn pause(&self) -> Result<()>;

    /// Resume when paused or stopped, toggle otherwise
    fn play_pause(&self) -> Result<()>;

    /// Move the playhead
    fn seek(&self, position: Duration) -> Result<()>;

    /// Stop and rewind; status becomes `Stopped` immediately
    fn stop(&self) -> Result<()>;

    /// Display video output in `surface`
    fn set_video_surface(&self, surface: Arc<dyn RenderTarget>) -> Result<()>;

    fn status(&self) -> MediaPlayerStatus;

    fn buffered(&self) -> Duration;

    fn duration(&self) -> Duration;

    fn position(&self) -> Duration;

    /// Receive every event until the returned handle is dropped
    fn subscribe_events(
        &self,
        callback: Box<dyn Fn(&PlayerEvent) + Send + Sync>,
    ) -> EventSubscription;
}

/// Simplified, platform-independent playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaPlayerStatus {
    #[default]
    Stopped,
    Loading,
    Buffering,
    Playing,
    Paused,
    Failed,
}

/// Kind of locator carried by a [`MediaFile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFileType {
    AudioUrl,
    VideoUrl,
    AudioFile,
    VideoFile,
    Other,
}

impl MediaFileType {
    /// Whether the locator names a local file
    pub fn is_local(&self) -> bool {
        matches!(self, MediaFileType::AudioFile | MediaFileType::VideoFile)
    }
}

impl std::str::FromStr for MediaFileType {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "audiourl" => Ok(MediaFileType::AudioUrl),
            "videourl" => Ok(MediaFileType::VideoUrl),
            "audiofile" => Ok(MediaFileType::AudioFile),
            "videofile" => Ok(MediaFileType::VideoFile),
            "other" => Ok(MediaFileType::Other),
            _ => Err(AdapterError::Config(format!("Unknown media file type '{}'", s))),
        }
    }
}

/// Caller-supplied media descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// URL or local path
    pub url: String,

    pub file_type: MediaFileType,

    /// Display title
    pub title: Option<String>,
}

impl MediaFile {
    pub fn new<S: Into<String>>(url: S, file_type: MediaFileType) -> Self {
        Self {
            url: url.into(),
            file_type,
            title: None,
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Events raised by a video player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Status was assigned (repeated values are not filtered)
    StatusChanged { status: MediaPlayerStatus },

    /// Periodic progress while playing
    PlayingChanged { progress: f64, position: Duration },

    /// Buffering progress
    BufferingChanged { progress: f64, buffered: Duration },

    /// End of media reached
    MediaFinished { file: Option<MediaFile> },

    /// Playback or load failure
    MediaFailed { message: String, code: i32 },
}

/// Player event handler trait
pub trait PlayerEventHandler: Send + Sync {
    fn handle_event(&self, event: &PlayerEvent);
}
