//! Integration test utilities for mediabridge
//!
//! This module provides common utilities for integration testing including:
//! - A player wired to the simulated engine
//! - Event recording and filtering
//! - Local media fixtures

use anyhow::Result;
use mediabridge::native::SimulatedPlayer;
use mediabridge::player::EventSubscription;
use mediabridge::utils::PlaybackConfig;
use mediabridge::{MediaPlayerStatus, NativeVideoPlayer, PlayerEvent};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Player under test plus the engine behind it
pub struct TestPlayer {
    pub native: Arc<SimulatedPlayer>,
    pub player: NativeVideoPlayer,
    pub events: EventRecorder,
}

impl TestPlayer {
    /// Engine with 10 s media that opens on play
    pub fn new() -> Self {
        Self::with_parts(SimulatedPlayer::new(), PlaybackConfig::default())
    }

    pub fn with_parts(native: SimulatedPlayer, config: PlaybackConfig) -> Self {
        let native = Arc::new(native.with_media_duration(Duration::from_secs(10)));
        let player = NativeVideoPlayer::builder(native.clone())
            .with_config(config)
            .build();
        let events = EventRecorder::attach(&player);

        Self {
            native,
            player,
            events,
        }
    }
}

impl Default for TestPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Records every event a player raises
pub struct EventRecorder {
    events: Arc<Mutex<Vec<(Instant, PlayerEvent)>>>,
    _subscription: EventSubscription,
}

impl EventRecorder {
    pub fn attach(player: &NativeVideoPlayer) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = player.subscribe(move |event| {
            sink.lock().push((Instant::now(), event.clone()));
        });

        Self {
            events,
            _subscription: subscription,
        }
    }

    pub fn all(&self) -> Vec<PlayerEvent> {
        self.events.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn statuses(&self) -> Vec<MediaPlayerStatus> {
        self.all()
            .into_iter()
            .filter_map(|event| match event {
                PlayerEvent::StatusChanged { status } => Some(status),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(String, i32)> {
        self.all()
            .into_iter()
            .filter_map(|event| match event {
                PlayerEvent::MediaFailed { message, code } => Some((message, code)),
                _ => None,
            })
            .collect()
    }

    /// Progress events with the time they arrived
    pub fn progress(&self) -> Vec<(Instant, f64, Duration)> {
        self.events
            .lock()
            .iter()
            .filter_map(|(at, event)| match event {
                PlayerEvent::PlayingChanged { progress, position } => {
                    Some((*at, *progress, *position))
                }
                _ => None,
            })
            .collect()
    }

    /// Everything except periodic progress
    pub fn discrete(&self) -> Vec<PlayerEvent> {
        self.all()
            .into_iter()
            .filter(|event| !matches!(event, PlayerEvent::PlayingChanged { .. }))
            .collect()
    }

    /// Poll until `predicate` holds or `timeout` elapses
    pub async fn wait_until<F>(&self, timeout: Duration, predicate: F) -> bool
    where
        F: Fn(&[PlayerEvent]) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if predicate(&self.all()) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

/// Local media files for file-typed loads
pub struct MediaFixture {
    pub temp_dir: TempDir,
    pub video: PathBuf,
    pub audio: PathBuf,
}

impl MediaFixture {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;

        let video = temp_dir.path().join("clip.mp4");
        std::fs::write(&video, b"fake_mp4_data")?;
        let audio = temp_dir.path().join("track.mp3");
        std::fs::write(&audio, b"fake_mp3_data")?;

        Ok(Self {
            temp_dir,
            video,
            audio,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
