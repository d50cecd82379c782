//! Integration tests for the mediabridge video player adapter
//!
//! These tests drive the public API against the simulated engine:
//! - Loading URLs and local files
//! - Play/pause/seek/stop operations
//! - Failure reporting
//! - Source replacement and cleanup

use anyhow::Result;
use mediabridge::native::{
    NativeFailure, NativeMediaSource, NativePlaybackState, NativePlayer, NativeSourceState,
    SimulatedHost, SimulatedPlayer, SourceLocation,
};
use mediabridge::player::{RenderTarget, VideoSurface};
use mediabridge::utils::PlaybackConfig;
use mediabridge::{
    AdapterError, MediaFile, MediaFileType, MediaPlayerStatus, PlayerEvent, VideoPlayer,
};
use mediabridge_integration_tests::{MediaFixture, TestPlayer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_player_initialization() {
    let t = TestPlayer::new();

    assert_eq!(t.player.status(), MediaPlayerStatus::Stopped);
    assert_eq!(t.player.position(), Duration::ZERO);
    assert_eq!(t.player.duration(), Duration::ZERO);
    assert_eq!(t.player.buffered(), Duration::ZERO);
    assert!(t.player.current_file().is_none());
    assert!(!t.player.is_polling());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_url_load_reports_progress() -> Result<()> {
    let t = TestPlayer::new();

    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    t.player.load_completion().wait().await?;

    let statuses = t.events.statuses();
    assert_eq!(statuses.first(), Some(&MediaPlayerStatus::Loading));
    assert_eq!(statuses.last(), Some(&MediaPlayerStatus::Playing));
    assert_eq!(t.player.duration(), Duration::from_secs(10));

    t.native.advance(Duration::from_secs(2));
    sleep(Duration::from_millis(300)).await;
    t.player.pause()?;

    // 20 per second while playing
    let progress = t.events.progress();
    assert!(progress.len() >= 4, "got {} progress events", progress.len());
    assert!(progress.iter().all(|(_, p, _)| (0.0..=1.0).contains(p)));
    let (_, last_progress, last_position) = progress[progress.len() - 1];
    assert_eq!(last_position, Duration::from_secs(2));
    assert!((last_progress - 0.2).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_local_file_load() -> Result<()> {
    let fixture = MediaFixture::new()?;
    let t = TestPlayer::new();
    let file = MediaFile::new(fixture.video.to_str().unwrap_or_default(), MediaFileType::VideoFile)
        .with_title("Clip");

    t.player.play_file(file.clone()).await;

    assert_eq!(t.player.status(), MediaPlayerStatus::Playing);
    assert_eq!(t.player.current_file(), Some(file));
    match t.player.current_location() {
        Some(SourceLocation::File(resolved)) => {
            assert_eq!(resolved.path, std::fs::canonicalize(&fixture.video)?);
            assert!(resolved.path.starts_with(std::fs::canonicalize(fixture.path())?));
        }
        other => panic!("Expected file source, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_missing_file_is_reported() -> Result<()> {
    let fixture = MediaFixture::new()?;
    let t = TestPlayer::new();
    let missing = fixture.path().join("missing.mp3");

    t.player
        .play_url(missing.to_str().unwrap_or_default(), MediaFileType::AudioFile)
        .await;

    let failures = t.events.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].1, AdapterError::NotFound(String::new()).code());
    assert_eq!(t.player.status(), MediaPlayerStatus::Stopped);
    assert!(t.native.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_seek_while_playing() -> Result<()> {
    let t = TestPlayer::new();
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    t.events.clear();

    t.player.seek(Duration::from_secs(7))?;

    assert_eq!(t.player.position(), Duration::from_secs(7));
    assert_eq!(t.player.status(), MediaPlayerStatus::Playing);
    assert!(t.events.statuses().is_empty());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_media_failure_stops_progress() -> Result<()> {
    let t = TestPlayer::new();
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    assert!(t.player.is_polling());

    t.native.fail_media(NativeFailure::new("codec error", 42));

    assert_eq!(t.player.status(), MediaPlayerStatus::Failed);
    assert_eq!(t.events.failures(), vec![("codec error".to_string(), 42)]);
    assert!(!t.player.is_polling());

    // Engine keeps reporting Playing but no progress follows
    sleep(Duration::from_millis(20)).await;
    let before = t.events.progress().len();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(t.events.progress().len(), before);

    Ok(())
}

#[tokio::test]
async fn test_stop_is_immediate() -> Result<()> {
    let t = TestPlayer::new();
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    t.native.advance(Duration::from_secs(4));

    t.player.stop()?;

    assert_eq!(t.player.status(), MediaPlayerStatus::Stopped);
    assert_eq!(t.player.position(), Duration::ZERO);
    assert_eq!(t.native.playback_rate(), 0.0);
    assert_eq!(t.events.statuses().last(), Some(&MediaPlayerStatus::Stopped));

    Ok(())
}

#[tokio::test]
async fn test_play_pause_cycle() -> Result<()> {
    let t = TestPlayer::new();
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;

    t.player.play_pause()?;
    assert_eq!(t.player.status(), MediaPlayerStatus::Paused);
    t.player.play_pause()?;
    assert_eq!(t.player.status(), MediaPlayerStatus::Playing);

    t.player.stop()?;
    t.player.play_pause()?;
    assert_eq!(t.player.status(), MediaPlayerStatus::Playing);
    assert_eq!(t.native.playback_rate(), 1.0);

    Ok(())
}

#[tokio::test]
async fn test_resume_uses_configured_rate() -> Result<()> {
    let config = PlaybackConfig {
        normal_rate: 1.5,
        ..PlaybackConfig::default()
    };
    let t = TestPlayer::with_parts(SimulatedPlayer::new(), config);
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    t.player.pause()?;

    t.player.resume()?;
    assert_eq!(t.native.playback_rate(), 1.5);
    assert_eq!(t.player.status(), MediaPlayerStatus::Playing);

    Ok(())
}

#[tokio::test]
async fn test_replaced_source_is_detached() {
    let t = TestPlayer::new();
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    let stale = t.native.current_source().expect("first source");

    t.player.play_url("http://x/b.mp4", MediaFileType::VideoUrl).await;
    assert_eq!(stale.signals().state_changed.connection_count(), 0);
    assert_eq!(stale.signals().open_completed.connection_count(), 0);

    t.events.clear();
    stale.set_state(NativeSourceState::Failed);
    stale.complete_open(Some(NativeFailure::new("stale", 9)));

    assert!(t.events.discrete().is_empty());
    assert_eq!(t.player.status(), MediaPlayerStatus::Playing);
}

#[tokio::test]
async fn test_load_completion_is_superseded() -> Result<()> {
    let native = SimulatedPlayer::new();
    native.set_auto_open(false);
    let t = TestPlayer::with_parts(native, PlaybackConfig::default());

    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    let first = t.player.load_completion();
    assert_eq!(t.player.status(), MediaPlayerStatus::Loading);

    t.player.play_url("http://x/b.mp4", MediaFileType::VideoUrl).await;
    let second = t.player.load_completion();

    let waiter = tokio::spawn(second.wait());
    t.native.complete_open();

    assert!(matches!(first.wait().await, Err(AdapterError::LoadSuperseded)));
    waiter.await??;
    assert_eq!(t.player.status(), MediaPlayerStatus::Playing);

    Ok(())
}

#[tokio::test]
async fn test_open_during_file_resolution_belongs_to_previous_load() -> Result<()> {
    let fixture = MediaFixture::new()?;
    let native = SimulatedPlayer::new();
    native.set_auto_open(false);
    let t = TestPlayer::with_parts(native, PlaybackConfig::default());
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;

    // The engine finishes opening while the next file is being resolved
    let locator = fixture.video.to_str().unwrap_or_default().to_string();
    let (_, opened) = tokio::join!(
        t.player.play_url(&locator, MediaFileType::VideoFile),
        async {
            tokio::task::yield_now().await;
            let opened = t.native.current_source();
            t.native.complete_open();
            opened
        }
    );

    let opened_file = matches!(
        opened.as_ref().map(|source| source.location()),
        Some(SourceLocation::File(_))
    );
    let completion = t.player.load_completion();
    assert_eq!(completion.is_resolved(), opened_file);
    assert!(matches!(t.player.current_location(), Some(SourceLocation::File(_))));

    t.native.complete_open();
    completion.wait().await?;

    Ok(())
}

#[tokio::test]
async fn test_open_failure() {
    let native = SimulatedPlayer::new();
    native.set_auto_open(false);
    let t = TestPlayer::with_parts(native, PlaybackConfig::default());

    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    t.native.fail_open(NativeFailure::new("unsupported format", 1234));

    assert_eq!(t.player.status(), MediaPlayerStatus::Failed);
    assert_eq!(t.events.failures(), vec![("unsupported format".to_string(), 1234)]);
}

#[tokio::test]
async fn test_play_errors_are_reported() {
    let t = TestPlayer::new();

    t.player.play_url("not a uri", MediaFileType::VideoUrl).await;

    let failures = t.events.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].1, -1);
    assert_eq!(t.player.status(), MediaPlayerStatus::Stopped);
}

#[tokio::test]
async fn test_play_errors_can_stay_in_the_log() {
    let config = PlaybackConfig {
        report_play_errors: false,
        ..PlaybackConfig::default()
    };
    let t = TestPlayer::with_parts(SimulatedPlayer::new(), config);

    t.player.play_url("not a uri", MediaFileType::VideoUrl).await;

    assert!(t.events.all().is_empty());
    assert_eq!(t.player.status(), MediaPlayerStatus::Stopped);
}

#[tokio::test]
async fn test_media_finished_carries_file() {
    let t = TestPlayer::new();
    let file = MediaFile::new("http://x/a.mp3", MediaFileType::AudioUrl).with_title("Track");
    t.player.play_file(file.clone()).await;
    t.events.clear();

    t.native.end_media();

    assert_eq!(
        t.events.discrete(),
        vec![PlayerEvent::MediaFinished { file: Some(file) }]
    );
}

#[tokio::test]
async fn test_buffering_events() {
    let t = TestPlayer::new();
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    t.events.clear();

    t.native.set_buffering(0.5);
    t.native.set_buffering(1.0);

    assert_eq!(
        t.events.discrete(),
        vec![
            PlayerEvent::BufferingChanged {
                progress: 0.5,
                buffered: Duration::from_secs(5),
            },
            PlayerEvent::BufferingChanged {
                progress: 1.0,
                buffered: Duration::from_secs(10),
            },
        ]
    );
    assert_eq!(t.player.buffered(), Duration::from_secs(10));
}

#[tokio::test]
async fn test_unknown_engine_state_fails() {
    let t = TestPlayer::new();
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;

    t.native.set_state(NativePlaybackState::from_raw(99));

    assert_eq!(t.player.status(), MediaPlayerStatus::Failed);
    assert!(!t.player.is_polling());
    assert_eq!(t.events.failures().len(), 1);
    assert_eq!(t.events.failures()[0].1, 99);
}

#[tokio::test]
async fn test_video_surface_binding() -> Result<()> {
    let t = TestPlayer::new();
    let host = Arc::new(SimulatedHost::new());

    t.player
        .set_video_surface(Arc::new(VideoSurface::new(host.clone(), 800.0, 450.0)))?;

    let container = host.child_visual().expect("container set on host");
    assert_eq!(container.children().len(), 1);
    assert_eq!(container.children()[0].size, [800.0, 450.0]);
    assert!(t.player.render_surface().is_some());

    Ok(())
}

#[tokio::test]
async fn test_plain_target_is_rejected() {
    struct Label;
    impl RenderTarget for Label {
        fn actual_size(&self) -> (f64, f64) {
            (200.0, 20.0)
        }
    }

    let t = TestPlayer::new();
    let result = t.player.set_video_surface(Arc::new(Label));

    assert!(matches!(result, Err(AdapterError::InvalidSurface(_))));
    assert!(t.player.render_surface().is_none());
}

#[tokio::test]
async fn test_player_drop_releases_engine() {
    let t = TestPlayer::new();
    t.player.play_url("http://x/a.mp4", MediaFileType::VideoUrl).await;
    let native = Arc::clone(&t.native);
    let source = native.current_source().expect("source");

    drop(t);

    assert_eq!(native.signals().playback_state_changed.connection_count(), 0);
    assert_eq!(source.signals().state_changed.connection_count(), 0);
    // Notifications after drop go nowhere
    native.set_state(NativePlaybackState::Paused);
}
