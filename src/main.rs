use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

use mediabridge::native::{SimulatedHost, SimulatedPlayer};
use mediabridge::player::VideoSurface;
use mediabridge::utils::format_duration;
use mediabridge::{
    Config, MediaFile, MediaFileType, NativeVideoPlayer, PlayerEvent, PlayerEventHandler,
    VideoPlayer,
};

const LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// mediabridge - drive the video player adapter against a simulated engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL or local path to play
    #[arg(value_name = "URL")]
    url: String,

    /// Media file type (audio-url, video-url, audio-file, video-file, other)
    #[arg(short = 't', long = "type", default_value = "video-url")]
    file_type: MediaFileType,

    /// Title attached to the media descriptor
    #[arg(long)]
    title: Option<String>,

    /// Length of the simulated media, in seconds
    #[arg(long, default_value = "10")]
    duration_secs: u64,

    /// How long to play before pausing, in milliseconds
    #[arg(long, default_value = "500")]
    play_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    let log_level = if args.debug {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting mediabridge v{}", env!("CARGO_PKG_VERSION"));

    let native = Arc::new(
        SimulatedPlayer::new().with_media_duration(Duration::from_secs(args.duration_secs)),
    );
    let player = NativeVideoPlayer::builder(native.clone())
        .with_config(config.playback.clone())
        .with_event_handler(Box::new(LoggingEventHandler))
        .build();

    // Subscribe to events for console output
    let _event_sub = player.subscribe(|event| match event {
        PlayerEvent::StatusChanged { status } => info!("Status: {:?}", status),
        PlayerEvent::MediaFinished { file } => {
            info!("Finished: {}", file.as_ref().map_or("<url>", |f| f.url.as_str()))
        }
        PlayerEvent::MediaFailed { message, code } => error!("Failed: {} ({})", message, code),
        _ => {}
    });

    let host = Arc::new(SimulatedHost::new());
    player.set_video_surface(Arc::new(VideoSurface::new(host, 1280.0, 720.0)))?;

    let mut file = MediaFile::new(args.url.clone(), args.file_type);
    if let Some(title) = args.title {
        file = file.with_title(title);
    }

    player.play_file(file).await;
    match tokio::time::timeout(LOAD_TIMEOUT, player.load_completion().wait()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("Load did not complete: {}", e);
            return Ok(());
        }
        Err(_) => {
            error!("Load timed out after {:?}", LOAD_TIMEOUT);
            return Ok(());
        }
    }
    info!("Loaded {} ({})", args.url, format_duration(player.duration()));

    // Let the poller report while the simulated playhead moves
    let step = config.playback.progress_interval();
    let mut elapsed = Duration::ZERO;
    while elapsed < Duration::from_millis(args.play_ms) {
        tokio::time::sleep(step).await;
        native.advance(step);
        elapsed += step;
    }

    player.pause()?;
    info!("Paused at {}", format_duration(player.position()));

    player.play_pause()?;
    player.seek(player.duration() / 2)?;
    info!("Seeked to {}", format_duration(player.position()));

    native.set_buffering(0.75);
    native.end_media();
    player.stop()?;

    info!("Final status: {:?}", player.status());
    Ok(())
}

/// Event handler that logs events
struct LoggingEventHandler;

impl PlayerEventHandler for LoggingEventHandler {
    fn handle_event(&self, event: &PlayerEvent) {
        match event {
            PlayerEvent::PlayingChanged { progress, position } => {
                // Progress fires at poller cadence; keep it at debug level
                debug!("Position: {} ({:.1}%)", format_duration(*position), progress * 100.0);
            }
            PlayerEvent::BufferingChanged { progress, buffered } => {
                info!("Buffered: {:.1}% ({})", progress * 100.0, format_duration(*buffered));
            }
            _ => {
                // Other events are handled by the main event subscription
            }
        }
    }
}
