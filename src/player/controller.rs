//! Native video player adapter
//!
//! `NativeVideoPlayer` implements [`VideoPlayer`] on top of a
//! [`NativePlayer`]. Commands are forwarded straight to the engine; status,
//! progress, buffering, completion and failure are derived from the
//! engine's notifications, which arrive asynchronously on engine threads.

use crate::native::{
    NativeFailure, NativeMediaSource, NativePlaybackState, NativePlayer, NativeSourceState,
    OpenCompleted, PlaybackItem, PlaybackList, SessionSnapshot, SourceLocation,
};
use crate::player::load::{LoadCompletion, LoadSignal};
use crate::player::media_player::{EventDispatcher, EventSubscription, VideoPlayerBuilder};
use crate::player::progress::{compute_progress, ProgressPoller};
use crate::player::source::MediaSourceBuilder;
use crate::player::state::{
    failure_transition, translate_playback_state, translate_source_state, PollerAction,
    StatusTransition,
};
use crate::player::surface::{bind_video_surface, RenderTarget};
use crate::player::{MediaFile, MediaFileType, MediaPlayerStatus, PlayerEvent, VideoPlayer};
use crate::utils::config::PlaybackConfig;
use crate::utils::error::{AdapterError, Result};
use crate::utils::signal::Connection;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// The loaded source and the connections made to it
struct CurrentSource {
    source: Arc<dyn NativeMediaSource>,
    _connections: Vec<Connection>,
}

/// Completion of the newest load and whether its source reached the engine
struct PendingLoad {
    signal: LoadSignal,
    generation: u64,
    assigned: bool,
}

impl PendingLoad {
    fn new(generation: u64) -> Self {
        Self {
            signal: LoadSignal::new(),
            generation,
            assigned: false,
        }
    }
}

/// State shared between commands and native callbacks
struct Inner {
    native: Arc<dyn NativePlayer>,
    config: PlaybackConfig,
    status: Mutex<MediaPlayerStatus>,
    events: EventDispatcher,
    poller: ProgressPoller,
    current_source: Mutex<Option<CurrentSource>>,
    current_file: Mutex<Option<MediaFile>>,
    load: Mutex<PendingLoad>,
    render_surface: Mutex<Option<Arc<dyn RenderTarget>>>,
}

/// Wrap a handler so the callback holds the adapter weakly
fn with_inner<T, F>(weak: &Weak<Inner>, handler: F) -> impl Fn(&T) + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&Inner, &T) + Send + Sync + 'static,
{
    let weak = weak.clone();
    move |value: &T| {
        if let Some(inner) = weak.upgrade() {
            handler(&inner, value);
        }
    }
}

impl Inner {
    /// Subscribe to player-wide notifications for the adapter's lifetime
    fn connect_player(inner: &Arc<Inner>) -> Vec<Connection> {
        let weak = Arc::downgrade(inner);
        let signals = inner.native.signals();

        vec![
            signals.playback_state_changed.connect(with_inner(
                &weak,
                |inner, snapshot: &SessionSnapshot| inner.on_playback_state_changed(snapshot),
            )),
            signals.media_failed.connect(with_inner(&weak, |inner, failure: &NativeFailure| {
                inner.on_media_failed(failure)
            })),
            signals
                .media_ended
                .connect(with_inner(&weak, |inner, _: &()| inner.on_media_ended())),
            signals
                .buffering_progress_changed
                .connect(with_inner(&weak, |inner, progress: &f64| {
                    inner.on_buffering_changed(*progress)
                })),
            signals
                .media_opened
                .connect(with_inner(&weak, |inner, _: &()| inner.on_media_opened())),
            signals.seek_completed.connect(with_inner(&weak, |inner, _: &()| {
                debug!("Seek completed at {:?}", inner.native.position())
            })),
        ]
    }

    /// Subscribe to a source's notifications; dropping the result detaches.
    ///
    /// A notification already in flight when the source is replaced is
    /// dropped by the current-source check.
    fn connect_source(inner: &Arc<Inner>, source: &Arc<dyn NativeMediaSource>) -> Vec<Connection> {
        let weak = Arc::downgrade(inner);
        let signals = source.signals();

        let origin = Arc::downgrade(source);
        let on_state = with_inner(&weak, move |inner, state: &NativeSourceState| {
            if inner.is_current_source(&origin) {
                inner.on_source_state_changed(*state)
            }
        });
        let origin = Arc::downgrade(source);
        let on_open = with_inner(&weak, move |inner, outcome: &OpenCompleted| {
            if inner.is_current_source(&origin) {
                inner.on_open_completed(outcome)
            }
        });

        vec![
            signals.state_changed.connect(on_state),
            signals.open_completed.connect(on_open),
        ]
    }

    fn is_current_source(&self, source: &Weak<dyn NativeMediaSource>) -> bool {
        let current = self.current_source.lock();
        current
            .as_ref()
            .is_some_and(|c| std::ptr::addr_eq(Arc::as_ptr(&c.source), source.as_ptr()))
    }

    /// Start a new load; the previous completion is superseded
    fn begin_load(&self) -> u64 {
        let mut load = self.load.lock();
        let generation = load.generation + 1;
        *load = PendingLoad::new(generation);
        generation
    }

    /// The load's source was handed to the engine; media opened now belongs to it
    fn mark_assigned(&self, generation: u64) {
        let mut load = self.load.lock();
        if load.generation == generation {
            load.assigned = true;
        }
    }

    fn set_status(&self, status: MediaPlayerStatus) {
        *self.status.lock() = status;
        self.events.dispatch(PlayerEvent::StatusChanged { status });
    }

    fn apply(&self, transition: StatusTransition) {
        if let Some(status) = transition.status {
            self.set_status(status);
        }

        match transition.poller {
            PollerAction::Arm => self.poller.arm(self.config.progress_interval()),
            PollerAction::Disarm => self.poller.disarm(),
            PollerAction::Keep => {}
        }
    }

    /// Terminal failure of the current load attempt
    fn fail(&self, err: &AdapterError) {
        error!("Playback failed: {}", err);
        self.apply(failure_transition());
        self.events.dispatch(PlayerEvent::MediaFailed {
            message: err.to_string(),
            code: err.code(),
        });
    }

    fn on_playback_state_changed(&self, snapshot: &SessionSnapshot) {
        debug!(
            "Native state {:?} (rate {}, position {:?})",
            snapshot.state, snapshot.rate, snapshot.position
        );
        match translate_playback_state(snapshot) {
            Ok(transition) => self.apply(transition),
            Err(e) => self.fail(&e),
        }
    }

    fn on_media_failed(&self, failure: &NativeFailure) {
        warn!("Media failed: {} ({})", failure.message, failure.extended_code);
        self.apply(failure_transition());
        self.events.dispatch(PlayerEvent::MediaFailed {
            message: failure.message.clone(),
            code: failure.extended_code,
        });
    }

    fn on_media_ended(&self) {
        let file = self.current_file.lock().clone();
        info!("Media finished: {:?}", file.as_ref().map(|f| f.url.as_str()));
        self.events.dispatch(PlayerEvent::MediaFinished { file });
    }

    fn on_buffering_changed(&self, progress: f64) {
        let buffered = self.buffered_for(progress);
        self.events.dispatch(PlayerEvent::BufferingChanged { progress, buffered });
    }

    fn on_media_opened(&self) {
        let load = self.load.lock();
        if load.assigned {
            debug!("Media opened");
            load.signal.resolve();
        } else {
            debug!("Ignoring media opened for a replaced source");
        }
    }

    fn on_source_state_changed(&self, state: NativeSourceState) {
        debug!("Source state {:?}", state);
        match translate_source_state(state) {
            Ok(Some(status)) => self.set_status(status),
            Ok(None) => {}
            Err(e) => self.fail(&e),
        }
    }

    fn on_open_completed(&self, outcome: &OpenCompleted) {
        if let Some(failure) = &outcome.error {
            warn!("Source open failed: {} ({})", failure.message, failure.extended_code);
            self.events.dispatch(PlayerEvent::MediaFailed {
                message: failure.message.clone(),
                code: failure.extended_code,
            });
        }
    }

    /// Poller tick
    fn report_progress(&self) {
        if self.native.playback_state() != NativePlaybackState::Playing {
            return;
        }

        let position = self.native.position();
        let progress = compute_progress(position, self.native.natural_duration());
        self.events.dispatch(PlayerEvent::PlayingChanged { progress, position });
    }

    fn buffered_for(&self, progress: f64) -> Duration {
        if !progress.is_finite() {
            return Duration::ZERO;
        }
        self.native.natural_duration().mul_f64(progress.clamp(0.0, 1.0))
    }
}

/// Video player backed by a native media engine
pub struct NativeVideoPlayer {
    inner: Arc<Inner>,
    _connections: Vec<Connection>,
}

impl NativeVideoPlayer {
    /// Create a player with default settings
    pub fn new(native: Arc<dyn NativePlayer>) -> Self {
        VideoPlayerBuilder::new(native).build()
    }

    pub fn builder(native: Arc<dyn NativePlayer>) -> VideoPlayerBuilder {
        VideoPlayerBuilder::new(native)
    }

    pub(crate) fn from_parts(
        native: Arc<dyn NativePlayer>,
        config: PlaybackConfig,
        events: EventDispatcher,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let tick = weak.clone();
            let poller = ProgressPoller::spawn(move || {
                if let Some(inner) = tick.upgrade() {
                    inner.report_progress();
                }
            });

            Inner {
                native,
                config,
                status: Mutex::new(MediaPlayerStatus::default()),
                events,
                poller,
                current_source: Mutex::new(None),
                current_file: Mutex::new(None),
                load: Mutex::new(PendingLoad::new(0)),
                render_surface: Mutex::new(None),
            }
        });

        let connections = Inner::connect_player(&inner);
        Self {
            inner,
            _connections: connections,
        }
    }

    /// Subscribe with a closure
    pub fn subscribe<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(&PlayerEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(callback)
    }

    /// Completion of the most recent load
    pub fn load_completion(&self) -> LoadCompletion {
        self.inner.load.lock().signal.completion()
    }

    /// Descriptor passed to the last `play_file`
    pub fn current_file(&self) -> Option<MediaFile> {
        self.inner.current_file.lock().clone()
    }

    /// Location of the loaded source
    pub fn current_location(&self) -> Option<SourceLocation> {
        self.inner
            .current_source
            .lock()
            .as_ref()
            .map(|current| current.source.location().clone())
    }

    pub fn render_surface(&self) -> Option<Arc<dyn RenderTarget>> {
        self.inner.render_surface.lock().clone()
    }

    /// Whether progress events are currently scheduled
    pub fn is_polling(&self) -> bool {
        self.inner.poller.is_armed()
    }

    async fn open(&self, url: &str, file_type: MediaFileType, generation: u64) -> Result<()> {
        // Detach the previous source before anything else can fire for it
        let previous = self.inner.current_source.lock().take();
        drop(previous);

        let source = MediaSourceBuilder::new(Arc::clone(&self.inner.native))
            .build(url, file_type)
            .await?;
        let connections = Inner::connect_source(&self.inner, &source);

        // Single-item list; queueing is the caller's business
        let mut list = PlaybackList::new();
        list.push(PlaybackItem::new(Arc::clone(&source)));

        *self.inner.current_source.lock() = Some(CurrentSource {
            source,
            _connections: connections,
        });

        self.inner.native.set_source(list)?;
        self.inner.mark_assigned(generation);
        self.inner.native.play()?;
        Ok(())
    }
}

impl Drop for NativeVideoPlayer {
    fn drop(&mut self) {
        // A poller tick may still hold `inner`; detach the source now
        self.inner.poller.disarm();
        let source = self.inner.current_source.lock().take();
        drop(source);
    }
}

#[async_trait]
impl VideoPlayer for NativeVideoPlayer {
    async fn play_file(&self, file: MediaFile) {
        let (url, file_type) = (file.url.clone(), file.file_type);
        *self.inner.current_file.lock() = Some(file);
        self.play_url(&url, file_type).await;
    }

    async fn play_url(&self, url: &str, file_type: MediaFileType) {
        info!("Opening {} as {:?}", url, file_type);
        let generation = self.inner.begin_load();

        if let Err(e) = self.open(url, file_type, generation).await {
            error!("Unable to open url {}: {}", url, e);
            if self.inner.config.report_play_errors {
                self.inner.events.dispatch(PlayerEvent::MediaFailed {
                    message: e.to_string(),
                    code: e.code(),
                });
            }
        }
    }

    fn resume(&self) -> Result<()> {
        debug!("Resuming at rate {}", self.inner.config.normal_rate);
        self.inner.native.set_playback_rate(self.inner.config.normal_rate)?;
        self.inner.native.play()
    }

    fn pause(&self) -> Result<()> {
        if self.inner.native.playback_state() == NativePlaybackState::Paused {
            self.inner.native.play()
        } else {
            self.inner.native.pause()
        }
    }

    fn play_pause(&self) -> Result<()> {
        match self.status() {
            MediaPlayerStatus::Paused | MediaPlayerStatus::Stopped => self.resume(),
            _ => self.pause(),
        }
    }

    fn seek(&self, position: Duration) -> Result<()> {
        debug!("Seeking to {:?}", position);
        self.inner.native.set_position(position)
    }

    fn stop(&self) -> Result<()> {
        info!("Stopping playback");
        self.inner.native.set_playback_rate(0.0)?;
        self.inner.native.set_position(Duration::ZERO)?;
        self.inner.set_status(MediaPlayerStatus::Stopped);
        Ok(())
    }

    fn set_video_surface(&self, surface: Arc<dyn RenderTarget>) -> Result<()> {
        bind_video_surface(self.inner.native.as_ref(), surface.as_ref())?;
        *self.inner.render_surface.lock() = Some(surface);
        Ok(())
    }

    fn status(&self) -> MediaPlayerStatus {
        *self.inner.status.lock()
    }

    fn buffered(&self) -> Duration {
        self.inner.buffered_for(self.inner.native.buffering_progress())
    }

    fn duration(&self) -> Duration {
        self.inner.native.natural_duration()
    }

    fn position(&self) -> Duration {
        self.inner.native.position()
    }

    fn subscribe_events(
        &self,
        callback: Box<dyn Fn(&PlayerEvent) + Send + Sync>,
    ) -> EventSubscription {
        self.inner.events.subscribe(move |event: &PlayerEvent| callback(event))
    }
}
