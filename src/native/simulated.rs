//! In-process native engine
//!
//! `SimulatedPlayer` behaves like a platform media player without decoding
//! anything: it keeps a playback session, records every control call and
//! raises the same notifications a real engine would. Tests and the demo
//! binary drive the adapter through it.

use crate::native::composition::{
    CompositionHost, CompositionSurface, Compositor, ContainerVisual, SpriteVisual, SurfaceBrush,
};
use crate::native::{
    NativeFailure, NativeMediaSource, NativePlaybackState, NativePlayer, NativeSourceState,
    OpenCompleted, PlaybackList, PlayerSignals, ResolvedFile, SessionSnapshot, SourceLocation,
    SourceSignals,
};
use crate::utils::error::{AdapterError, Result};

use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Control call received by the simulated engine
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    SetSource { items: usize },
    Play,
    Pause,
    SetRate(f64),
    SetPosition(Duration),
    SetSurfaceSize(f64, f64),
    Surface,
}

#[derive(Debug)]
struct Session {
    state: NativePlaybackState,
    rate: f64,
    position: Duration,
    duration: Duration,
    buffering: f64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: NativePlaybackState::None,
            rate: 1.0,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            buffering: 0.0,
        }
    }
}

/// Simulated media source
pub struct SimulatedSource {
    location: SourceLocation,
    signals: SourceSignals,
}

impl SimulatedSource {
    fn new(location: SourceLocation) -> Self {
        Self {
            location,
            signals: SourceSignals::default(),
        }
    }

    /// Raise a state-changed notification
    pub fn set_state(&self, state: NativeSourceState) {
        self.signals.state_changed.emit(&state);
    }

    /// Raise an open-operation-completed notification
    pub fn complete_open(&self, error: Option<NativeFailure>) {
        self.signals.open_completed.emit(&OpenCompleted { error });
    }
}

impl NativeMediaSource for SimulatedSource {
    fn location(&self) -> &SourceLocation {
        &self.location
    }

    fn signals(&self) -> &SourceSignals {
        &self.signals
    }
}

/// Simulated media player
pub struct SimulatedPlayer {
    session: Mutex<Session>,
    signals: PlayerSignals,
    current: Mutex<Option<Arc<SimulatedSource>>>,
    sources: Mutex<Vec<Arc<SimulatedSource>>>,
    pending_open: AtomicBool,
    auto_open: AtomicBool,
    media_duration: Mutex<Duration>,
    source_failure: Mutex<Option<NativeFailure>>,
    calls: Mutex<Vec<NativeCall>>,
    next_surface_id: AtomicU64,
}

impl SimulatedPlayer {
    /// Create an engine that opens sources as soon as playback starts
    pub fn new() -> Self {
        Self {
            session: Mutex::new(Session::default()),
            signals: PlayerSignals::default(),
            current: Mutex::new(None),
            sources: Mutex::new(Vec::new()),
            pending_open: AtomicBool::new(false),
            auto_open: AtomicBool::new(true),
            media_duration: Mutex::new(Duration::from_secs(60)),
            source_failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            next_surface_id: AtomicU64::new(1),
        }
    }

    /// Duration reported once a source has opened
    pub fn with_media_duration(self, duration: Duration) -> Self {
        *self.media_duration.lock() = duration;
        self
    }

    /// When disabled, `play()` on a fresh source stops at Opening until
    /// [`SimulatedPlayer::complete_open`] is called.
    pub fn set_auto_open(&self, enabled: bool) {
        self.auto_open.store(enabled, Ordering::SeqCst);
    }

    /// Make the next source construction fail
    pub fn fail_next_source(&self, failure: NativeFailure) {
        *self.source_failure.lock() = Some(failure);
    }

    /// Change the session state and raise playback-state-changed
    pub fn set_state(&self, state: NativePlaybackState) {
        let snapshot = {
            let mut session = self.session.lock();
            session.state = state;
            SessionSnapshot {
                state,
                rate: session.rate,
                position: session.position,
            }
        };
        debug!("Simulated session state: {:?}", state);
        self.signals.playback_state_changed.emit(&snapshot);
    }

    /// Change buffering progress and raise buffering-progress-changed
    pub fn set_buffering(&self, progress: f64) {
        let progress = progress.clamp(0.0, 1.0);
        self.session.lock().buffering = progress;
        self.signals.buffering_progress_changed.emit(&progress);
    }

    /// Move the playhead forward, bounded by the media duration
    pub fn advance(&self, delta: Duration) {
        let mut session = self.session.lock();
        session.position = (session.position + delta).min(session.duration);
    }

    /// Raise media-failed
    pub fn fail_media(&self, failure: NativeFailure) {
        self.signals.media_failed.emit(&failure);
    }

    /// Jump to the end and raise media-ended
    pub fn end_media(&self) {
        {
            let mut session = self.session.lock();
            session.position = session.duration;
        }
        self.signals.media_ended.emit(&());
    }

    /// Finish opening the current source: source opened, media opened,
    /// then the session starts playing.
    pub fn complete_open(&self) {
        let Some(source) = self.current_source() else {
            return;
        };
        self.pending_open.store(false, Ordering::SeqCst);

        source.complete_open(None);
        source.set_state(NativeSourceState::Opened);
        {
            let mut session = self.session.lock();
            session.duration = *self.media_duration.lock();
        }
        self.signals.media_opened.emit(&());
        self.set_state(NativePlaybackState::Playing);
    }

    /// Fail opening the current source
    pub fn fail_open(&self, failure: NativeFailure) {
        let Some(source) = self.current_source() else {
            return;
        };
        self.pending_open.store(false, Ordering::SeqCst);

        source.complete_open(Some(failure));
        source.set_state(NativeSourceState::Failed);
    }

    pub fn current_source(&self) -> Option<Arc<SimulatedSource>> {
        self.current.lock().clone()
    }

    /// Every source constructed so far, oldest first
    pub fn sources(&self) -> Vec<Arc<SimulatedSource>> {
        self.sources.lock().clone()
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: NativeCall) {
        self.calls.lock().push(call);
    }

    fn begin_open(&self) {
        if let Some(source) = self.current_source() {
            source.set_state(NativeSourceState::Opening);
        }
        self.set_state(NativePlaybackState::Opening);
    }

    fn make_source(&self, location: SourceLocation) -> Result<Arc<dyn NativeMediaSource>> {
        if let Some(failure) = self.source_failure.lock().take() {
            return Err(AdapterError::native(failure.message, failure.extended_code));
        }

        let source = Arc::new(SimulatedSource::new(location));
        self.sources.lock().push(Arc::clone(&source));
        Ok(source)
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl NativePlayer for SimulatedPlayer {
    fn set_source(&self, list: PlaybackList) -> Result<()> {
        self.record(NativeCall::SetSource { items: list.len() });

        // Match the handed-over source back to the one we built
        let current = list.items().first().and_then(|item| {
            let wanted = Arc::as_ptr(item.source()) as *const ();
            self.sources
                .lock()
                .iter()
                .find(|source| Arc::as_ptr(source) as *const () == wanted)
                .cloned()
        });

        if current.is_none() && !list.is_empty() {
            return Err(crate::internal_error!("source was not created by this engine"));
        }

        *self.current.lock() = current;
        {
            let mut session = self.session.lock();
            let rate = session.rate;
            *session = Session {
                rate,
                ..Session::default()
            };
        }
        self.pending_open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn play(&self) -> Result<()> {
        self.record(NativeCall::Play);

        if self.current_source().is_none() {
            return Ok(());
        }

        if self.pending_open.load(Ordering::SeqCst) {
            if self.playback_state() != NativePlaybackState::Opening {
                self.begin_open();
            }
            if self.auto_open.load(Ordering::SeqCst) {
                self.complete_open();
            }
            return Ok(());
        }

        self.set_state(NativePlaybackState::Playing);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.record(NativeCall::Pause);

        if matches!(
            self.playback_state(),
            NativePlaybackState::Playing | NativePlaybackState::Buffering
        ) {
            self.set_state(NativePlaybackState::Paused);
        }
        Ok(())
    }

    fn playback_state(&self) -> NativePlaybackState {
        self.session.lock().state
    }

    fn playback_rate(&self) -> f64 {
        self.session.lock().rate
    }

    fn set_playback_rate(&self, rate: f64) -> Result<()> {
        self.record(NativeCall::SetRate(rate));
        self.session.lock().rate = rate;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.session.lock().position
    }

    fn set_position(&self, position: Duration) -> Result<()> {
        self.record(NativeCall::SetPosition(position));
        self.session.lock().position = position;
        self.signals.seek_completed.emit(&());
        Ok(())
    }

    fn natural_duration(&self) -> Duration {
        self.session.lock().duration
    }

    fn buffering_progress(&self) -> f64 {
        self.session.lock().buffering
    }

    fn set_surface_size(&self, width: f64, height: f64) -> Result<()> {
        self.record(NativeCall::SetSurfaceSize(width, height));
        Ok(())
    }

    fn surface(&self, _compositor: &dyn Compositor) -> Result<CompositionSurface> {
        self.record(NativeCall::Surface);
        Ok(CompositionSurface {
            id: self.next_surface_id.fetch_add(1, Ordering::SeqCst),
        })
    }

    fn create_source_from_uri(&self, uri: &Url) -> Result<Arc<dyn NativeMediaSource>> {
        self.make_source(SourceLocation::Uri(uri.clone()))
    }

    fn create_source_from_file(&self, file: &ResolvedFile) -> Result<Arc<dyn NativeMediaSource>> {
        self.make_source(SourceLocation::File(file.clone()))
    }

    fn signals(&self) -> &PlayerSignals {
        &self.signals
    }
}

/// Compositor handing out plain visuals
#[derive(Debug, Default)]
pub struct SimulatedCompositor;

impl Compositor for SimulatedCompositor {
    fn create_sprite_visual(&self) -> SpriteVisual {
        SpriteVisual::default()
    }

    fn create_surface_brush(&self, surface: &CompositionSurface) -> SurfaceBrush {
        SurfaceBrush { surface: *surface }
    }

    fn create_container_visual(&self) -> ContainerVisual {
        ContainerVisual::default()
    }
}

/// Visual-tree element that keeps the child visual it was given
#[derive(Default)]
pub struct SimulatedHost {
    compositor: Arc<SimulatedCompositor>,
    child: Mutex<Option<ContainerVisual>>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_visual(&self) -> Option<ContainerVisual> {
        self.child.lock().clone()
    }
}

impl CompositionHost for SimulatedHost {
    fn compositor(&self) -> Arc<dyn Compositor> {
        self.compositor.clone()
    }

    fn set_child_visual(&self, visual: ContainerVisual) -> Result<()> {
        *self.child.lock() = Some(visual);
        Ok(())
    }
}
