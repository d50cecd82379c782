//! Native state translation
//!
//! Maps the native session's playback states and the current source's
//! states onto [`MediaPlayerStatus`] plus what the progress poller should do.
//! The functions here are pure; the adapter wires them to native signals.

use crate::native::{NativePlaybackState, NativeSourceState, SessionSnapshot};
use crate::player::MediaPlayerStatus;
use crate::utils::error::{AdapterError, Result};
use std::time::Duration;

/// What to do with the progress poller after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerAction {
    Arm,
    Disarm,
    Keep,
}

/// Outcome of a native notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    /// Status to assign, if any
    pub status: Option<MediaPlayerStatus>,
    pub poller: PollerAction,
}

impl StatusTransition {
    fn new(status: Option<MediaPlayerStatus>, poller: PollerAction) -> Self {
        Self { status, poller }
    }
}

/// Translate a playback-state-changed notification
pub fn translate_playback_state(snapshot: &SessionSnapshot) -> Result<StatusTransition> {
    let transition = match snapshot.state {
        NativePlaybackState::None => StatusTransition::new(None, PollerAction::Disarm),
        NativePlaybackState::Opening => {
            StatusTransition::new(Some(MediaPlayerStatus::Loading), PollerAction::Disarm)
        }
        NativePlaybackState::Buffering => {
            StatusTransition::new(Some(MediaPlayerStatus::Buffering), PollerAction::Disarm)
        }
        // A stopped session still reports Playing, with zero rate at the origin
        NativePlaybackState::Playing
            if snapshot.rate <= 0.0 && snapshot.position == Duration::ZERO =>
        {
            StatusTransition::new(Some(MediaPlayerStatus::Stopped), PollerAction::Keep)
        }
        NativePlaybackState::Playing => {
            StatusTransition::new(Some(MediaPlayerStatus::Playing), PollerAction::Arm)
        }
        NativePlaybackState::Paused => {
            StatusTransition::new(Some(MediaPlayerStatus::Paused), PollerAction::Disarm)
        }
        NativePlaybackState::Unknown(raw) => return Err(AdapterError::InvalidState(raw)),
    };

    Ok(transition)
}

/// Translate the current source's state-changed notification
pub fn translate_source_state(state: NativeSourceState) -> Result<Option<MediaPlayerStatus>> {
    match state {
        NativeSourceState::Initial | NativeSourceState::Opening => {
            Ok(Some(MediaPlayerStatus::Loading))
        }
        NativeSourceState::Failed => Ok(Some(MediaPlayerStatus::Failed)),
        NativeSourceState::Closed => Ok(Some(MediaPlayerStatus::Stopped)),
        NativeSourceState::Opened => Ok(None),
        NativeSourceState::Unknown(raw) => Err(AdapterError::InvalidState(raw)),
    }
}

/// Transition applied on media-failed and on unrecognised states
pub fn failure_transition() -> StatusTransition {
    StatusTransition::new(Some(MediaPlayerStatus::Failed), PollerAction::Disarm)
}
