//! mediabridge - native media-engine backend for a cross-platform video player
//!
//! The crate adapts a platform media engine ([`native::NativePlayer`]) to the
//! [`player::VideoPlayer`] interface: commands go straight to the engine,
//! and engine notifications become a small status/event vocabulary.

pub mod native;
pub mod player;
pub mod utils;

pub use player::{
    MediaFile, MediaFileType, MediaPlayerStatus, NativeVideoPlayer, PlayerEvent,
    PlayerEventHandler, VideoPlayer, VideoPlayerBuilder,
};
pub use utils::{AdapterError, Config, Result};
