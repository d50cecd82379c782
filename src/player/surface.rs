//! Video surface binding
//!
//! A [`RenderTarget`] is anything a caller may hand to `set_video_surface`.
//! Only targets that expose a composition host can display native video;
//! [`VideoSurface`] is the platform's one such target.

use crate::native::{CompositionHost, NativePlayer};
use crate::utils::error::{AdapterError, Result};
use log::debug;
use std::sync::Arc;

/// Rendering surface offered by the caller
pub trait RenderTarget: Send + Sync {
    /// Laid-out size in device-independent pixels
    fn actual_size(&self) -> (f64, f64);

    /// Visual-tree element able to host native video, if any
    fn composition_host(&self) -> Option<&dyn CompositionHost> {
        None
    }
}

/// Platform video surface element
pub struct VideoSurface {
    host: Arc<dyn CompositionHost>,
    width: f64,
    height: f64,
}

impl VideoSurface {
    pub fn new(host: Arc<dyn CompositionHost>, width: f64, height: f64) -> Self {
        Self { host, width, height }
    }
}

impl RenderTarget for VideoSurface {
    fn actual_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn composition_host(&self) -> Option<&dyn CompositionHost> {
        Some(self.host.as_ref())
    }
}

/// Attach the native video output to `target`'s visual tree.
///
/// The output is painted by a sprite sized to the target, placed on top of
/// a fresh container that replaces the target's child visual.
pub fn bind_video_surface(native: &dyn NativePlayer, target: &dyn RenderTarget) -> Result<()> {
    let host = target.composition_host().ok_or_else(|| {
        AdapterError::InvalidSurface("target cannot host native video".to_string())
    })?;

    let (width, height) = target.actual_size();
    native.set_surface_size(width, height)?;

    let compositor = host.compositor();
    let surface = native.surface(compositor.as_ref())?;

    let mut sprite = compositor.create_sprite_visual();
    sprite.size = [width as f32, height as f32];
    sprite.brush = Some(compositor.create_surface_brush(&surface));

    let mut container = compositor.create_container_visual();
    container.insert_at_top(sprite);

    host.set_child_visual(container)?;
    debug!("Bound video output to {}x{} surface", width, height);
    Ok(())
}
