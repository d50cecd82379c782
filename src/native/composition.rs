//! Platform composition (visual tree) primitives

use crate::utils::error::Result;
use std::sync::Arc;

/// Native video output wrapped for the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionSurface {
    pub id: u64,
}

/// Brush painting a composition surface
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceBrush {
    pub surface: CompositionSurface,
}

/// Visual drawing a single brush
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpriteVisual {
    pub size: [f32; 2],
    pub brush: Option<SurfaceBrush>,
}

/// Visual grouping child sprites; the last child is drawn on top
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerVisual {
    children: Vec<SpriteVisual>,
}

impl ContainerVisual {
    pub fn insert_at_top(&mut self, visual: SpriteVisual) {
        self.children.push(visual);
    }

    pub fn children(&self) -> &[SpriteVisual] {
        &self.children
    }
}

/// Factory for visuals and brushes
pub trait Compositor: Send + Sync {
    fn create_sprite_visual(&self) -> SpriteVisual;

    fn create_surface_brush(&self, surface: &CompositionSurface) -> SurfaceBrush;

    fn create_container_visual(&self) -> ContainerVisual;
}

/// Element of the platform visual tree that accepts a child visual
pub trait CompositionHost: Send + Sync {
    fn compositor(&self) -> Arc<dyn Compositor>;

    fn set_child_visual(&self, visual: ContainerVisual) -> Result<()>;
}
