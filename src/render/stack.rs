use crate::foundation::config::RenderConfig;
use crate::foundation::core::Extent;
use crate::render::surface::{clear, new_surface};
use image::RgbaImage;

/// The shared array of transparent layer surfaces, `depths x sublayers_per_depth` long.
///
/// Index 0 is the nearest sublayer. Surfaces are owned here and released when the stack drops.
pub struct LayerStack {
    extent: Extent,
    layers: Vec<RgbaImage>,
}

impl LayerStack {
    pub fn new(cfg: &RenderConfig) -> Self {
        let extent = cfg.layer_extent();
        Self {
            extent,
            layers: (0..cfg.layer_count()).map(|_| new_surface(extent)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn layer(&self, index: usize) -> Option<&RgbaImage> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut RgbaImage> {
        self.layers.get_mut(index)
    }

    pub fn layers(&self) -> &[RgbaImage] {
        &self.layers
    }

    /// Reset every surface to fully transparent.
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            clear(layer);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/stack.rs"]
mod tests;
