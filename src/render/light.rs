//! Directional light and shadow projection.
//!
//! Layers are walked nearest first. Each layer's silhouette is exposed wherever the accumulated
//! silhouette of everything in front of it (plus the painted lightmap) does not reach, and is
//! then smeared into the accumulation buffer along the light direction.

use crate::foundation::config::RenderConfig;
use crate::foundation::core::Vec2;
use crate::level::camera::Camera;
use crate::level::model::Level;
use crate::render::stack::LayerStack;
use crate::render::surface::is_opaque;
use image::{GrayImage, Luma};

/// Exposure value for a sunlit pixel.
pub const SUNLIT: u8 = 255;

pub struct LightRenderer {
    direction: Vec2,
    distance: f64,
    next_layer: usize,
    layer_count: usize,
    accumulated: GrayImage,
    exposure: GrayImage,
    /// Pixels already decided by a nearer layer.
    claimed: Vec<bool>,
}

impl LightRenderer {
    pub fn new(level: &Level, camera: &Camera, cfg: &RenderConfig) -> Self {
        let extent = cfg.layer_extent();
        Self {
            direction: Vec2::from_angle(level.light.angle),
            distance: level.light.distance,
            next_layer: 0,
            layer_count: cfg.layer_count(),
            accumulated: seed_from_lightmap(level, camera, cfg),
            exposure: GrayImage::new(extent.width, extent.height),
            claimed: vec![false; extent.area()],
        }
    }

    pub fn is_done(&self) -> bool {
        self.next_layer >= self.layer_count
    }

    /// Shadow offset applied to the silhouette of stack layer `k`.
    pub fn offset_for(&self, k: usize) -> Vec2 {
        self.direction * (k as f64 + self.distance)
    }

    /// Per-pixel exposure; [`SUNLIT`] where the frontmost opaque layer receives light.
    pub fn exposure(&self) -> &GrayImage {
        &self.exposure
    }

    /// Process the next stack layer. Returns the index processed.
    pub fn next(&mut self, stack: &LayerStack) -> Option<usize> {
        if self.is_done() {
            return None;
        }
        let k = self.next_layer;
        self.next_layer += 1;
        let Some(layer) = stack.layer(k) else {
            return Some(k);
        };

        let width = self.exposure.width();
        let offset = self.offset_for(k);
        let (dx, dy) = (offset.x.round() as i64, offset.y.round() as i64);
        let mut cast = Vec::new();
        for (x, y, px) in layer.enumerate_pixels() {
            if !is_opaque(px) {
                continue;
            }
            let i = (y * width + x) as usize;
            if let Some(claimed) = self.claimed.get_mut(i)
                && !*claimed
            {
                *claimed = true;
                if self.accumulated.get_pixel_checked(x, y).is_some_and(|a| a.0[0] == 0) {
                    self.exposure.put_pixel(x, y, Luma([SUNLIT]));
                }
            }
            cast.push((i64::from(x) + dx, i64::from(y) + dy));
        }
        for (x, y) in cast {
            if x < 0 || y < 0 {
                continue;
            }
            if let Some(a) = self.accumulated.get_pixel_mut_checked(x as u32, y as u32) {
                a.0[0] = 255;
            }
        }
        tracing::trace!(layer = k, dx, dy, "light layer projected");
        Some(k)
    }
}

/// The level lightmap, stretched over the whole level, cropped to the camera's layer window.
fn seed_from_lightmap(level: &Level, camera: &Camera, cfg: &RenderConfig) -> GrayImage {
    let extent = cfg.layer_extent();
    let mut out = GrayImage::new(extent.width, extent.height);
    let Some(map) = level.lightmap.as_ref() else {
        return out;
    };
    let cell = f64::from(cfg.cell_size);
    let level_w = level.width() as f64 * cell;
    let level_h = level.height() as f64 * cell;
    if map.width() == 0 || map.height() == 0 || level_w <= 0.0 || level_h <= 0.0 {
        return out;
    }
    let origin = camera.layer_origin(cfg);
    let sx = f64::from(map.width()) / level_w;
    let sy = f64::from(map.height()) / level_h;
    for (x, y, px) in out.enumerate_pixels_mut() {
        let lx = f64::from(x) + 0.5 - origin.x;
        let ly = f64::from(y) + 0.5 - origin.y;
        if lx < 0.0 || ly < 0.0 || lx >= level_w || ly >= level_h {
            continue;
        }
        let mx = ((lx * sx) as u32).min(map.width() - 1);
        let my = ((ly * sy) as u32).min(map.height() - 1);
        if map.get_pixel(mx, my).0[0] > 0 {
            px.0[0] = 255;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/light.rs"]
mod tests;
