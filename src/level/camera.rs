use crate::foundation::config::RenderConfig;
use crate::foundation::core::{Point, PolarOffset, Quad, Rect, Vec2};

/// Corner order used by [`Camera::corners`] and every quad in the crate.
pub const CORNER_TOP_LEFT: usize = 0;
pub const CORNER_TOP_RIGHT: usize = 1;
pub const CORNER_BOTTOM_RIGHT: usize = 2;
pub const CORNER_BOTTOM_LEFT: usize = 3;

/// A fixed-size capture window plus four deformable corner offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    /// Top-left of the capture window in level pixels.
    pub position: Point,
    /// Corner offsets, top-left, top-right, bottom-right, bottom-left.
    #[serde(default)]
    pub corners: [PolarOffset; 4],
}

impl Camera {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            corners: [PolarOffset::default(); 4],
        }
    }

    /// Corner offsets as vectors.
    pub fn corner_vectors(&self) -> [Vec2; 4] {
        self.corners.map(PolarOffset::to_vec2)
    }

    /// Capture window in level pixels.
    pub fn capture_rect(&self, cfg: &RenderConfig) -> Rect {
        let e = cfg.capture_extent();
        Rect::from_origin_size(self.position, (f64::from(e.width), f64::from(e.height)))
    }

    /// Capture window grown by the layer margin on every side.
    pub fn window_rect(&self, cfg: &RenderConfig) -> Rect {
        self.capture_rect(cfg).inflate(f64::from(cfg.margin_px()), f64::from(cfg.margin_px()))
    }

    /// Offset that maps level pixels into layer-surface pixels.
    pub fn layer_origin(&self, cfg: &RenderConfig) -> Vec2 {
        let m = f64::from(cfg.margin_px());
        Vec2::new(m - self.position.x, m - self.position.y)
    }

    /// Per-layer warp quad in output-raster pixels.
    ///
    /// The undistorted quad covers the layer surface (capture plus margin) so that a camera with
    /// zero corner offsets maps every layer pixel 1:1 onto the output.
    pub fn layer_quad(&self, cfg: &RenderConfig, fraction: f64) -> Quad {
        let m = f64::from(cfg.margin_px());
        let e = cfg.capture_extent();
        let base = Quad::from_rect(Rect::new(
            -m,
            -m,
            f64::from(e.width) + m,
            f64::from(e.height) + m,
        ));
        base.offset_corners(self.corner_vectors().map(|v| v * fraction))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/level/camera.rs"]
mod tests;
