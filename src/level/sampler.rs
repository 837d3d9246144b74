use crate::foundation::config::RenderConfig;
use crate::level::camera::Camera;
use crate::level::model::{Cell, Connection, Geo, Level};

/// Half-open cell rectangle `[x0, x1) x [y0, y1)`, already clamped to the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellWindow {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl CellWindow {
    /// Cells a camera can see, including the layer margin, clamped to the level bounds.
    pub fn for_camera(level: &Level, camera: &Camera, cfg: &RenderConfig) -> Self {
        let cell = f64::from(cfg.cell_size);
        let r = camera.window_rect(cfg);
        let x0 = (r.x0 / cell).floor() as i64;
        let y0 = (r.y0 / cell).floor() as i64;
        let x1 = (r.x1 / cell).ceil() as i64;
        let y1 = (r.y1 / cell).ceil() as i64;
        let (w, h) = (level.width() as i64, level.height() as i64);
        Self {
            x0: x0.clamp(0, w),
            y0: y0.clamp(0, h),
            x1: x1.clamp(0, w),
            y1: y1.clamp(0, h),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Row-major iteration; x advances fastest.
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> + use<> {
        let w = *self;
        (w.y0..w.y1).flat_map(move |y| (w.x0..w.x1).map(move |x| (x, y)))
    }
}

/// Read-only view over a level's terrain and connection matrices for one camera.
///
/// Lookups outside the level behave like solid rock with no connection, so border cells never
/// see a phantom opening.
#[derive(Clone, Copy)]
pub struct GeoSampler<'a> {
    level: &'a Level,
    window: CellWindow,
}

impl<'a> GeoSampler<'a> {
    pub fn new(level: &'a Level, camera: &Camera, cfg: &RenderConfig) -> Self {
        Self {
            level,
            window: CellWindow::for_camera(level, camera, cfg),
        }
    }

    pub fn level(&self) -> &'a Level {
        self.level
    }

    pub fn window(&self) -> CellWindow {
        self.window
    }

    pub fn cell(&self, x: i64, y: i64, depth: usize) -> Option<&'a Cell> {
        self.level.cell(x, y, depth)
    }

    pub fn geo(&self, x: i64, y: i64, depth: usize) -> Geo {
        self.cell(x, y, depth).map(|c| c.geo).unwrap_or(Geo::Solid)
    }

    pub fn connection(&self, x: i64, y: i64) -> Connection {
        self.level.connection(x, y)
    }

    pub fn connected(&self, x: i64, y: i64) -> bool {
        self.connection(x, y).is_connected()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/level/sampler.rs"]
mod tests;
