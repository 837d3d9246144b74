use crate::foundation::core::{Point, Rect};
use crate::level::model::{Connection, Geo, Pole};
use crate::level::sampler::GeoSampler;
use crate::render::connections::{Dir, Neighbors, TracedPath, trace_all};
use crate::render::palette::Shade;
use crate::render::surface::{Blend, fill_rect};
use crate::script::ScriptContext;

/// Geometry layers that carry pole overlays.
const POLE_DEPTHS: usize = 2;

/// Draws pole overlays and connectivity paths straight from level data.
///
/// Both passes are axis-aligned fills; nothing here goes through the quad warp.
pub struct PoleRenderer {
    paths: Vec<TracedPath>,
    poles_done: bool,
    paths_done: bool,
}

impl PoleRenderer {
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            poles_done: false,
            paths_done: false,
        }
    }

    pub fn poles_done(&self) -> bool {
        self.poles_done
    }

    pub fn paths_done(&self) -> bool {
        self.paths_done
    }

    /// Paths traced by the last [`PoleRenderer::draw_connections`] call.
    pub fn paths(&self) -> &[TracedPath] {
        &self.paths
    }

    /// Draw poles for the outermost geometry layers. Returns the number of pole cells drawn.
    pub fn draw_poles(&mut self, sampler: &GeoSampler<'_>, ctx: &mut ScriptContext<'_>) -> usize {
        let thickness = pole_thickness(ctx.config.cell_size);
        let color = Shade::Neutral.color();
        let mut drawn = 0usize;
        for depth in 0..POLE_DEPTHS.min(sampler.level().depth()) {
            let sublayer = ctx.config.pole_sublayer(depth);
            for (x, y) in sampler.window().cells() {
                let Some(cell) = sampler.cell(x, y, depth) else {
                    continue;
                };
                if cell.pole == Pole::None {
                    continue;
                }
                let r = ctx.cell_rect(x, y);
                let c = r.center();
                let Some(layer) = ctx.layers.layer_mut(sublayer) else {
                    continue;
                };
                if matches!(cell.pole, Pole::Vertical | Pole::Cross) {
                    let bar = Rect::new(c.x - thickness / 2.0, r.y0, c.x + thickness / 2.0, r.y1);
                    fill_rect(layer, bar, color, Blend::Over);
                }
                if matches!(cell.pole, Pole::Horizontal | Pole::Cross) {
                    let bar = Rect::new(r.x0, c.y - thickness / 2.0, r.x1, c.y + thickness / 2.0);
                    fill_rect(layer, bar, color, Blend::Over);
                }
                drawn += 1;
            }
        }
        self.poles_done = true;
        drawn
    }

    /// Trace every entrance in the window and draw the resulting paths.
    pub fn draw_connections(
        &mut self,
        sampler: &GeoSampler<'_>,
        ctx: &mut ScriptContext<'_>,
    ) -> usize {
        self.paths = trace_all(sampler);
        for path in &self.paths {
            draw_path(sampler, ctx, path);
        }
        self.paths_done = true;
        self.paths.len()
    }
}

impl Default for PoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn pole_thickness(cell_size: u32) -> f64 {
    (f64::from(cell_size) / 5.0).round().max(1.0)
}

/// The direction an entrance leads into its path, when the surrounding geometry forms one of
/// the four recognised hood shapes: path on one side, open space opposite, solid on both flanks.
pub fn entrance_direction(sampler: &GeoSampler<'_>, (x, y): (i64, i64)) -> Option<Dir> {
    let connected = Neighbors::of((x, y), |nx, ny| sampler.connected(nx, ny));
    let open = Neighbors::of((x, y), |nx, ny| sampler.geo(nx, ny, 0).is_open());
    let solid = Neighbors::of((x, y), |nx, ny| sampler.geo(nx, ny, 0) == Geo::Solid);
    Dir::ALL.into_iter().find(|&d| {
        let (a, b) = match d {
            Dir::Up | Dir::Down => (Dir::Left, Dir::Right),
            Dir::Left | Dir::Right => (Dir::Up, Dir::Down),
        };
        connected.has(d) && open.has(d.opposite()) && solid.has(a) && solid.has(b)
    })
}

fn draw_path(sampler: &GeoSampler<'_>, ctx: &mut ScriptContext<'_>, path: &TracedPath) {
    let spd = ctx.config.sublayers_per_depth as usize;
    let arm = (f64::from(ctx.config.cell_size) / 4.0).max(1.0);
    let last = path.len().saturating_sub(1);

    for (i, &(x, y)) in path.cells.iter().enumerate() {
        let rect = ctx.cell_rect(x, y);
        if i == 0 {
            if let Some(dir) = entrance_direction(sampler, (x, y)) {
                let hood_depth = spd.div_ceil(2).max(1);
                for s in 0..hood_depth {
                    let Some(layer) = ctx.layers.layer_mut(s) else {
                        break;
                    };
                    fill_rect(layer, rect, Shade::Neutral.color(), Blend::Over);
                    fill_rect(layer, mouth(rect, dir.opposite(), arm), Shade::Neutral.color(), Blend::Erase);
                }
            }
            continue;
        }

        let pattern = Neighbors::of((x, y), |nx, ny| sampler.connected(nx, ny));
        if i == last && sampler.connection(x, y) != Connection::Entrance {
            let prev = path.cells[i - 1];
            let back = Dir::ALL.into_iter().find(|d| d.step((x, y)) == prev);
            for s in 0..2.min(spd) {
                let Some(layer) = ctx.layers.layer_mut(s) else {
                    break;
                };
                let cap = Rect::from_center_size(rect.center(), (arm * 2.0, arm * 2.0));
                fill_rect(layer, cap, Shade::Shadow.color(), Blend::Over);
                if let Some(d) = back {
                    fill_rect(layer, segment_arm(rect, d, arm), Shade::Shadow.color(), Blend::Over);
                }
            }
            continue;
        }

        for s in 0..2.min(spd) {
            let Some(layer) = ctx.layers.layer_mut(s) else {
                break;
            };
            let hub = Rect::from_center_size(rect.center(), (arm, arm));
            fill_rect(layer, hub, Shade::Shadow.color(), Blend::Over);
            for d in pattern.dirs() {
                fill_rect(layer, segment_arm(rect, d, arm), Shade::Shadow.color(), Blend::Over);
            }
        }
    }
}

/// A bar of width `arm` from the cell centre to its edge in direction `d`.
fn segment_arm(cell: Rect, d: Dir, arm: f64) -> Rect {
    let c = cell.center();
    let h = arm / 2.0;
    match d {
        Dir::Up => Rect::new(c.x - h, cell.y0, c.x + h, c.y + h),
        Dir::Down => Rect::new(c.x - h, c.y - h, c.x + h, cell.y1),
        Dir::Left => Rect::new(cell.x0, c.y - h, c.x + h, c.y + h),
        Dir::Right => Rect::new(c.x - h, c.y - h, cell.x1, c.y + h),
    }
}

/// The opening of an entrance hood, facing `toward`.
fn mouth(cell: Rect, toward: Dir, arm: f64) -> Rect {
    let c: Point = cell.center();
    let h = arm;
    match toward {
        Dir::Up => Rect::new(c.x - h, cell.y0, c.x + h, c.y),
        Dir::Down => Rect::new(c.x - h, c.y, c.x + h, cell.y1),
        Dir::Left => Rect::new(cell.x0, c.y - h, c.x, c.y + h),
        Dir::Right => Rect::new(c.x, c.y - h, cell.x1, c.y + h),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/poles.rs"]
mod tests;
