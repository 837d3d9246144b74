use crate::foundation::core::Rect;
use crate::foundation::error::StrataResult;
use crate::level::defs::TileKind;
use crate::level::model::Geo;
use crate::render::palette::Shade;
use crate::render::surface::{Blend, blend_px, clip_rect, extent_of};
use crate::script::{EffectStep, ScriptCall, ScriptContext, ScriptHost};
use image::{Rgba, RgbaImage};

/// Host used when a level ships no scripts.
///
/// Box tiles become solid blocks shaped by the cell geometry, voxel tiles fill the front half of
/// their depth, per-cell effects leave intensity-sized specks on their target layers. Whole and
/// row effects, custom tiles and custom props draw nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinHost;

impl ScriptHost for BuiltinHost {
    fn invoke(&mut self, call: ScriptCall<'_>, ctx: &mut ScriptContext<'_>) -> StrataResult<()> {
        match call {
            ScriptCall::Tile {
                def, x, y, depth, ..
            } => {
                let geo = ctx.level.cell(x, y, depth).map(|c| c.geo).unwrap_or(Geo::Air);
                let spd = ctx.config.sublayers_per_depth as usize;
                let fill = match def.kind {
                    TileKind::Box => spd,
                    TileKind::VoxelStruct => spd.div_ceil(2),
                    TileKind::Custom => {
                        tracing::trace!(tile = %def.name, x, y, "custom tile has no builtin procedure");
                        0
                    }
                };
                let rect = ctx.cell_rect(x, y);
                let base = ctx.config.sublayer_base(depth);
                for s in 0..fill {
                    let shade = if s == 0 {
                        Shade::Highlight
                    } else {
                        Shade::Neutral
                    };
                    if let Some(layer) = ctx.layers.layer_mut(base + s) {
                        fill_geo(layer, rect, geo, shade.color());
                    }
                }
            }
            ScriptCall::Effect {
                instance,
                step: EffectStep::Cell(x, y),
                ..
            } => {
                let intensity = instance.intensity.get(x, y).copied().unwrap_or(0.0);
                if intensity <= 0.0 {
                    return Ok(());
                }
                let cell = ctx.cell_rect(x, y);
                let side = cell.width() * f64::from(intensity.min(1.0));
                let speck = Rect::from_center_size(cell.center(), (side, side));
                for depth in 0..ctx.config.depths as usize {
                    if !instance.targets_layer(depth) {
                        continue;
                    }
                    let base = ctx.config.sublayer_base(depth);
                    if let Some(layer) = ctx.layers.layer_mut(base) {
                        fill_geo(layer, speck, Geo::Solid, Shade::Shadow.color());
                    }
                }
            }
            ScriptCall::Effect { .. } | ScriptCall::Prop { .. } => {}
        }
        Ok(())
    }
}

/// Fill the part of `rect` covered by `geo`'s shape.
fn fill_geo(surface: &mut RgbaImage, rect: Rect, geo: Geo, color: Rgba<u8>) {
    let Some((x0, y0, x1, y1)) = clip_rect(rect, extent_of(surface)) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let lx = (f64::from(x) + 0.5 - rect.x0) / rect.width();
            let ly = (f64::from(y) + 0.5 - rect.y0) / rect.height();
            if covers(geo, lx, ly) {
                blend_px(surface.get_pixel_mut(x, y), color, Blend::Over);
            }
        }
    }
}

fn covers(geo: Geo, lx: f64, ly: f64) -> bool {
    match geo {
        Geo::Air => false,
        Geo::Solid | Geo::Glass => true,
        Geo::Platform => ly < 0.25,
        Geo::SlopeBottomRight => lx + ly >= 1.0,
        Geo::SlopeBottomLeft => ly >= lx,
        Geo::SlopeTopRight => lx >= ly,
        Geo::SlopeTopLeft => lx + ly <= 1.0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/builtin.rs"]
mod tests;
