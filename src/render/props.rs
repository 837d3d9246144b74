use crate::foundation::config::RenderConfig;
use crate::foundation::core::{Extent, Quad, Vec2};
use crate::foundation::error::StrataResult;
use crate::level::camera::Camera;
use crate::level::defs::{PropDef, PropKind, SoftShading};
use crate::level::model::{Level, PropInstance};
use crate::render::palette::Shade;
use crate::render::quad::{TextureRegion, warp_texture};
use crate::render::stack::LayerStack;
use crate::render::surface::{Blend, is_opaque, new_surface, stamp};
use crate::script::{ScriptCall, ScriptContext, ScriptHost};
use image::{Rgba, RgbaImage};

/// Maximum props rendered per [`PropRenderer::next`] call.
pub const PROP_BUDGET: usize = 30;

/// Sample radii of the soft shading pass.
const SOFT_RADII: [i64; 3] = [1, 2, 3];

const SOFT_DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Renders the props visible to one camera, in level order.
pub struct PropRenderer {
    visible: Vec<usize>,
    cursor: usize,
}

impl PropRenderer {
    /// Cull to props whose bounds intersect the camera window grown by the margin.
    pub fn new(level: &Level, camera: &Camera, cfg: &RenderConfig) -> Self {
        let window = camera.window_rect(cfg);
        let visible = level
            .props
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                let hit = p.quad.bounding_box().intersect(window);
                hit.width() > 0.0 && hit.height() > 0.0
            })
            .map(|(i, _)| i)
            .collect();
        Self { visible, cursor: 0 }
    }

    /// Indices into `Level::props` that survived culling.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.visible.len()
    }

    /// Render up to [`PROP_BUDGET`] props. Returns the number consumed.
    pub fn next(
        &mut self,
        host: &mut dyn ScriptHost,
        ctx: &mut ScriptContext<'_>,
    ) -> StrataResult<usize> {
        let (level, defs) = (ctx.level, ctx.defs);
        let end = (self.cursor + PROP_BUDGET).min(self.visible.len());
        for &index in &self.visible[self.cursor..end] {
            let Some(instance) = level.props.get(index) else {
                continue;
            };
            let def = defs.prop(instance.prop)?;
            render_prop(index, instance, def, host, ctx)?;
        }
        let consumed = end - self.cursor;
        self.cursor = end;
        Ok(consumed)
    }
}

fn render_prop(
    index: usize,
    instance: &PropInstance,
    def: &PropDef,
    host: &mut dyn ScriptHost,
    ctx: &mut ScriptContext<'_>,
) -> StrataResult<()> {
    if instance.depth >= ctx.layers.len() {
        tracing::debug!(
            prop = %def.name,
            index,
            depth = instance.depth,
            layers = ctx.layers.len(),
            "prop depth outside the layer stack; skipped"
        );
        return Ok(());
    }
    let quad = instance.quad.translate(ctx.layer_origin());
    match &def.kind {
        PropKind::VoxelStruct { slice, repeat } => {
            draw_voxel(ctx.layers, def, *slice, repeat, &quad, instance.depth);
        }
        PropKind::Soft { shading } => {
            if let Some((buffer, ox, oy)) = warp_to_buffer(def, &quad, ctx.layers.extent()) {
                let shaded = shade_soft(&buffer, shading);
                stamp_range(ctx.layers, &shaded, (ox, oy), instance, Blend::Over);
            }
        }
        PropKind::Antimatter => {
            if let Some((buffer, ox, oy)) = warp_to_buffer(def, &quad, ctx.layers.extent()) {
                stamp_range(ctx.layers, &buffer, (ox, oy), instance, Blend::Erase);
            }
        }
        PropKind::Custom => {
            host.invoke(
                ScriptCall::Prop {
                    index,
                    instance,
                    def,
                },
                ctx,
            )?;
        }
    }
    tracing::trace!(prop = %def.name, index, kind = def.kind.name(), "prop rendered");
    Ok(())
}

/// Warp each slice into `depth + sum(repeat[..i]) + r` for `r < repeat[i]`.
fn draw_voxel(
    layers: &mut LayerStack,
    def: &PropDef,
    slice: Extent,
    repeat: &[u32],
    quad: &Quad,
    depth: usize,
) {
    let mut sublayer = depth;
    for (i, &count) in repeat.iter().enumerate().take(def.slice_count()) {
        let region = TextureRegion {
            image: &def.image,
            x: 0,
            y: i as u32 * slice.height,
            width: slice.width.min(def.image.width()),
            height: slice.height,
        };
        for _ in 0..count {
            let Some(layer) = layers.layer_mut(sublayer) else {
                return;
            };
            warp_texture(layer, region, quad, Blend::Over);
            sublayer += 1;
        }
    }
}

/// Warp the prop image into a buffer sized to the quad's full bounding box. Returns the buffer
/// and its top-left in layer pixels, or `None` when the box misses the layer surface.
fn warp_to_buffer(def: &PropDef, quad: &Quad, extent: Extent) -> Option<(RgbaImage, i64, i64)> {
    let bounds = quad.bounding_box();
    let visible = bounds.intersect(extent.to_rect());
    if visible.width() <= 0.0 || visible.height() <= 0.0 {
        return None;
    }
    let (x0, y0) = (bounds.x0.floor(), bounds.y0.floor());
    let w = (bounds.x1.ceil() - x0) as u32;
    let h = (bounds.y1.ceil() - y0) as u32;
    if w == 0 || h == 0 {
        return None;
    }
    let mut buffer = new_surface(Extent {
        width: w,
        height: h,
    });
    warp_texture(
        &mut buffer,
        TextureRegion::whole(&def.image),
        &quad.translate(Vec2::new(-x0, -y0)),
        Blend::Over,
    );
    Some((buffer, x0 as i64, y0 as i64))
}

fn stamp_range(
    layers: &mut LayerStack,
    src: &RgbaImage,
    (ox, oy): (i64, i64),
    instance: &PropInstance,
    blend: Blend,
) {
    let end = instance.depth.saturating_add(instance.extrude.max(1));
    for sublayer in instance.depth..end {
        let Some(layer) = layers.layer_mut(sublayer) else {
            break;
        };
        stamp(layer, src, ox, oy, blend);
    }
}

/// Brightness of the source pixel as a height in `[0, 1]`; transparent pixels are height 0.
fn height_at(src: &RgbaImage, x: i64, y: i64) -> f64 {
    if x < 0 || y < 0 {
        return 0.0;
    }
    match src.get_pixel_checked(x as u32, y as u32) {
        Some(px) if is_opaque(px) => {
            let [r, g, b, _] = px.0;
            (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
        }
        _ => 0.0,
    }
}

/// Classify every opaque pixel of a warped soft prop by its height slope toward the light.
pub(crate) fn shade_soft(src: &RgbaImage, shading: &SoftShading) -> RgbaImage {
    let light = Vec2::from_angle(shading.light_angle);
    let taps: Vec<(i64, i64, f64)> = SOFT_DIRECTIONS
        .iter()
        .filter_map(|&(dx, dy)| {
            let w = Vec2::new(dx as f64, dy as f64).normalize().dot(light);
            (w.abs() > 1e-6).then_some((dx, dy, w))
        })
        .collect();
    let total: f64 = taps.iter().map(|t| t.2.abs()).sum::<f64>() * SOFT_RADII.len() as f64;

    let mut out = RgbaImage::new(src.width(), src.height());
    for (x, y, px) in src.enumerate_pixels() {
        if !is_opaque(px) {
            continue;
        }
        let (x, y) = (i64::from(x), i64::from(y));
        let h0 = height_at(src, x, y);
        let mut slope = 0.0;
        for &(dx, dy, w) in &taps {
            for r in SOFT_RADII {
                slope += (height_at(src, x + dx * r, y + dy * r) - h0) * w / r as f64;
            }
        }
        if total > 0.0 {
            slope /= total;
        }
        let shade = if slope > f64::from(shading.highlight) {
            Shade::Highlight
        } else if slope < -f64::from(shading.shadow) {
            Shade::Shadow
        } else {
            Shade::Neutral
        };
        let Rgba([r, g, b, _]) = shade.color();
        out.put_pixel(x as u32, y as u32, Rgba([r, g, b, px.0[3]]));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/props.rs"]
mod tests;
