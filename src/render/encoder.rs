//! Packing of the layer stack into one raster per camera.
//!
//! Every output pixel carries the frontmost opaque layer under it: `R` is the stack index,
//! `G` the palette value (see [`Shade`]), `B` whether the light reached it. `A` is 255 wherever
//! any layer is opaque and 0 elsewhere.

use crate::foundation::config::{MAX_LAYERS, RenderConfig};
use crate::foundation::error::{StrataError, StrataResult};
use crate::level::camera::Camera;
use crate::render::light::SUNLIT;
use crate::render::palette::Shade;
use crate::render::quad::{TextureRegion, rasterize_quad};
use crate::render::stack::LayerStack;
use crate::render::surface::{extent_of, is_opaque, new_surface};
use image::{GrayImage, Rgba, RgbaImage};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EncodedPixel {
    pub layer: u8,
    pub value: u8,
    pub sunlit: bool,
}

impl EncodedPixel {
    pub fn pack(self) -> Rgba<u8> {
        Rgba([self.layer, self.value, if self.sunlit { 255 } else { 0 }, 255])
    }

    /// Decode a packed pixel; `None` where nothing was drawn.
    pub fn unpack(px: &Rgba<u8>) -> Option<Self> {
        let [r, g, b, a] = px.0;
        (a != 0).then_some(Self {
            layer: r,
            value: g,
            sunlit: b >= 128,
        })
    }
}

/// The packed raster of one camera pass.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraRender {
    pub camera_index: usize,
    pub raster: RgbaImage,
}

impl CameraRender {
    pub fn pixel(&self, x: u32, y: u32) -> Option<EncodedPixel> {
        self.raster
            .get_pixel_checked(x, y)
            .and_then(EncodedPixel::unpack)
    }
}

/// Warp every layer back-to-front through the camera's per-layer quad and pack the result.
#[tracing::instrument(skip_all, fields(layers = stack.len()))]
pub fn encode_camera(
    stack: &LayerStack,
    exposure: &GrayImage,
    camera: &Camera,
    cfg: &RenderConfig,
) -> StrataResult<RgbaImage> {
    if stack.len() > MAX_LAYERS {
        return Err(StrataError::render(format!(
            "{} layers do not fit the 8-bit layer channel",
            stack.len()
        )));
    }
    let mut out = new_surface(cfg.capture_extent());
    let extent = extent_of(&out);
    let count = stack.len() as f64;
    for (i, layer) in stack.layers().iter().enumerate().rev() {
        let quad = camera.layer_quad(cfg, i as f64 / count);
        let region = TextureRegion::whole(layer);
        let index = i as u8;
        rasterize_quad(extent, &quad, |x, y, u, v| {
            let (sx, sy) = region.texel(u, v);
            let px = layer.get_pixel(sx, sy);
            if !is_opaque(px) {
                return;
            }
            let sunlit = exposure
                .get_pixel_checked(sx, sy)
                .is_some_and(|l| l.0[0] == SUNLIT);
            let packed = EncodedPixel {
                layer: index,
                value: Shade::classify(px).value(),
                sunlit,
            };
            out.put_pixel(x, y, packed.pack());
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/encoder.rs"]
mod tests;
