//! Software raster primitives shared by every sub-renderer.
//!
//! Surfaces are straight-alpha RGBA8 (`image::RgbaImage`). Drawing goes through [`Blend`] so the
//! erasing blend used by antimatter props is a blend-factor override, not a colour convention.

use crate::foundation::core::{Extent, Rect};
use crate::foundation::math::mul_div255_u8;
use image::{Rgba, RgbaImage};

/// Per-draw blend override.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    /// Source over destination.
    Over,
    /// Subtract source alpha from destination alpha.
    Erase,
}

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

pub fn new_surface(extent: Extent) -> RgbaImage {
    RgbaImage::new(extent.width, extent.height)
}

pub fn extent_of(surface: &RgbaImage) -> Extent {
    Extent {
        width: surface.width(),
        height: surface.height(),
    }
}

pub fn clear(surface: &mut RgbaImage) {
    for px in surface.pixels_mut() {
        *px = TRANSPARENT;
    }
}

pub fn is_opaque(px: &Rgba<u8>) -> bool {
    px.0[3] != 0
}

/// Blend one source pixel into `dst`.
pub fn blend_px(dst: &mut Rgba<u8>, src: Rgba<u8>, blend: Blend) {
    let sa = src.0[3];
    if sa == 0 {
        return;
    }
    match blend {
        Blend::Over => {
            if sa == 255 {
                *dst = src;
                return;
            }
            let da = dst.0[3];
            let inv = 255 - u16::from(sa);
            let dst_w = mul_div255_u8(u16::from(da), inv);
            let out_a = u16::from(sa) + u16::from(dst_w);
            if out_a == 0 {
                *dst = TRANSPARENT;
                return;
            }
            let mut out = [0u8; 4];
            for i in 0..3 {
                let c = u32::from(src.0[i]) * u32::from(sa) + u32::from(dst.0[i]) * u32::from(dst_w);
                out[i] = ((c + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8;
            }
            out[3] = out_a.min(255) as u8;
            *dst = Rgba(out);
        }
        Blend::Erase => {
            let a = dst.0[3].saturating_sub(sa);
            if a == 0 {
                *dst = TRANSPARENT;
            } else {
                dst.0[3] = a;
            }
        }
    }
}

/// Integer pixel bounds of `rect`, clipped to `extent`. `None` when nothing remains.
pub fn clip_rect(rect: Rect, extent: Extent) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.x0.floor().max(0.0);
    let y0 = rect.y0.floor().max(0.0);
    let x1 = rect.x1.ceil().min(f64::from(extent.width));
    let y1 = rect.y1.ceil().min(f64::from(extent.height));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Fill an axis-aligned rectangle given in surface pixels.
pub fn fill_rect(surface: &mut RgbaImage, rect: Rect, color: Rgba<u8>, blend: Blend) {
    let Some((x0, y0, x1, y1)) = clip_rect(rect, extent_of(surface)) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            blend_px(surface.get_pixel_mut(x, y), color, blend);
        }
    }
}

/// Blend all of `src` into `dst` with its top-left at `(at_x, at_y)`.
pub fn stamp(dst: &mut RgbaImage, src: &RgbaImage, at_x: i64, at_y: i64, blend: Blend) {
    let e = extent_of(dst);
    for (sx, sy, px) in src.enumerate_pixels() {
        let dx = at_x + i64::from(sx);
        let dy = at_y + i64::from(sy);
        if !e.contains(dx, dy) {
            continue;
        }
        blend_px(dst.get_pixel_mut(dx as u32, dy as u32), *px, blend);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
