//! Quad-warp rasterization.
//!
//! A rectangular source texture is mapped onto an arbitrary convex quad by solving, for every
//! destination pixel centre, the inverse of the bilinear patch spanned by the quad corners.

use crate::foundation::core::{Extent, Point, Quad};
use crate::foundation::math::cross;
use crate::render::surface::{Blend, blend_px, clip_rect, extent_of};
use image::{Rgba, RgbaImage};

const UV_EPS: f64 = 1e-9;

/// Recover unit-square coordinates `(u, v)` of `p` inside `quad`.
///
/// The quad is the bilinear patch `a + e*u + f*v + g*u*v` with corners
/// `a = (0,0)`, `b = (1,0)`, `c = (1,1)`, `d = (0,1)`. Returns `None` when `p` lies outside
/// `[0, 1]^2`.
pub fn inverse_bilinear(quad: &Quad, p: Point) -> Option<(f64, f64)> {
    let [a, b, c, d] = quad.corners();
    let e = b - a;
    let f = d - a;
    let g = (a - b) + (c - d);
    let h = p - a;

    let k2 = cross(g, f);
    let k1 = cross(e, f) + cross(h, g);
    let k0 = cross(h, e);

    let disc = k1 * k1 - 4.0 * k0 * k2;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let q = -0.5 * (k1 + sq.copysign(k1));

    let mut roots = [f64::NAN; 2];
    if q != 0.0 {
        roots[0] = k0 / q;
    }
    if k2 != 0.0 {
        roots[1] = q / k2;
    }

    for v in roots {
        if !(-UV_EPS..=1.0 + UV_EPS).contains(&v) {
            continue;
        }
        let dx = e.x + g.x * v;
        let dy = e.y + g.y * v;
        let u = if dx.abs() >= dy.abs() {
            if dx == 0.0 {
                continue;
            }
            (h.x - f.x * v) / dx
        } else {
            (h.y - f.y * v) / dy
        };
        if (-UV_EPS..=1.0 + UV_EPS).contains(&u) {
            return Some((u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)));
        }
    }
    None
}

/// A rectangular region of a texture.
#[derive(Clone, Copy)]
pub struct TextureRegion<'a> {
    pub image: &'a RgbaImage,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl<'a> TextureRegion<'a> {
    pub fn whole(image: &'a RgbaImage) -> Self {
        Self {
            image,
            x: 0,
            y: 0,
            width: image.width(),
            height: image.height(),
        }
    }

    /// Texel coordinates for unit-square `(u, v)`, nearest sampling.
    pub fn texel(&self, u: f64, v: f64) -> (u32, u32) {
        let tx = ((u * f64::from(self.width)).floor() as u32).min(self.width.saturating_sub(1));
        let ty = ((v * f64::from(self.height)).floor() as u32).min(self.height.saturating_sub(1));
        (self.x + tx, self.y + ty)
    }

    pub fn sample(&self, u: f64, v: f64) -> Rgba<u8> {
        let (x, y) = self.texel(u, v);
        *self.image.get_pixel(x, y)
    }
}

/// Visit every destination pixel whose centre falls inside `quad`, with its `(u, v)`.
pub fn rasterize_quad(dst: Extent, quad: &Quad, mut shade: impl FnMut(u32, u32, f64, f64)) {
    let Some((x0, y0, x1, y1)) = clip_rect(quad.bounding_box(), dst) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if let Some((u, v)) = inverse_bilinear(quad, p) {
                shade(x, y, u, v);
            }
        }
    }
}

/// Warp `src` onto `dst` through `quad` (destination pixels), blending with `blend`.
pub fn warp_texture(dst: &mut RgbaImage, src: TextureRegion<'_>, quad: &Quad, blend: Blend) {
    if src.width == 0 || src.height == 0 {
        return;
    }
    let extent = extent_of(dst);
    rasterize_quad(extent, quad, |x, y, u, v| {
        let px = src.sample(u, v);
        blend_px(dst.get_pixel_mut(x, y), px, blend);
    });
}

#[cfg(test)]
#[path = "../../tests/unit/render/quad.rs"]
mod tests;
