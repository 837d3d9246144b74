use crate::foundation::error::{StrataError, StrataResult};

pub use kurbo::{Point, Rect, Vec2};

/// Raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Create a validated, non-empty extent.
    pub fn new(width: u32, height: u32) -> StrataResult<Self> {
        if width == 0 || height == 0 {
            return Err(StrataError::validation("Extent width and height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Return `true` when signed pixel `(x, y)` lies inside `[0, width) x [0, height)`.
    pub fn contains(self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// The extent as a rectangle anchored at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// A 2D offset stored as a distance and an angle (radians, measured from +x toward +y).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PolarOffset {
    /// Length of the offset in pixels.
    pub distance: f64,
    /// Direction in radians.
    pub angle: f64,
}

impl PolarOffset {
    pub fn new(distance: f64, angle: f64) -> Self {
        Self { distance, angle }
    }

    /// Cartesian form of the offset.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::from_angle(self.angle) * self.distance
    }
}

/// A convex quadrilateral with corners in order top-left, top-right, bottom-right, bottom-left.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    /// The quad covering `rect` exactly.
    pub fn from_rect(rect: Rect) -> Self {
        Self([
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ])
    }

    pub fn corners(&self) -> [Point; 4] {
        self.0
    }

    /// Axis-aligned bounding rectangle of the four corners.
    pub fn bounding_box(&self) -> Rect {
        let [a, b, c, d] = self.0;
        Rect::from_points(a, b).union_pt(c).union_pt(d)
    }

    /// Translate every corner by `v`.
    pub fn translate(&self, v: Vec2) -> Self {
        Self(self.0.map(|p| p + v))
    }

    /// Move each corner by its own offset.
    pub fn offset_corners(&self, offsets: [Vec2; 4]) -> Self {
        let mut out = self.0;
        for (p, o) in out.iter_mut().zip(offsets) {
            *p += o;
        }
        Self(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
