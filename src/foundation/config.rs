use crate::foundation::core::Extent;
use crate::foundation::error::{StrataError, StrataResult};

/// Geometry of one render pass.
///
/// Everything is expressed in level cells and converted to pixels through `cell_size`, so a
/// small config (a few pixels per cell) renders the same level at a fraction of the memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pixels per level cell.
    pub cell_size: u32,
    /// Camera capture width in cells.
    pub capture_width_cells: u32,
    /// Camera capture height in cells.
    pub capture_height_cells: u32,
    /// Extra cells rendered on every side of the capture window.
    pub margin_cells: u32,
    /// Number of depth slots in the layer stack.
    pub depths: u32,
    /// Sublayers per depth slot.
    pub sublayers_per_depth: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: 20,
            capture_width_cells: 70,
            capture_height_cells: 40,
            margin_cells: 5,
            depths: 5,
            sublayers_per_depth: 10,
        }
    }
}

/// Layers addressable by the 8-bit layer channel of a packed pixel.
pub const MAX_LAYERS: usize = u8::MAX as usize + 1;

impl RenderConfig {
    pub fn validate(&self) -> StrataResult<()> {
        if self.cell_size == 0 {
            return Err(StrataError::validation("cell_size must be > 0"));
        }
        if self.capture_width_cells == 0 || self.capture_height_cells == 0 {
            return Err(StrataError::validation("capture size must be > 0 cells"));
        }
        if self.depths == 0 || self.sublayers_per_depth == 0 {
            return Err(StrataError::validation(
                "layer stack needs at least one depth and one sublayer",
            ));
        }
        let layers = (self.depths as usize).checked_mul(self.sublayers_per_depth as usize);
        if layers.is_none_or(|n| n > MAX_LAYERS) {
            return Err(StrataError::validation(format!(
                "{} x {} layers exceed the {MAX_LAYERS} the packed layer channel can index",
                self.depths, self.sublayers_per_depth
            )));
        }
        let layer_w = self
            .capture_width_cells
            .checked_add(self.margin_cells.saturating_mul(2))
            .and_then(|c| c.checked_mul(self.cell_size));
        let layer_h = self
            .capture_height_cells
            .checked_add(self.margin_cells.saturating_mul(2))
            .and_then(|c| c.checked_mul(self.cell_size));
        if layer_w.is_none() || layer_h.is_none() {
            return Err(StrataError::validation("layer size overflows u32"));
        }
        Ok(())
    }

    /// Size of the packed output raster (capture window, no margin).
    pub fn capture_extent(&self) -> Extent {
        Extent {
            width: self.capture_width_cells * self.cell_size,
            height: self.capture_height_cells * self.cell_size,
        }
    }

    /// Margin width in pixels.
    pub fn margin_px(&self) -> u32 {
        self.margin_cells * self.cell_size
    }

    /// Size of one layer surface (capture window plus margin on every side).
    pub fn layer_extent(&self) -> Extent {
        let m = self.margin_px() * 2;
        let c = self.capture_extent();
        Extent {
            width: c.width + m,
            height: c.height + m,
        }
    }

    /// Total number of surfaces in the layer stack.
    pub fn layer_count(&self) -> usize {
        (self.depths as usize) * (self.sublayers_per_depth as usize)
    }

    /// First sublayer belonging to geometry layer `depth`.
    pub fn sublayer_base(&self, depth: usize) -> usize {
        depth * self.sublayers_per_depth as usize
    }

    /// Sublayer that receives pole overlays for geometry layer `depth`.
    pub fn pole_sublayer(&self, depth: usize) -> usize {
        self.sublayer_base(depth) + (self.sublayers_per_depth as usize) / 2
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
