//! Shared definition tables for tiles, props and effects.
//!
//! Levels refer to definitions by index (`TileId`, `PropId`, `EffectId`). The loader resolves
//! names to ids once; the render core only ever reads these tables.

use crate::foundation::core::Extent;
use crate::foundation::error::{StrataError, StrataResult};
use image::RgbaImage;

/// Index into [`Definitions::tiles`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TileId(pub u32);

/// Index into [`Definitions::props`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PropId(pub u32);

/// Index into [`Definitions::effects`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct EffectId(pub u32);

/// How a tile draws itself. The script host matches on this to pick its procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Plain block filling the cell on every sublayer of its depth.
    Box,
    /// Extruded image stack spread across sublayers.
    VoxelStruct,
    /// Fully user-scripted.
    Custom,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TileDef {
    pub name: String,
    pub kind: TileKind,
}

/// Thresholds for the soft-prop shading pass.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SoftShading {
    /// Slope toward the light above this is drawn as a highlight.
    pub highlight: f32,
    /// Slope toward the light below `-shadow` is drawn as shadow.
    pub shadow: f32,
    /// Light direction in radians (pointing from the light toward the scene).
    pub light_angle: f64,
}

impl Default for SoftShading {
    fn default() -> Self {
        Self {
            highlight: 0.02,
            shadow: 0.02,
            light_angle: std::f64::consts::FRAC_PI_4,
        }
    }
}

/// The closed set of prop rendering algorithms.
#[derive(Clone, Debug, PartialEq)]
pub enum PropKind {
    /// Vertically stacked depth slices of `slice` size; `repeat[i]` sublayers per slice.
    VoxelStruct { slice: Extent, repeat: Vec<u32> },
    /// Height-shaded prop; brightness of the source image encodes height.
    Soft { shading: SoftShading },
    /// Erases already drawn content where the source image is opaque.
    Antimatter,
    /// Drawn entirely by the script host.
    Custom,
}

impl PropKind {
    pub fn name(&self) -> &'static str {
        match self {
            PropKind::VoxelStruct { .. } => "voxel_struct",
            PropKind::Soft { .. } => "soft",
            PropKind::Antimatter => "antimatter",
            PropKind::Custom => "custom",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PropDef {
    pub name: String,
    pub kind: PropKind,
    /// Source texture; may be empty for custom props.
    pub image: RgbaImage,
}

impl PropDef {
    /// Number of depth slices stored in a voxel-struct image.
    pub fn slice_count(&self) -> usize {
        match &self.kind {
            PropKind::VoxelStruct { slice, repeat } => {
                let by_height = if slice.height == 0 {
                    0
                } else {
                    (self.image.height() / slice.height) as usize
                };
                by_height.min(repeat.len())
            }
            _ => 1,
        }
    }
}

/// Rate at which an effect's procedure is invoked across the camera window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Once per camera pass.
    Whole,
    /// Once per visible row.
    Row,
    /// Once per visible cell.
    Cell,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectOption {
    pub name: String,
    pub choices: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectDef {
    pub name: String,
    pub granularity: Granularity,
    #[serde(default)]
    pub options: Vec<EffectOption>,
}

/// Immutable definition tables supplied by the loader.
#[derive(Clone, Debug, Default)]
pub struct Definitions {
    pub tiles: Vec<TileDef>,
    pub props: Vec<PropDef>,
    pub effects: Vec<EffectDef>,
}

impl Definitions {
    pub fn tile(&self, id: TileId) -> StrataResult<&TileDef> {
        self.tiles
            .get(id.0 as usize)
            .ok_or_else(|| StrataError::render(format!("unknown tile id {}", id.0)))
    }

    pub fn prop(&self, id: PropId) -> StrataResult<&PropDef> {
        self.props
            .get(id.0 as usize)
            .ok_or_else(|| StrataError::render(format!("unknown prop id {}", id.0)))
    }

    pub fn effect(&self, id: EffectId) -> StrataResult<&EffectDef> {
        self.effects
            .get(id.0 as usize)
            .ok_or_else(|| StrataError::render(format!("unknown effect id {}", id.0)))
    }

    pub fn tile_id(&self, name: &str) -> Option<TileId> {
        self.tiles
            .iter()
            .position(|t| t.name == name)
            .map(|i| TileId(i as u32))
    }

    pub fn prop_id(&self, name: &str) -> Option<PropId> {
        self.props
            .iter()
            .position(|p| p.name == name)
            .map(|i| PropId(i as u32))
    }

    pub fn effect_id(&self, name: &str) -> Option<EffectId> {
        self.effects
            .iter()
            .position(|e| e.name == name)
            .map(|i| EffectId(i as u32))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/level/defs.rs"]
mod tests;
