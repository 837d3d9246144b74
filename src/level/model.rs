use crate::foundation::core::Quad;
use crate::foundation::error::{StrataError, StrataResult};
use crate::level::camera::Camera;
use crate::level::defs::{EffectId, PropId, TileId};
use crate::level::grid::Grid;
use image::GrayImage;

/// Terrain shape of one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geo {
    #[default]
    Air,
    Solid,
    /// Slope whose solid half is bottom-right.
    SlopeBottomRight,
    /// Slope whose solid half is bottom-left.
    SlopeBottomLeft,
    /// Slope whose solid half is top-right.
    SlopeTopRight,
    /// Slope whose solid half is top-left.
    SlopeTopLeft,
    Platform,
    Glass,
}

impl Geo {
    /// Cells a path entrance can open into.
    pub fn is_open(self) -> bool {
        matches!(self, Geo::Air | Geo::Platform | Geo::Glass)
    }

    pub fn is_solid(self) -> bool {
        self == Geo::Solid
    }

    /// Any non-air geometry receives a tile.
    pub fn is_occupied(self) -> bool {
        self != Geo::Air
    }
}

/// Pole overlay carried by a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pole {
    #[default]
    None,
    Vertical,
    Horizontal,
    Cross,
}

/// One terrain cell at `(x, y, depth)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub geo: Geo,
    #[serde(default)]
    pub pole: Pole,
    #[serde(default)]
    pub tile: Option<TileId>,
}

impl Cell {
    pub fn solid() -> Self {
        Self {
            geo: Geo::Solid,
            ..Self::default()
        }
    }
}

/// Role of a cell in the navigation connectivity graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connection {
    #[default]
    None,
    Path,
    Entrance,
    Exit,
    Spawn,
    Warp,
}

impl Connection {
    pub fn is_connected(self) -> bool {
        self != Connection::None
    }
}

/// Directional light parameters shared by every camera.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LightSettings {
    /// Projection direction in radians.
    pub angle: f64,
    /// Extra projection distance added to every layer's offset, in pixels.
    pub distance: f64,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            angle: std::f64::consts::FRAC_PI_4,
            distance: 1.0,
        }
    }
}

/// A placed prop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropInstance {
    pub prop: PropId,
    /// Placement in level pixels.
    pub quad: Quad,
    /// First sublayer of the stack the prop is written into.
    pub depth: usize,
    /// Number of sublayers covered by soft and antimatter props.
    #[serde(default = "one")]
    pub extrude: usize,
}

fn one() -> usize {
    1
}

/// A placed effect with its per-cell intensity field.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectInstance {
    pub effect: EffectId,
    /// Intensity in `[0, 1]`, sized to the level.
    pub intensity: Grid<f32>,
    /// Bit `d` set means geometry layer `d` is targeted.
    pub layers: u8,
    /// Selected choice per definition option.
    #[serde(default)]
    pub options: Vec<usize>,
}

impl EffectInstance {
    pub fn targets_layer(&self, depth: usize) -> bool {
        depth < 8 && self.layers & (1 << depth) != 0
    }
}

/// A level as seen by the render core. Never mutated while rendering.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    width: usize,
    height: usize,
    geometry: Vec<Grid<Cell>>,
    connections: Grid<Connection>,
    pub cameras: Vec<Camera>,
    pub props: Vec<PropInstance>,
    pub effects: Vec<EffectInstance>,
    /// Painted light occluders, stretched over the whole level.
    pub lightmap: Option<GrayImage>,
    pub light: LightSettings,
    pub default_tile: Option<TileId>,
}

impl Level {
    /// An all-air level with no cameras.
    pub fn new(name: impl Into<String>, width: usize, height: usize, depth: usize) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            geometry: (0..depth)
                .map(|_| Grid::filled(width, height, Cell::default()))
                .collect(),
            connections: Grid::filled(width, height, Connection::None),
            cameras: Vec::new(),
            props: Vec::new(),
            effects: Vec::new(),
            lightmap: None,
            light: LightSettings::default(),
            default_tile: None,
        }
    }

    /// Assemble a level from loaded matrices, checking that every matrix agrees on size.
    pub fn from_parts(
        name: impl Into<String>,
        geometry: Vec<Grid<Cell>>,
        connections: Grid<Connection>,
    ) -> StrataResult<Self> {
        let (width, height) = (connections.width(), connections.height());
        if geometry.is_empty() {
            return Err(StrataError::validation("level needs at least one layer"));
        }
        if geometry
            .iter()
            .any(|g| g.width() != width || g.height() != height)
        {
            return Err(StrataError::validation(
                "geometry layers must match the connection matrix size",
            ));
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            geometry,
            connections,
            cameras: Vec::new(),
            props: Vec::new(),
            effects: Vec::new(),
            lightmap: None,
            light: LightSettings::default(),
            default_tile: None,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.geometry.len()
    }

    pub fn cell(&self, x: i64, y: i64, depth: usize) -> Option<&Cell> {
        self.geometry.get(depth).and_then(|g| g.get(x, y))
    }

    pub fn cell_mut(&mut self, x: i64, y: i64, depth: usize) -> Option<&mut Cell> {
        self.geometry.get_mut(depth).and_then(|g| g.get_mut(x, y))
    }

    /// Connection type at `(x, y)`; `None` outside the level.
    pub fn connection(&self, x: i64, y: i64) -> Connection {
        self.connections
            .get(x, y)
            .copied()
            .unwrap_or(Connection::None)
    }

    pub fn set_connection(&mut self, x: i64, y: i64, c: Connection) -> bool {
        self.connections.set(x, y, c)
    }

    /// Check cross references that the render core relies on.
    pub fn validate(&self) -> StrataResult<()> {
        for (i, fx) in self.effects.iter().enumerate() {
            if fx.intensity.width() != self.width || fx.intensity.height() != self.height {
                return Err(StrataError::validation(format!(
                    "effect {i} intensity field must be {}x{}",
                    self.width, self.height
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/level/model.rs"]
mod tests;
