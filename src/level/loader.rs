//! Loading a level project from a directory.
//!
//! Layout:
//!
//! ```text
//! project/
//!   level.json         name, width, height, cameras, light, default_tile
//!   geometry.json      one row-major cell array per geometry layer
//!   connections.json   row-major connection array
//!   props.json         placed props (optional)
//!   effects.json       placed effects (optional)
//!   lightmap.png       painted occluders (optional)
//!   defs/tiles.json
//!   defs/props.json    prop definitions; `image` paths are relative to `defs/`
//!   defs/effects.json
//! ```
//!
//! Independent files are read in parallel; definitions are resolved before the level is
//! assembled so every name in the level is checked.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;

use crate::foundation::core::{Extent, Quad};
use crate::foundation::error::{StrataError, StrataResult};
use crate::level::camera::Camera;
use crate::level::defs::{Definitions, EffectDef, PropDef, PropKind, SoftShading, TileDef};
use crate::level::grid::Grid;
use crate::level::model::{
    Cell, Connection, EffectInstance, Geo, LightSettings, Level, Pole, PropInstance,
};

/// A loaded level together with the definition tables it refers to.
#[derive(Clone, Debug)]
pub struct Project {
    pub level: Level,
    pub defs: Definitions,
}

#[derive(serde::Deserialize)]
struct LevelFile {
    name: String,
    width: usize,
    height: usize,
    #[serde(default)]
    cameras: Vec<Camera>,
    #[serde(default)]
    light: LightSettings,
    #[serde(default)]
    default_tile: Option<String>,
}

#[derive(serde::Deserialize)]
struct CellFile {
    #[serde(default)]
    geo: Geo,
    #[serde(default)]
    pole: Pole,
    #[serde(default)]
    tile: Option<String>,
}

#[derive(serde::Deserialize)]
struct PropFile {
    prop: String,
    quad: Quad,
    depth: usize,
    #[serde(default = "one")]
    extrude: usize,
}

fn one() -> usize {
    1
}

#[derive(serde::Deserialize)]
struct EffectFile {
    effect: String,
    /// Row-major, sized to the level.
    intensity: Vec<f32>,
    layers: u8,
    #[serde(default)]
    options: Vec<usize>,
}

#[derive(serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum PropKindFile {
    VoxelStruct { slice: Extent, repeat: Vec<u32> },
    Soft {
        #[serde(default)]
        shading: SoftShading,
    },
    Antimatter,
    Custom,
}

#[derive(serde::Deserialize)]
struct PropDefFile {
    name: String,
    #[serde(default)]
    image: Option<PathBuf>,
    #[serde(flatten)]
    kind: PropKindFile,
}

struct RawLevel {
    level: LevelFile,
    geometry: Vec<Vec<CellFile>>,
    connections: Vec<Connection>,
    props: Vec<PropFile>,
    effects: Vec<EffectFile>,
    lightmap: Option<image::GrayImage>,
}

/// Load and resolve the project in `dir`.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_project(dir: &Path) -> StrataResult<Project> {
    let (defs, raw) = rayon::join(|| load_definitions(&dir.join("defs")), || load_raw(dir));
    let defs = defs?;
    let level = resolve_level(raw?, &defs)?;
    tracing::debug!(
        level = %level.name,
        cameras = level.cameras.len(),
        props = level.props.len(),
        effects = level.effects.len(),
        "project loaded"
    );
    Ok(Project { level, defs })
}

/// Load the definition tables under `dir`.
pub fn load_definitions(dir: &Path) -> StrataResult<Definitions> {
    let ((tiles, effects), props) = rayon::join(
        || {
            rayon::join(
                || read_json::<Vec<TileDef>>(&dir.join("tiles.json")),
                || read_json::<Vec<EffectDef>>(&dir.join("effects.json")),
            )
        },
        || read_json::<Vec<PropDefFile>>(&dir.join("props.json")),
    );
    let props = props?
        .into_par_iter()
        .map(|p| prop_def(dir, p))
        .collect::<StrataResult<Vec<_>>>()?;
    Ok(Definitions {
        tiles: tiles?,
        props,
        effects: effects?,
    })
}

fn prop_def(dir: &Path, file: PropDefFile) -> StrataResult<PropDef> {
    let image = match &file.image {
        Some(rel) => {
            let path = dir.join(rel);
            image::open(&path)
                .with_context(|| format!("decode prop image '{}'", path.display()))?
                .to_rgba8()
        }
        None => image::RgbaImage::new(0, 0),
    };
    let kind = match file.kind {
        PropKindFile::VoxelStruct { slice, repeat } => {
            if slice.width == 0 || slice.height == 0 {
                return Err(StrataError::validation(format!(
                    "prop '{}' has an empty slice size",
                    file.name
                )));
            }
            PropKind::VoxelStruct { slice, repeat }
        }
        PropKindFile::Soft { shading } => PropKind::Soft { shading },
        PropKindFile::Antimatter => PropKind::Antimatter,
        PropKindFile::Custom => PropKind::Custom,
    };
    if image.width() == 0 && !matches!(kind, PropKind::Custom) {
        return Err(StrataError::validation(format!(
            "prop '{}' needs an image",
            file.name
        )));
    }
    Ok(PropDef {
        name: file.name,
        kind,
        image,
    })
}

fn load_raw(dir: &Path) -> StrataResult<RawLevel> {
    let ((level, geometry), ((connections, props), (effects, lightmap))) = rayon::join(
        || {
            rayon::join(
                || read_json::<LevelFile>(&dir.join("level.json")),
                || read_json::<Vec<Vec<CellFile>>>(&dir.join("geometry.json")),
            )
        },
        || {
            rayon::join(
                || {
                    rayon::join(
                        || read_json::<Vec<Connection>>(&dir.join("connections.json")),
                        || read_json_or_default::<Vec<PropFile>>(&dir.join("props.json")),
                    )
                },
                || {
                    rayon::join(
                        || read_json_or_default::<Vec<EffectFile>>(&dir.join("effects.json")),
                        || read_lightmap(&dir.join("lightmap.png")),
                    )
                },
            )
        },
    );
    Ok(RawLevel {
        level: level?,
        geometry: geometry?,
        connections: connections?,
        props: props?,
        effects: effects?,
        lightmap: lightmap?,
    })
}

fn resolve_level(raw: RawLevel, defs: &Definitions) -> StrataResult<Level> {
    let (w, h) = (raw.level.width, raw.level.height);
    let tile = |name: &str| {
        defs.tile_id(name)
            .ok_or_else(|| StrataError::validation(format!("unknown tile '{name}'")))
    };

    let geometry = raw
        .geometry
        .into_iter()
        .map(|layer| -> StrataResult<Grid<Cell>> {
            let cells = layer
                .into_iter()
                .map(|c| -> StrataResult<Cell> {
                    Ok(Cell {
                        geo: c.geo,
                        pole: c.pole,
                        tile: c.tile.as_deref().map(tile).transpose()?,
                    })
                })
                .collect::<StrataResult<Vec<_>>>()?;
            Grid::from_vec(w, h, cells)
        })
        .collect::<StrataResult<Vec<_>>>()?;
    let connections = Grid::from_vec(w, h, raw.connections)?;

    let mut level = Level::from_parts(raw.level.name, geometry, connections)?;
    level.cameras = raw.level.cameras;
    level.light = raw.level.light;
    level.lightmap = raw.lightmap;
    level.default_tile = raw.level.default_tile.as_deref().map(tile).transpose()?;
    level.props = raw
        .props
        .into_iter()
        .map(|p| -> StrataResult<PropInstance> {
            let prop = defs
                .prop_id(&p.prop)
                .ok_or_else(|| StrataError::validation(format!("unknown prop '{}'", p.prop)))?;
            Ok(PropInstance {
                prop,
                quad: p.quad,
                depth: p.depth,
                extrude: p.extrude,
            })
        })
        .collect::<StrataResult<Vec<_>>>()?;
    level.effects = raw
        .effects
        .into_iter()
        .map(|e| -> StrataResult<EffectInstance> {
            let effect = defs.effect_id(&e.effect).ok_or_else(|| {
                StrataError::validation(format!("unknown effect '{}'", e.effect))
            })?;
            Ok(EffectInstance {
                effect,
                intensity: Grid::from_vec(w, h, e.intensity)?,
                layers: e.layers,
                options: e.options,
            })
        })
        .collect::<StrataResult<Vec<_>>>()?;
    level.validate()?;
    Ok(level)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StrataResult<T> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| StrataError::serde(format!("{}: {e}", path.display())))
}

fn read_json_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path) -> StrataResult<T> {
    if path.exists() {
        read_json(path)
    } else {
        Ok(T::default())
    }
}

fn read_lightmap(path: &Path) -> StrataResult<Option<image::GrayImage>> {
    if !path.exists() {
        return Ok(None);
    }
    let img = image::open(path).with_context(|| format!("decode lightmap '{}'", path.display()))?;
    Ok(Some(img.to_luma8()))
}

#[cfg(test)]
#[path = "../../tests/unit/level/loader.rs"]
mod tests;
