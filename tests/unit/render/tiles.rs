use super::*;
use crate::foundation::config::RenderConfig;
use crate::level::camera::Camera;
use crate::level::defs::{Definitions, TileDef, TileKind};
use crate::level::model::{Cell, Geo};
use crate::render::stack::LayerStack;

#[derive(Default)]
struct Recorder {
    calls: Vec<(TileId, i64, i64, usize)>,
}

impl ScriptHost for Recorder {
    fn invoke(&mut self, call: ScriptCall<'_>, _ctx: &mut ScriptContext<'_>) -> StrataResult<()> {
        if let ScriptCall::Tile { id, x, y, depth, .. } = call {
            self.calls.push((id, x, y, depth));
        }
        Ok(())
    }
}

fn defs() -> Definitions {
    Definitions {
        tiles: ["stone", "brick"]
            .iter()
            .map(|n| TileDef {
                name: n.to_string(),
                kind: TileKind::Box,
            })
            .collect(),
        ..Definitions::default()
    }
}

fn cfg() -> RenderConfig {
    RenderConfig {
        cell_size: 2,
        capture_width_cells: 4,
        capture_height_cells: 4,
        margin_cells: 0,
        depths: 2,
        sublayers_per_depth: 1,
    }
}

fn full_window() -> CellWindow {
    CellWindow {
        x0: 0,
        y0: 0,
        x1: 4,
        y1: 4,
    }
}

#[test]
fn batches_group_by_tile_with_default_fallback() {
    let mut level = Level::new("t", 4, 4, 1);
    level.default_tile = Some(TileId(0));
    *level.cell_mut(3, 0, 0).unwrap() = Cell {
        geo: Geo::Solid,
        tile: Some(TileId(1)),
        ..Cell::default()
    };
    *level.cell_mut(1, 1, 0).unwrap() = Cell::solid();
    *level.cell_mut(0, 2, 0).unwrap() = Cell::solid();

    let b = batch_layer(&level, &full_window(), 0);
    assert_eq!(b.len(), 2);
    assert_eq!(b[&TileId(0)], vec![(1, 1), (0, 2)]);
    assert_eq!(b[&TileId(1)], vec![(3, 0)]);
}

#[test]
fn occupied_cells_without_default_are_skipped() {
    let mut level = Level::new("t", 4, 4, 1);
    *level.cell_mut(1, 1, 0).unwrap() = Cell::solid();
    assert!(batch_layer(&level, &full_window(), 0).is_empty());
}

#[test]
fn one_geometry_layer_per_call_in_tile_order() {
    let cfg = cfg();
    let defs = defs();
    let mut level = Level::new("t", 4, 4, 2);
    *level.cell_mut(2, 2, 0).unwrap() = Cell {
        geo: Geo::Solid,
        tile: Some(TileId(1)),
        ..Cell::default()
    };
    *level.cell_mut(0, 3, 0).unwrap() = Cell {
        geo: Geo::Solid,
        tile: Some(TileId(0)),
        ..Cell::default()
    };
    *level.cell_mut(1, 0, 1).unwrap() = Cell {
        geo: Geo::Solid,
        tile: Some(TileId(0)),
        ..Cell::default()
    };
    let camera = Camera::at(0.0, 0.0);
    let mut stack = LayerStack::new(&cfg);
    let mut ctx = ScriptContext {
        level: &level,
        defs: &defs,
        camera: &camera,
        camera_index: 0,
        config: &cfg,
        layers: &mut stack,
    };
    let mut host = Recorder::default();
    let mut r = TileRenderer::new(&level, full_window());

    assert_eq!(r.next(&mut host, &mut ctx).unwrap(), 2);
    assert!(!r.is_done());
    assert_eq!(r.next(&mut host, &mut ctx).unwrap(), 1);
    assert!(r.is_done());
    assert_eq!(r.next(&mut host, &mut ctx).unwrap(), 0);

    assert_eq!(
        host.calls,
        vec![
            (TileId(0), 0, 3, 0),
            (TileId(1), 2, 2, 0),
            (TileId(0), 1, 0, 1)
        ]
    );
}

#[test]
fn unknown_tile_id_is_an_error() {
    let cfg = cfg();
    let defs = defs();
    let mut level = Level::new("t", 4, 4, 1);
    level.cell_mut(0, 0, 0).unwrap().tile = Some(TileId(7));
    let camera = Camera::at(0.0, 0.0);
    let mut stack = LayerStack::new(&cfg);
    let mut ctx = ScriptContext {
        level: &level,
        defs: &defs,
        camera: &camera,
        camera_index: 0,
        config: &cfg,
        layers: &mut stack,
    };
    let mut r = TileRenderer::new(&level, full_window());
    assert!(r.next(&mut Recorder::default(), &mut ctx).is_err());
}
