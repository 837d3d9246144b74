use super::*;
use crate::foundation::config::RenderConfig;
use crate::level::camera::Camera;
use crate::level::defs::{Definitions, EffectDef, EffectId, Granularity, TileDef, TileId};
use crate::level::grid::Grid;
use crate::level::model::{Cell, EffectInstance, Level};
use crate::render::stack::LayerStack;
use crate::render::surface::is_opaque;

fn cfg() -> RenderConfig {
    RenderConfig {
        cell_size: 4,
        capture_width_cells: 4,
        capture_height_cells: 4,
        margin_cells: 0,
        depths: 2,
        sublayers_per_depth: 2,
    }
}

fn opaque_in_cell(layer: &RgbaImage, x: u32, y: u32) -> usize {
    (0..4)
        .flat_map(|dy| (0..4).map(move |dx| (x * 4 + dx, y * 4 + dy)))
        .filter(|&(px, py)| is_opaque(layer.get_pixel(px, py)))
        .count()
}

#[test]
fn box_tile_fills_every_sublayer_of_its_depth() {
    let cfg = cfg();
    let mut level = Level::new("t", 4, 4, 2);
    *level.cell_mut(1, 2, 1).unwrap() = Cell::solid();
    let defs = Definitions {
        tiles: vec![TileDef {
            name: "block".to_string(),
            kind: TileKind::Box,
        }],
        ..Definitions::default()
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
    BuiltinHost
        .invoke(
            ScriptCall::Tile {
                id: TileId(0),
                def: &defs.tiles[0],
                x: 1,
                y: 2,
                depth: 1,
            },
            &mut ctx,
        )
        .unwrap();

    assert_eq!(opaque_in_cell(stack.layer(0).unwrap(), 1, 2), 0);
    assert_eq!(opaque_in_cell(stack.layer(2).unwrap(), 1, 2), 16);
    assert_eq!(opaque_in_cell(stack.layer(3).unwrap(), 1, 2), 16);
    assert_eq!(
        *stack.layer(2).unwrap().get_pixel(5, 9),
        Shade::Highlight.color()
    );
    assert_eq!(
        *stack.layer(3).unwrap().get_pixel(5, 9),
        Shade::Neutral.color()
    );
}

#[test]
fn slopes_cover_part_of_the_cell() {
    for geo in [
        Geo::SlopeBottomRight,
        Geo::SlopeBottomLeft,
        Geo::SlopeTopRight,
        Geo::SlopeTopLeft,
    ] {
        let mut s = RgbaImage::new(4, 4);
        fill_geo(&mut s, Rect::new(0.0, 0.0, 4.0, 4.0), geo, Shade::Neutral.color());
        let n = s.pixels().filter(|p| is_opaque(p)).count();
        assert!(n > 4 && n < 16, "{geo:?} covered {n}");
    }
}

#[test]
fn cell_effect_draws_speck_scaled_by_intensity() {
    let cfg = cfg();
    let mut level = Level::new("t", 4, 4, 2);
    let mut field = Grid::filled(4, 4, 0.0f32);
    field.set(2, 1, 1.0);
    level.effects.push(EffectInstance {
        effect: EffectId(0),
        intensity: field,
        layers: 0b10,
        options: vec![],
    });
    let defs = Definitions {
        effects: vec![EffectDef {
            name: "moss".to_string(),
            granularity: Granularity::Cell,
            options: vec![],
        }],
        ..Definitions::default()
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
    for (x, y) in [(2, 1), (0, 0)] {
        BuiltinHost
            .invoke(
                ScriptCall::Effect {
                    index: 0,
                    instance: &level.effects[0],
                    def: &defs.effects[0],
                    step: EffectStep::Cell(x, y),
                },
                &mut ctx,
            )
            .unwrap();
    }
    assert_eq!(opaque_in_cell(stack.layer(0).unwrap(), 2, 1), 0);
    assert_eq!(opaque_in_cell(stack.layer(2).unwrap(), 2, 1), 16);
    assert_eq!(opaque_in_cell(stack.layer(2).unwrap(), 0, 0), 0);
}
