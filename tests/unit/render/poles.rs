use super::*;
use crate::foundation::config::RenderConfig;
use crate::level::camera::Camera;
use crate::level::defs::Definitions;
use crate::level::model::{Cell, Level};
use crate::render::connections::PathKind;
use crate::render::stack::LayerStack;
use crate::render::surface::is_opaque;
use image::RgbaImage;

fn cfg() -> RenderConfig {
    RenderConfig {
        cell_size: 10,
        capture_width_cells: 6,
        capture_height_cells: 6,
        margin_cells: 0,
        depths: 2,
        sublayers_per_depth: 4,
    }
}

fn opaque(layer: &RgbaImage) -> usize {
    layer.pixels().filter(|p| is_opaque(p)).count()
}

#[test]
fn poles_draw_thin_bars_into_pole_sublayer() {
    let cfg = cfg();
    let mut level = Level::new("t", 6, 6, 3);
    level.cell_mut(1, 1, 0).unwrap().pole = Pole::Vertical;
    level.cell_mut(3, 1, 1).unwrap().pole = Pole::Cross;
    level.cell_mut(4, 4, 2).unwrap().pole = Pole::Horizontal;
    let camera = Camera::at(0.0, 0.0);
    let defs = Definitions::default();
    let mut stack = LayerStack::new(&cfg);
    let sampler = GeoSampler::new(&level, &camera, &cfg);
    let mut ctx = ScriptContext {
        level: &level,
        defs: &defs,
        camera: &camera,
        camera_index: 0,
        config: &cfg,
        layers: &mut stack,
    };
    let mut r = PoleRenderer::new();
    assert_eq!(r.draw_poles(&sampler, &mut ctx), 2);
    assert!(r.poles_done());

    // thickness = 10 / 5 = 2 px, full cell height
    assert_eq!(opaque(stack.layer(cfg.pole_sublayer(0)).unwrap()), 20);
    // cross: 20 + 20 - 4 overlap
    assert_eq!(opaque(stack.layer(cfg.pole_sublayer(1)).unwrap()), 36);
    assert!(is_opaque(stack.layer(2).unwrap().get_pixel(15, 12)));
}

#[test]
fn entrance_direction_needs_hood_shape() {
    let cfg = cfg();
    let mut level = Level::new("t", 6, 6, 1);
    // entrance at (2,2): path to the right, air to the left, rock above and below
    level.set_connection(2, 2, Connection::Entrance);
    level.set_connection(3, 2, Connection::Path);
    *level.cell_mut(2, 1, 0).unwrap() = Cell::solid();
    *level.cell_mut(2, 3, 0).unwrap() = Cell::solid();
    let camera = Camera::at(0.0, 0.0);
    let sampler = GeoSampler::new(&level, &camera, &cfg);
    assert_eq!(entrance_direction(&sampler, (2, 2)), Some(Dir::Right));

    let mut open_flank = level.clone();
    *open_flank.cell_mut(2, 3, 0).unwrap() = Cell::default();
    let sampler = GeoSampler::new(&open_flank, &camera, &cfg);
    assert_eq!(entrance_direction(&sampler, (2, 2)), None);
}

#[test]
fn connections_are_traced_and_drawn_into_front_sublayers() {
    let cfg = cfg();
    let mut level = Level::new("t", 6, 6, 1);
    level.set_connection(1, 2, Connection::Entrance);
    level.set_connection(2, 2, Connection::Path);
    level.set_connection(3, 2, Connection::Path);
    level.set_connection(4, 2, Connection::Exit);
    *level.cell_mut(1, 1, 0).unwrap() = Cell::solid();
    *level.cell_mut(1, 3, 0).unwrap() = Cell::solid();
    let camera = Camera::at(0.0, 0.0);
    let defs = Definitions::default();
    let mut stack = LayerStack::new(&cfg);
    let sampler = GeoSampler::new(&level, &camera, &cfg);
    let mut ctx = ScriptContext {
        level: &level,
        defs: &defs,
        camera: &camera,
        camera_index: 0,
        config: &cfg,
        layers: &mut stack,
    };
    let mut r = PoleRenderer::new();
    assert_eq!(r.draw_connections(&sampler, &mut ctx), 1);
    assert!(r.paths_done());
    assert_eq!(r.paths()[0].kind, PathKind::Exit);

    let front = stack.layer(0).unwrap();
    // interior cell centre, end cap centre and the hood body all land on sublayer 0
    assert!(is_opaque(front.get_pixel(25, 25)));
    assert!(is_opaque(front.get_pixel(45, 25)));
    assert!(is_opaque(front.get_pixel(18, 21)));
    // the hood mouth opens toward the air on the left
    assert!(!is_opaque(front.get_pixel(11, 25)));
    assert!(is_opaque(stack.layer(1).unwrap().get_pixel(35, 25)));
    assert_eq!(opaque(stack.layer(3).unwrap()), 0);
}
